use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_CONFIG_NAME: &str = "storefront.config.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Editor configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    /// Maximum number of history entries kept (0 = unlimited)
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    #[serde(default)]
    pub auto_scroll: AutoScrollConfig,

    #[serde(default)]
    pub clipboard: ClipboardConfig,

    #[serde(default)]
    pub preview: PreviewConfig,
}

fn default_history_limit() -> usize {
    50
}

/// Edge auto-scroll while dragging near the scroll container's bounds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AutoScrollConfig {
    /// Distance from the top/bottom edge, in px, that starts scrolling
    pub edge_threshold: f32,

    /// Pixels scrolled per frame
    pub speed: f32,

    pub frame_interval_ms: u64,
}

impl Default for AutoScrollConfig {
    fn default() -> Self {
        Self {
            edge_threshold: 60.0,
            speed: 8.0,
            frame_interval_ms: 16,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClipboardConfig {
    /// Envelopes older than this are discarded on paste
    pub ttl_ms: i64,

    /// Key used in the shared local store
    pub storage_key: String,
}

impl Default for ClipboardConfig {
    fn default() -> Self {
        Self {
            ttl_ms: 3_600_000,
            storage_key: "store-block-clipboard".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PreviewMode {
    #[default]
    InProcess,
    Isolated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreviewConfig {
    pub mode: PreviewMode,

    /// Origin inbound preview messages must come from
    pub expected_origin: String,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            mode: PreviewMode::InProcess,
            expected_origin: "http://localhost:3000".to_string(),
        }
    }
}

impl EditorConfig {
    /// Load config from a directory, falling back to defaults when absent
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let config_path = dir.join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Ok(Self::from_json(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_json(source: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(source)
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
            auto_scroll: AutoScrollConfig::default(),
            clipboard: ClipboardConfig::default(),
            preview: PreviewConfig::default(),
        }
    }
}
