use anyhow::Context;
use std::path::Path;
use storefront_editor::{EditorConfig, DEFAULT_CONFIG_NAME};

/// Load `storefront.config.json` from `cwd`, or defaults when there is none
pub fn load(cwd: &str) -> anyhow::Result<EditorConfig> {
    EditorConfig::load(Path::new(cwd))
        .with_context(|| format!("Failed to read {}", DEFAULT_CONFIG_NAME))
}
