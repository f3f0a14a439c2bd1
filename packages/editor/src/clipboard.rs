//! # Block Clipboard
//!
//! Copies a single block (with its subtree) as a versioned JSON envelope:
//!
//! ```json
//! { "type": "store-block", "version": 1, "block": { ... }, "copiedAt": 1700000000000 }
//! ```
//!
//! Identity and ordering fields are stripped on copy; paste goes through
//! the mutation engine, which assigns fresh ids.
//!
//! Writes go best-effort to both the native clipboard and a shared local
//! store (same-origin cross-tab). Reads try native first, then local.
//! Envelopes older than the configured TTL are discarded, and an expired
//! local entry is removed as a side effect.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use storefront_blocks::{BlockKind, BlockNode, Settings};

use crate::config::ClipboardConfig;

pub const ENVELOPE_TYPE: &str = "store-block";
pub const ENVELOPE_VERSION: u32 = 1;

#[derive(Error, Debug)]
pub enum ClipboardError {
    #[error("Clipboard unavailable: {0}")]
    Unavailable(String),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A block without identity: what travels through the clipboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipboardBlock {
    #[serde(rename = "type")]
    pub kind: BlockKind,

    pub variant: String,

    #[serde(default)]
    pub settings: Settings,

    #[serde(default = "default_visible")]
    pub visible: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<ClipboardBlock>>,
}

fn default_visible() -> bool {
    true
}

impl ClipboardBlock {
    pub fn from_node(node: &BlockNode) -> Self {
        Self {
            kind: node.kind,
            variant: node.variant.clone(),
            settings: node.settings.clone(),
            visible: node.visible,
            children: node
                .children
                .as_ref()
                .map(|children| children.iter().map(Self::from_node).collect()),
        }
    }

    /// Rebuild a node tree with blank ids; insertion assigns real ones.
    pub fn to_node(&self) -> BlockNode {
        let mut node = BlockNode::new("", self.kind).with_variant(self.variant.clone());
        node.settings = self.settings.clone();
        node.visible = self.visible;
        if let Some(children) = &self.children {
            node = node.with_children(children.iter().map(Self::to_node).collect());
        }
        node
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipboardEnvelope {
    #[serde(rename = "type")]
    pub envelope_type: String,

    pub version: u32,

    pub block: ClipboardBlock,

    /// Epoch milliseconds
    pub copied_at: i64,
}

impl ClipboardEnvelope {
    pub fn new(node: &BlockNode, copied_at: i64) -> Self {
        Self {
            envelope_type: ENVELOPE_TYPE.to_string(),
            version: ENVELOPE_VERSION,
            block: ClipboardBlock::from_node(node),
            copied_at,
        }
    }

    /// Parse and validate raw clipboard text. Anything that is not a
    /// well-formed block envelope yields `None`.
    pub fn decode(raw: &str) -> Option<Self> {
        let value: Value = serde_json::from_str(raw).ok()?;

        let well_formed = value.get("type").and_then(Value::as_str) == Some(ENVELOPE_TYPE)
            && value.get("copiedAt").is_some_and(Value::is_number)
            && value
                .get("block")
                .is_some_and(|block| {
                    block.get("type").is_some_and(Value::is_string)
                        && block.get("variant").is_some_and(Value::is_string)
                });

        if !well_formed {
            debug!("ignoring clipboard content that is not a block envelope");
            return None;
        }

        match serde_json::from_value(value) {
            Ok(envelope) => Some(envelope),
            Err(error) => {
                debug!(%error, "malformed block envelope");
                None
            }
        }
    }

    pub fn is_expired(&self, now_ms: i64, ttl_ms: i64) -> bool {
        now_ms - self.copied_at > ttl_ms
    }
}

/// OS- or host-level text clipboard
pub trait ClipboardBackend {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
    fn read_text(&mut self) -> Result<Option<String>, ClipboardError>;
}

/// Shared string key-value store (e.g. browser local storage)
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), ClipboardError>;
    fn remove(&self, key: &str);
}

/// In-memory [`KeyValueStore`]; clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.map().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ClipboardError> {
        self.map().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.map().remove(key);
    }
}

/// The operating system clipboard
#[cfg(feature = "native-clipboard")]
#[derive(Debug, Default)]
pub struct SystemClipboard;

#[cfg(feature = "native-clipboard")]
impl ClipboardBackend for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        let mut clip =
            arboard::Clipboard::new().map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
        clip.set_text(text.to_string())
            .map_err(|e| ClipboardError::Unavailable(e.to_string()))
    }

    fn read_text(&mut self) -> Result<Option<String>, ClipboardError> {
        let mut clip =
            arboard::Clipboard::new().map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
        Ok(clip.get_text().ok())
    }
}

pub struct Clipboard {
    config: ClipboardConfig,
    native: Option<Box<dyn ClipboardBackend>>,
    local: Option<Box<dyn KeyValueStore>>,
}

impl Clipboard {
    pub fn new(config: ClipboardConfig) -> Self {
        Self {
            config,
            native: None,
            local: None,
        }
    }

    pub fn with_native(mut self, backend: impl ClipboardBackend + 'static) -> Self {
        self.native = Some(Box::new(backend));
        self
    }

    pub fn with_local(mut self, store: impl KeyValueStore + 'static) -> Self {
        self.local = Some(Box::new(store));
        self
    }

    pub fn copy(&mut self, node: &BlockNode) -> Result<ClipboardEnvelope, ClipboardError> {
        self.copy_at(node, Utc::now().timestamp_millis())
    }

    /// Write `node` to every available backend. Fails only if none took it.
    pub fn copy_at(&mut self, node: &BlockNode, now_ms: i64) -> Result<ClipboardEnvelope, ClipboardError> {
        let envelope = ClipboardEnvelope::new(node, now_ms);
        let text = serde_json::to_string(&envelope)?;
        let mut stored = false;

        if let Some(native) = self.native.as_mut() {
            match native.write_text(&text) {
                Ok(()) => stored = true,
                Err(error) => warn!(%error, "native clipboard write failed"),
            }
        }

        if let Some(local) = self.local.as_ref() {
            match local.set(&self.config.storage_key, &text) {
                Ok(()) => stored = true,
                Err(error) => warn!(%error, "local clipboard write failed"),
            }
        }

        if stored {
            debug!(kind = %node.kind, "copied block");
            Ok(envelope)
        } else {
            Err(ClipboardError::Unavailable("no clipboard backend accepted the block".to_string()))
        }
    }

    pub fn paste(&mut self) -> Option<ClipboardBlock> {
        self.paste_at(Utc::now().timestamp_millis())
    }

    /// Read the freshest usable envelope: native first, then local.
    pub fn paste_at(&mut self, now_ms: i64) -> Option<ClipboardBlock> {
        let ttl = self.config.ttl_ms;

        if let Some(native) = self.native.as_mut() {
            match native.read_text() {
                Ok(Some(text)) => {
                    if let Some(envelope) = ClipboardEnvelope::decode(&text) {
                        if !envelope.is_expired(now_ms, ttl) {
                            return Some(envelope.block);
                        }
                        debug!("native clipboard envelope expired");
                    }
                }
                Ok(None) => {}
                Err(error) => warn!(%error, "native clipboard read failed"),
            }
        }

        let local = self.local.as_ref()?;
        let envelope = ClipboardEnvelope::decode(&local.get(&self.config.storage_key)?)?;
        if envelope.is_expired(now_ms, ttl) {
            debug!("local clipboard envelope expired, clearing");
            local.remove(&self.config.storage_key);
            return None;
        }
        Some(envelope.block)
    }
}
