//! Typed messages crossing the isolation boundary.
//!
//! Every message is a JSON object `{ type, source, payload }`. Inbound text
//! is accepted only when it comes from the expected origin, names a known
//! `type`, and declares `source` as `"editor"` or `"preview"`; everything
//! else is dropped without error.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::trace;

use storefront_blocks::{BlockId, BlockTree};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageType {
    BlocksUpdate,
    SelectBlock,
    HighlightBlock,
    EditorReady,
    PreviewReady,
    PreviewClick,
    PreviewHover,
    InlineEditStart,
    InlineEditChange,
    InlineEditEnd,
    InlineEditCancel,
    FieldValueUpdate,
    BlockMoveUp,
    BlockMoveDown,
    BlockDuplicate,
    BlockDelete,
    BlockAddBelow,
    ScrollToBlock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageSource {
    Editor,
    Preview,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewMessage {
    #[serde(rename = "type")]
    pub message_type: MessageType,

    pub source: MessageSource,

    #[serde(default)]
    pub payload: Value,
}

impl PreviewMessage {
    pub fn new(message_type: MessageType, source: MessageSource, payload: Value) -> Self {
        Self {
            message_type,
            source,
            payload,
        }
    }

    fn from_editor(message_type: MessageType, payload: Value) -> Self {
        Self::new(message_type, MessageSource::Editor, payload)
    }

    /// Full tree replacement
    pub fn blocks_update(tree: &BlockTree) -> Self {
        Self::from_editor(MessageType::BlocksUpdate, json!({ "blocks": tree }))
    }

    pub fn select_block(ids: &[BlockId]) -> Self {
        Self::from_editor(
            MessageType::SelectBlock,
            json!({ "blockId": ids.first(), "blockIds": ids }),
        )
    }

    pub fn highlight_block(id: Option<&BlockId>) -> Self {
        Self::from_editor(MessageType::HighlightBlock, json!({ "blockId": id }))
    }

    pub fn scroll_to_block(id: &BlockId) -> Self {
        Self::from_editor(MessageType::ScrollToBlock, json!({ "blockId": id }))
    }

    pub fn editor_ready() -> Self {
        Self::from_editor(MessageType::EditorReady, Value::Null)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Decode inbound text, or `None` if it must be ignored.
    pub fn decode(raw: &str, origin: &str, expected_origin: &str) -> Option<Self> {
        if origin != expected_origin {
            trace!(origin, "dropping message from unexpected origin");
            return None;
        }

        match serde_json::from_str(raw) {
            Ok(message) => Some(message),
            Err(error) => {
                trace!(%error, "dropping malformed message");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_blocks::{BlockKind, BlockNode};

    const ORIGIN: &str = "http://localhost:3000";

    #[test]
    fn test_wire_shape() {
        let tree = BlockTree::new(vec![BlockNode::new("hero", BlockKind::Hero)]);
        let value = serde_json::to_value(PreviewMessage::blocks_update(&tree)).unwrap();

        assert_eq!(value["type"], "BLOCKS_UPDATE");
        assert_eq!(value["source"], "editor");
        assert_eq!(value["payload"]["blocks"][0]["id"], "hero");
        assert_eq!(value["payload"]["blocks"][0]["type"], "hero");
    }

    #[test]
    fn test_type_names() {
        let names: Vec<String> = [
            MessageType::InlineEditStart,
            MessageType::BlockMoveDown,
            MessageType::FieldValueUpdate,
            MessageType::BlockAddBelow,
        ]
        .iter()
        .map(|t| serde_json::to_value(t).unwrap().as_str().unwrap().to_string())
        .collect();

        assert_eq!(
            names,
            vec!["INLINE_EDIT_START", "BLOCK_MOVE_DOWN", "FIELD_VALUE_UPDATE", "BLOCK_ADD_BELOW"]
        );
    }

    #[test]
    fn test_decode_accepts_known_sources() {
        let raw = r#"{"type":"PREVIEW_CLICK","source":"preview","payload":{"blockId":"hero"}}"#;
        let message = PreviewMessage::decode(raw, ORIGIN, ORIGIN).unwrap();
        assert_eq!(message.message_type, MessageType::PreviewClick);
        assert_eq!(message.source, MessageSource::Preview);
    }

    #[test]
    fn test_decode_drops_foreign_messages() {
        let raw = r#"{"type":"PREVIEW_CLICK","source":"preview","payload":{}}"#;
        assert!(PreviewMessage::decode(raw, "https://evil.example", ORIGIN).is_none());

        let bad_source = r#"{"type":"PREVIEW_CLICK","source":"devtools","payload":{}}"#;
        assert!(PreviewMessage::decode(bad_source, ORIGIN, ORIGIN).is_none());

        let bad_type = r#"{"type":"EXFILTRATE","source":"preview"}"#;
        assert!(PreviewMessage::decode(bad_type, ORIGIN, ORIGIN).is_none());

        assert!(PreviewMessage::decode("{{", ORIGIN, ORIGIN).is_none());
    }

    #[test]
    fn test_missing_payload_defaults_to_null() {
        let raw = r#"{"type":"PREVIEW_READY","source":"preview"}"#;
        let message = PreviewMessage::decode(raw, ORIGIN, ORIGIN).unwrap();
        assert!(message.payload.is_null());
    }
}
