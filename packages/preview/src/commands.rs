//! Commands the preview sends back to the editor.
//!
//! Every command funnels into the store's regular entry points, so a click
//! or inline edit in the preview is validated and recorded exactly like the
//! same action in the layers panel.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use storefront_blocks::{BlockId, BlockKind, Settings};
use storefront_editor::{Commit, EditorStore, MutationError};

use crate::message::{MessageSource, MessageType, PreviewMessage};

#[derive(Error, Debug, PartialEq)]
pub enum CommandError {
    #[error("{0:?} is not a preview command")]
    NotACommand(MessageType),

    #[error("Invalid payload for {message_type:?}: {reason}")]
    InvalidPayload {
        message_type: MessageType,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum InboundCommand {
    /// Preview finished loading and wants a full sync
    Ready,

    Click { block_id: BlockId, shift: bool, toggle: bool },

    Hover { block_id: Option<BlockId> },

    MoveUp(BlockId),
    MoveDown(BlockId),
    Duplicate(BlockId),
    Delete(BlockId),

    AddBelow { block_id: BlockId, kind: BlockKind },

    /// Commit one settings field (form field or finished inline edit)
    SetField { block_id: BlockId, field: String, value: Value },

    /// Inline editing in progress; the preview renders it locally
    InlineEditing,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    Ready,
    Committed(Commit),
    SelectionChanged,
    Highlight(Option<BlockId>),
    Ignored,
    Rejected(MutationError),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClickPayload {
    block_id: BlockId,
    #[serde(default)]
    shift_key: bool,
    #[serde(default)]
    meta_key: bool,
    #[serde(default)]
    ctrl_key: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlockPayload {
    block_id: BlockId,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HoverPayload {
    #[serde(default)]
    block_id: Option<BlockId>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddBelowPayload {
    block_id: BlockId,
    block_type: BlockKind,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FieldPayload {
    block_id: BlockId,
    field: String,
    #[serde(default)]
    value: Value,
}

impl InboundCommand {
    pub fn from_message(message: &PreviewMessage) -> Result<Self, CommandError> {
        let message_type = message.message_type;
        if message.source != MessageSource::Preview {
            return Err(CommandError::NotACommand(message_type));
        }

        let command = match message_type {
            MessageType::PreviewReady => InboundCommand::Ready,

            MessageType::PreviewClick => {
                let click: ClickPayload = payload(message)?;
                InboundCommand::Click {
                    block_id: click.block_id,
                    shift: click.shift_key,
                    toggle: click.meta_key || click.ctrl_key,
                }
            }

            MessageType::PreviewHover => {
                let hover: HoverPayload = payload(message)?;
                InboundCommand::Hover { block_id: hover.block_id }
            }

            MessageType::BlockMoveUp => InboundCommand::MoveUp(payload::<BlockPayload>(message)?.block_id),
            MessageType::BlockMoveDown => InboundCommand::MoveDown(payload::<BlockPayload>(message)?.block_id),
            MessageType::BlockDuplicate => InboundCommand::Duplicate(payload::<BlockPayload>(message)?.block_id),
            MessageType::BlockDelete => InboundCommand::Delete(payload::<BlockPayload>(message)?.block_id),

            MessageType::BlockAddBelow => {
                let add: AddBelowPayload = payload(message)?;
                InboundCommand::AddBelow { block_id: add.block_id, kind: add.block_type }
            }

            MessageType::FieldValueUpdate | MessageType::InlineEditEnd => {
                let field: FieldPayload = payload(message)?;
                InboundCommand::SetField {
                    block_id: field.block_id,
                    field: field.field,
                    value: field.value,
                }
            }

            MessageType::InlineEditStart
            | MessageType::InlineEditChange
            | MessageType::InlineEditCancel => InboundCommand::InlineEditing,

            other => return Err(CommandError::NotACommand(other)),
        };

        Ok(command)
    }

    /// Run against the store. Rejections come back as values.
    pub fn apply(self, store: &mut EditorStore) -> CommandOutcome {
        let result = match self {
            InboundCommand::Ready => return CommandOutcome::Ready,
            InboundCommand::InlineEditing => return CommandOutcome::Ignored,
            InboundCommand::Hover { block_id } => return CommandOutcome::Highlight(block_id),

            InboundCommand::Click { block_id, shift, toggle } => {
                let changed = if shift {
                    store.select_extend(&block_id)
                } else if toggle {
                    store.select_toggle(&block_id)
                } else {
                    store.select(&block_id)
                };
                return if changed {
                    CommandOutcome::SelectionChanged
                } else {
                    CommandOutcome::Ignored
                };
            }

            InboundCommand::MoveUp(id) => store.move_up(id),
            InboundCommand::MoveDown(id) => store.move_down(id),
            InboundCommand::Duplicate(id) => store.duplicate(vec![id]),
            InboundCommand::Delete(id) => store.delete(vec![id]),
            InboundCommand::AddBelow { block_id, kind } => store.add_below(block_id, kind),

            InboundCommand::SetField { block_id, field, value } => {
                let mut patch = Settings::new();
                patch.insert(field, value);
                store.update_settings(block_id, patch)
            }
        };

        match result {
            Ok(commit) => CommandOutcome::Committed(commit),
            Err(error) => {
                debug!(%error, "preview command rejected");
                CommandOutcome::Rejected(error)
            }
        }
    }
}

fn payload<T: serde::de::DeserializeOwned>(message: &PreviewMessage) -> Result<T, CommandError> {
    serde_json::from_value(message.payload.clone()).map_err(|error| CommandError::InvalidPayload {
        message_type: message.message_type,
        reason: error.to_string(),
    })
}
