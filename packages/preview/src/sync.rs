//! # Preview Synchronization
//!
//! Exactly one of two modes is active, chosen by configuration:
//!
//! - **In-process**: the preview subscribes to the store directly (see
//!   [`InProcessPreview`](crate::InProcessPreview)); nothing to send
//! - **Isolated**: store changes become `BLOCKS_UPDATE` / `SELECT_BLOCK`
//!   messages over an [`IsolatedChannel`], and inbound preview messages are
//!   decoded, origin-checked and applied as commands

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info};

use storefront_blocks::{BlockId, BlockTree};
use storefront_editor::{EditorStore, PreviewConfig, PreviewMode};

use crate::channel::{ConnectionState, IsolatedChannel, Transport};
use crate::commands::{CommandOutcome, InboundCommand};
use crate::message::PreviewMessage;

enum Mode<T: Transport> {
    InProcess,
    Isolated(IsolatedChannel<T>),
}

pub struct PreviewSync<T: Transport> {
    mode: Mode<T>,
    expected_origin: String,
    last_revision: Option<u64>,
    last_selection: Vec<BlockId>,
}

impl<T: Transport> PreviewSync<T> {
    pub fn in_process() -> Self {
        Self::with_mode(Mode::InProcess, String::new())
    }

    pub fn isolated(transport: T, expected_origin: impl Into<String>) -> Self {
        Self::with_mode(Mode::Isolated(IsolatedChannel::new(transport)), expected_origin.into())
    }

    /// Pick the mode from config. The transport is dropped in in-process
    /// mode.
    pub fn from_config(config: &PreviewConfig, transport: T) -> Self {
        match config.mode {
            PreviewMode::InProcess => Self::in_process(),
            PreviewMode::Isolated => Self::isolated(transport, config.expected_origin.clone()),
        }
    }

    fn with_mode(mode: Mode<T>, expected_origin: String) -> Self {
        Self {
            mode,
            expected_origin,
            last_revision: None,
            last_selection: Vec::new(),
        }
    }

    pub fn mode(&self) -> PreviewMode {
        match self.mode {
            Mode::InProcess => PreviewMode::InProcess,
            Mode::Isolated(_) => PreviewMode::Isolated,
        }
    }

    pub fn channel(&self) -> Option<&IsolatedChannel<T>> {
        match &self.mode {
            Mode::Isolated(channel) => Some(channel),
            Mode::InProcess => None,
        }
    }

    pub fn channel_mut(&mut self) -> Option<&mut IsolatedChannel<T>> {
        match &mut self.mode {
            Mode::Isolated(channel) => Some(channel),
            Mode::InProcess => None,
        }
    }

    /// `Connected` in in-process mode
    pub fn connection(&self) -> ConnectionState {
        self.channel()
            .map_or(ConnectionState::Connected, IsolatedChannel::state)
    }

    /// Send whatever changed in `store` since the last publish.
    pub fn publish(&mut self, store: &EditorStore) {
        let Mode::Isolated(channel) = &mut self.mode else {
            return;
        };

        if self.last_revision != Some(store.revision()) {
            channel.send(PreviewMessage::blocks_update(store.tree()));
            self.last_revision = Some(store.revision());
        }

        if self.last_selection.as_slice() != store.selection().ids() {
            channel.send(PreviewMessage::select_block(store.selection().ids()));
            self.last_selection = store.selection().ids().to_vec();
        }
    }

    /// Force a full resync on the next publish.
    pub fn invalidate(&mut self) {
        self.last_revision = None;
        self.last_selection.clear();
    }

    /// Handle raw inbound text from the preview. Foreign or malformed
    /// messages are dropped and yield `None`.
    pub fn handle_inbound(&mut self, raw: &str, origin: &str, store: &mut EditorStore) -> Option<CommandOutcome> {
        if !matches!(self.mode, Mode::Isolated(_)) {
            return None;
        }

        let message = PreviewMessage::decode(raw, origin, &self.expected_origin)?;
        let command = match InboundCommand::from_message(&message) {
            Ok(command) => command,
            Err(error) => {
                debug!(%error, "ignoring preview message");
                return None;
            }
        };

        let outcome = command.apply(store);

        if outcome == CommandOutcome::Ready {
            info!("preview ready, resyncing");
            if let Some(channel) = self.channel_mut() {
                channel.retry();
            }
            self.invalidate();
        }

        self.publish(store);
        Some(outcome)
    }
}

/// Forward store updates to an isolated channel until the store goes away.
pub async fn forward_updates<T: Transport>(
    mut tree: watch::Receiver<Arc<BlockTree>>,
    mut selection: watch::Receiver<Vec<BlockId>>,
    channel: &mut IsolatedChannel<T>,
) {
    loop {
        tokio::select! {
            biased;

            changed = tree.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = tree.borrow_and_update().clone();
                channel.send(PreviewMessage::blocks_update(&snapshot));
            }
            changed = selection.changed() => {
                if changed.is_err() {
                    break;
                }
                let ids = selection.borrow_and_update().clone();
                channel.send(PreviewMessage::select_block(&ids));
            }
        }
    }
    debug!("store closed, preview forwarding stopped");
}
