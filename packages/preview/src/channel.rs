//! # Isolated Preview Channel
//!
//! Sends typed messages to a preview living behind an isolation boundary.
//!
//! ## Failure handling
//!
//! There is exactly one retry slot, not a queue:
//!
//! - A failed send stores that message as pending and flips the state to
//!   `Disconnected`; an earlier pending message is overwritten
//! - The next send (or an explicit [`IsolatedChannel::retry`]) first
//!   re-attempts the pending message; success clears it and flips back to
//!   `Connected`
//!
//! Callers must not assume every failed send is eventually delivered.

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::message::PreviewMessage;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Preview is not attached")]
    NotAttached,

    #[error("Preview channel closed")]
    Closed,

    #[error("Preview channel full")]
    Full,

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// One-way delivery to the far side of the boundary
pub trait Transport {
    fn send(&mut self, message: &PreviewMessage) -> Result<(), TransportError>;
}

/// [`Transport`] over a bounded tokio channel carrying JSON text
#[derive(Debug, Default)]
pub struct MpscTransport {
    sender: Option<mpsc::Sender<String>>,
}

impl MpscTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport plus the receiving end the preview reads from
    pub fn connected(capacity: usize) -> (Self, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { sender: Some(tx) }, rx)
    }

    pub fn attach(&mut self, sender: mpsc::Sender<String>) {
        self.sender = Some(sender);
    }

    pub fn detach(&mut self) {
        self.sender = None;
    }
}

impl Transport for MpscTransport {
    fn send(&mut self, message: &PreviewMessage) -> Result<(), TransportError> {
        let sender = self.sender.as_ref().ok_or(TransportError::NotAttached)?;
        let text = message.to_json()?;

        sender.try_send(text).map_err(|error| match error {
            mpsc::error::TrySendError::Full(_) => TransportError::Full,
            mpsc::error::TrySendError::Closed(_) => TransportError::Closed,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connected,
    Disconnected,
}

pub struct IsolatedChannel<T: Transport> {
    transport: T,
    pending: Option<PreviewMessage>,
    state: ConnectionState,
}

impl<T: Transport> IsolatedChannel<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            pending: None,
            state: ConnectionState::Connected,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn pending(&self) -> Option<&PreviewMessage> {
        self.pending.as_ref()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Deliver `message`, flushing the pending slot first. Returns whether
    /// `message` itself went out. Never fails loudly.
    pub fn send(&mut self, message: PreviewMessage) -> bool {
        if !self.retry() {
            // Still down: the newer message takes the slot
            self.pending = Some(message);
            return false;
        }

        match self.transport.send(&message) {
            Ok(()) => {
                self.state = ConnectionState::Connected;
                true
            }
            Err(error) => {
                warn!(%error, message_type = ?message.message_type, "preview send failed");
                self.pending = Some(message);
                self.state = ConnectionState::Disconnected;
                false
            }
        }
    }

    /// Re-attempt the pending message. `true` when nothing is left pending.
    pub fn retry(&mut self) -> bool {
        let Some(message) = self.pending.take() else {
            return true;
        };

        match self.transport.send(&message) {
            Ok(()) => {
                debug!(message_type = ?message.message_type, "pending preview message delivered");
                self.state = ConnectionState::Connected;
                true
            }
            Err(error) => {
                debug!(%error, "preview still unreachable");
                self.pending = Some(message);
                self.state = ConnectionState::Disconnected;
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MessageType;
    use storefront_blocks::BlockId;

    /// Records deliveries; fails while `down`.
    #[derive(Default)]
    struct Flaky {
        down: bool,
        delivered: Vec<MessageType>,
    }

    impl Transport for Flaky {
        fn send(&mut self, message: &PreviewMessage) -> Result<(), TransportError> {
            if self.down {
                return Err(TransportError::NotAttached);
            }
            self.delivered.push(message.message_type);
            Ok(())
        }
    }

    fn select(id: &str) -> PreviewMessage {
        PreviewMessage::select_block(&[BlockId::from(id)])
    }

    #[test]
    fn test_only_latest_failure_is_retried() {
        let mut channel = IsolatedChannel::new(Flaky { down: true, ..Flaky::default() });

        assert!(!channel.send(PreviewMessage::editor_ready()));
        assert!(!channel.send(select("a")));
        assert_eq!(channel.state(), ConnectionState::Disconnected);
        assert_eq!(channel.pending(), Some(&select("a")));

        channel.transport_mut().down = false;
        assert!(channel.retry());
        assert_eq!(channel.state(), ConnectionState::Connected);
        assert!(channel.pending().is_none());
        // The overwritten EDITOR_READY is gone for good
        assert_eq!(channel.transport().delivered, vec![MessageType::SelectBlock]);
    }

    #[test]
    fn test_next_send_flushes_pending_first() {
        let mut channel = IsolatedChannel::new(Flaky { down: true, ..Flaky::default() });
        channel.send(select("a"));

        channel.transport_mut().down = false;
        assert!(channel.send(PreviewMessage::highlight_block(None)));
        assert_eq!(
            channel.transport().delivered,
            vec![MessageType::SelectBlock, MessageType::HighlightBlock]
        );
    }

    #[test]
    fn test_retry_with_nothing_pending() {
        let mut channel = IsolatedChannel::new(Flaky::default());
        assert!(channel.retry());
        assert!(channel.transport().delivered.is_empty());
    }

    #[tokio::test]
    async fn test_mpsc_transport_round_trip() {
        let (transport, mut rx) = MpscTransport::connected(4);
        let mut channel = IsolatedChannel::new(transport);

        assert!(channel.send(PreviewMessage::editor_ready()));
        let text = rx.recv().await.unwrap();
        assert!(text.contains("\"EDITOR_READY\""));
    }

    #[tokio::test]
    async fn test_detached_transport_goes_pending_until_attached() {
        let mut channel = IsolatedChannel::new(MpscTransport::new());
        assert!(!channel.send(select("hero")));
        assert_eq!(channel.state(), ConnectionState::Disconnected);

        let (tx, mut rx) = mpsc::channel(4);
        channel.transport_mut().attach(tx);
        assert!(channel.retry());

        let text = rx.recv().await.unwrap();
        assert!(text.contains("SELECT_BLOCK"));
    }

    #[tokio::test]
    async fn test_full_channel_is_a_failed_send() {
        let (transport, _rx) = MpscTransport::connected(1);
        let mut channel = IsolatedChannel::new(transport);

        assert!(channel.send(select("a")));
        assert!(!channel.send(select("b")));
        assert_eq!(channel.pending(), Some(&select("b")));
    }
}
