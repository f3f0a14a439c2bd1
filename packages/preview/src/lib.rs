//! # Storefront Preview
//!
//! Keeps a live page preview in step with the editor store.
//!
//! ```text
//!            ┌──────────────┐
//!            │ EditorStore  │
//!            └──────┬───────┘
//!        watch      │       publish / forward_updates
//!     ┌─────────────┴──────────────┐
//!     ▼                            ▼
//! InProcessPreview          IsolatedChannel ──JSON──▶ sandboxed preview
//!                                  ▲                        │
//!                                  └── InboundCommand ◀─────┘
//! ```

mod channel;
mod commands;
mod in_process;
mod message;
mod sync;

pub use channel::{ConnectionState, IsolatedChannel, MpscTransport, Transport, TransportError};
pub use commands::{CommandError, CommandOutcome, InboundCommand};
pub use in_process::InProcessPreview;
pub use message::{MessageSource, MessageType, PreviewMessage};
pub use sync::{forward_updates, PreviewSync};
