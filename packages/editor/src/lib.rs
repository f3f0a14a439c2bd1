//! # Storefront Editor
//!
//! Editing engine for storefront pages: everything between a pointer event
//! and a new page tree.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ drag_session: pointer → drop candidate      │
//! │  - geometry provider + drop_resolver        │
//! │  - edge auto-scroll frame loop              │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ store: sole owner of the live tree          │
//! │  - mutations: validated tree transforms     │
//! │  - history: snapshot per commit             │
//! │  - selection                                │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ watch channels → preview (in-process/iframe)│
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Single writer**: only [`EditorStore::dispatch`] replaces the tree
//! 2. **Atomic commits**: a mutation is visible only together with its
//!    history entry
//! 3. **Rejections are no-ops**: invalid operations leave the tree and
//!    history untouched and come back as values, never panics
//!
//! ## Usage
//!
//! ```rust,ignore
//! use storefront_editor::{EditorConfig, EditorStore, DropPosition};
//!
//! let config = EditorConfig::load(project_dir)?;
//! let mut store = EditorStore::from_document(&page, &config);
//!
//! store.move_nodes(vec!["hero".into()], "footer".into(), DropPosition::Before)?;
//! store.undo();
//! ```

mod auto_scroll;
mod clipboard;
mod config;
mod drag_session;
mod drop_resolver;
mod errors;
mod geometry;
mod history;
mod mutations;
mod selection;
mod store;

pub use auto_scroll::{AutoScroller, ScrollTarget};
#[cfg(feature = "native-clipboard")]
pub use clipboard::SystemClipboard;
pub use clipboard::{
    Clipboard, ClipboardBackend, ClipboardBlock, ClipboardEnvelope, ClipboardError, KeyValueStore,
    MemoryStore, ENVELOPE_TYPE, ENVELOPE_VERSION,
};
pub use config::{
    AutoScrollConfig, ClipboardConfig, ConfigError, EditorConfig, PreviewConfig, PreviewMode,
    DEFAULT_CONFIG_NAME,
};
pub use drag_session::{CancelReason, DragController, DragError, DragOutcome, DragSession, DropCandidate};
pub use drop_resolver::{can_drop, check_drop, check_placement, resolve_position, DropPosition, DropRejection};
pub use errors::EditorError;
pub use geometry::{GeometryProvider, Point, Rect};
pub use history::{History, HistoryEntry, HistoryItem};
pub use mutations::{Applied, Mutation, MutationError, MutationKind};
pub use selection::Selection;
pub use store::{Commit, EditorStore};
