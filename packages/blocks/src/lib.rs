//! # Storefront Blocks
//!
//! The page tree model for the storefront builder.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ blocks: node shape + pure tree queries      │
//! │  - BlockNode / BlockKind / BlockId          │
//! │  - find, path_to_root, parent, flatten      │
//! │  - integrity check, id generation           │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: drop validation, drag sessions,     │
//! │         mutations, selection, history       │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ preview: in-process / isolated sync         │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Nothing in this crate mutates a tree in place on behalf of callers other
//! than the editor's mutation engine; queries take `&BlockTree`.

mod document;
mod error;
mod id_generator;
mod kind;
mod node;
mod tree;

pub use document::{PageDocument, PageStatus};
pub use error::{PageIoError, TreeError};
pub use id_generator::{get_page_seed, IdGenerator};
pub use kind::BlockKind;
pub use node::{BlockId, BlockNode, Settings};
pub use tree::{BlockTree, IntegrityIssue, Location};
