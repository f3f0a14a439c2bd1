//! Error types for the editor

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Mutation error: {0}")]
    Mutation(#[from] crate::mutations::MutationError),

    #[error("Drag error: {0}")]
    Drag(#[from] crate::drag_session::DragError),

    #[error("Clipboard error: {0}")]
    Clipboard(#[from] crate::clipboard::ClipboardError),

    #[error("Config error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Page error: {0}")]
    Page(#[from] storefront_blocks::PageIoError),
}
