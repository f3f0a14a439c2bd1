//! Error types for the block tree

use crate::BlockId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TreeError {
    #[error("Node not found: {0}")]
    NodeNotFound(BlockId),

    #[error("Unknown block kind: {0}")]
    UnknownKind(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum PageIoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Tree(#[from] TreeError),
}
