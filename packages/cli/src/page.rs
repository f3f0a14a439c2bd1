use anyhow::Context;
use std::path::{Path, PathBuf};
use storefront_blocks::PageDocument;

/// Resolve `path` against the working directory
pub fn resolve(cwd: &str, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        PathBuf::from(cwd).join(path)
    }
}

pub fn load(path: &Path) -> anyhow::Result<PageDocument> {
    PageDocument::load(path).with_context(|| format!("Failed to load page {}", path.display()))
}

pub fn save(document: &PageDocument, path: &Path) -> anyhow::Result<()> {
    document
        .save(path)
        .with_context(|| format!("Failed to write page {}", path.display()))
}
