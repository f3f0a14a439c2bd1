//! In-process preview: renders straight from the store's watch channels.
//! No serialization, so no failure mode beyond the renderer's own.

use std::sync::Arc;

use tokio::sync::watch;

use storefront_blocks::{BlockId, BlockTree};
use storefront_editor::EditorStore;

pub struct InProcessPreview {
    tree: watch::Receiver<Arc<BlockTree>>,
    selection: watch::Receiver<Vec<BlockId>>,
}

impl InProcessPreview {
    pub fn attach(store: &EditorStore) -> Self {
        Self {
            tree: store.subscribe(),
            selection: store.subscribe_selection(),
        }
    }

    /// Tree to render right now
    pub fn tree(&self) -> Arc<BlockTree> {
        self.tree.borrow().clone()
    }

    pub fn selection(&self) -> Vec<BlockId> {
        self.selection.borrow().clone()
    }

    /// Whether a new tree arrived since the last [`Self::next_tree`]
    pub fn is_stale(&self) -> bool {
        self.tree.has_changed().unwrap_or(false)
    }

    /// Wait for the next tree. `None` once the store is gone.
    pub async fn next_tree(&mut self) -> Option<Arc<BlockTree>> {
        self.tree.changed().await.ok()?;
        Some(self.tree.borrow_and_update().clone())
    }

    pub async fn next_selection(&mut self) -> Option<Vec<BlockId>> {
        self.selection.changed().await.ok()?;
        Some(self.selection.borrow_and_update().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_blocks::{BlockKind, BlockNode};
    use storefront_editor::EditorConfig;

    fn store() -> EditorStore {
        let tree = BlockTree::new(vec![
            BlockNode::new("hero", BlockKind::Hero),
            BlockNode::new("text", BlockKind::Text),
        ]);
        EditorStore::new("home", tree, &EditorConfig::default())
    }

    #[tokio::test]
    async fn test_preview_follows_store() {
        let mut store = store();
        let mut preview = InProcessPreview::attach(&store);
        assert_eq!(preview.tree().node_count(), 2);
        assert!(!preview.is_stale());

        store.duplicate(vec![BlockId::from("text")]).unwrap();
        assert!(preview.is_stale());

        let tree = preview.next_tree().await.unwrap();
        assert_eq!(tree.node_count(), 3);
        assert!(!preview.is_stale());
    }

    #[tokio::test]
    async fn test_selection_updates() {
        let mut store = store();
        let mut preview = InProcessPreview::attach(&store);

        store.select(&BlockId::from("hero"));
        assert_eq!(preview.next_selection().await.unwrap(), vec![BlockId::from("hero")]);
    }

    #[tokio::test]
    async fn test_store_drop_ends_stream() {
        let store = store();
        let mut preview = InProcessPreview::attach(&store);
        drop(store);
        assert!(preview.next_tree().await.is_none());
    }
}
