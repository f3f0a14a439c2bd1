//! # Selection
//!
//! Single, additive, toggle and range selection over the flattened tree.
//! The most recently clicked id is kept as the anchor for range selection.

use storefront_blocks::{BlockId, BlockTree};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    /// Selected ids, in the order they were selected
    ids: Vec<BlockId>,

    /// Anchor for range selection
    anchor: Option<BlockId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ids(&self) -> &[BlockId] {
        &self.ids
    }

    pub fn anchor(&self) -> Option<&BlockId> {
        self.anchor.as_ref()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &BlockId) -> bool {
        self.ids.contains(id)
    }

    /// Select exactly `id`.
    pub fn replace(&mut self, id: BlockId) {
        self.ids = vec![id.clone()];
        self.anchor = Some(id);
    }

    /// Add `id` to the selection.
    pub fn add(&mut self, id: BlockId) {
        if !self.ids.contains(&id) {
            self.ids.push(id.clone());
        }
        self.anchor = Some(id);
    }

    /// Flip membership of `id`.
    pub fn toggle(&mut self, id: BlockId) {
        if let Some(pos) = self.ids.iter().position(|selected| selected == &id) {
            self.ids.remove(pos);
            if self.anchor.as_ref() == Some(&id) {
                self.anchor = self.ids.last().cloned();
            }
        } else {
            self.add(id);
        }
    }

    /// Select every node between `anchor` and `target` inclusive, in
    /// flattened pre-order, regardless of depth. Returns `false` (and leaves
    /// the selection alone) if either id is not in the tree.
    pub fn range(&mut self, tree: &BlockTree, anchor: &BlockId, target: &BlockId) -> bool {
        let flat = tree.flatten_ids();
        let (Some(from), Some(to)) = (
            flat.iter().position(|id| id == anchor),
            flat.iter().position(|id| id == target),
        ) else {
            return false;
        };

        let (start, end) = if from <= to { (from, to) } else { (to, from) };
        self.ids = flat[start..=end].to_vec();
        self.anchor = Some(anchor.clone());
        true
    }

    /// Range from the current anchor to `target`; plain replace if there is
    /// no anchor yet.
    pub fn extend_to(&mut self, tree: &BlockTree, target: &BlockId) -> bool {
        match self.anchor.clone() {
            Some(anchor) => self.range(tree, &anchor, target),
            None if tree.contains(target) => {
                self.replace(target.clone());
                true
            }
            None => false,
        }
    }

    /// Replace the selection with `ids`; the last becomes the anchor.
    pub fn set(&mut self, ids: Vec<BlockId>) {
        self.anchor = ids.last().cloned();
        self.ids = ids;
    }

    pub fn clear(&mut self) {
        self.ids.clear();
        self.anchor = None;
    }

    /// Drop ids no longer present in `tree`.
    pub fn retain_existing(&mut self, tree: &BlockTree) {
        self.ids.retain(|id| tree.contains(id));
        if let Some(anchor) = &self.anchor {
            if !tree.contains(anchor) {
                self.anchor = self.ids.last().cloned();
            }
        }
    }

    /// The ids a drag starting on `dragged` carries: the full selection in
    /// tree order when `dragged` is part of a multi-selection, otherwise just
    /// `dragged`.
    pub fn drag_set(&self, tree: &BlockTree, dragged: &BlockId) -> Vec<BlockId> {
        if self.ids.len() > 1 && self.contains(dragged) {
            tree.flatten_ids()
                .into_iter()
                .filter(|id| self.contains(id))
                .collect()
        } else {
            vec![dragged.clone()]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_blocks::{BlockKind, BlockNode};

    fn id(s: &str) -> BlockId {
        BlockId::from(s)
    }

    fn tree() -> BlockTree {
        BlockTree::new(vec![
            BlockNode::new("a", BlockKind::Hero),
            BlockNode::new("s", BlockKind::Section).with_children(vec![
                BlockNode::new("s1", BlockKind::Text),
                BlockNode::new("s2", BlockKind::Image),
            ]),
            BlockNode::new("b", BlockKind::Button),
        ])
    }

    #[test]
    fn test_replace_add_toggle() {
        let mut selection = Selection::new();
        selection.replace(id("a"));
        selection.add(id("b"));
        assert_eq!(selection.ids(), &[id("a"), id("b")]);
        assert_eq!(selection.anchor(), Some(&id("b")));

        selection.toggle(id("b"));
        assert_eq!(selection.ids(), &[id("a")]);
        assert_eq!(selection.anchor(), Some(&id("a")));

        selection.toggle(id("s"));
        assert_eq!(selection.len(), 2);
    }

    #[test]
    fn test_range_crosses_depths() {
        let tree = tree();
        let mut selection = Selection::new();
        assert!(selection.range(&tree, &id("s2"), &id("a")));
        assert_eq!(selection.ids(), &[id("a"), id("s"), id("s1"), id("s2")]);
        assert_eq!(selection.anchor(), Some(&id("s2")));
    }

    #[test]
    fn test_range_with_unknown_id_is_noop() {
        let tree = tree();
        let mut selection = Selection::new();
        selection.replace(id("a"));
        assert!(!selection.range(&tree, &id("a"), &id("missing")));
        assert_eq!(selection.ids(), &[id("a")]);
    }

    #[test]
    fn test_extend_to_uses_anchor() {
        let tree = tree();
        let mut selection = Selection::new();
        selection.replace(id("s1"));
        assert!(selection.extend_to(&tree, &id("b")));
        assert_eq!(selection.ids(), &[id("s1"), id("s2"), id("b")]);
    }

    #[test]
    fn test_retain_existing_after_delete() {
        let mut selection = Selection::new();
        selection.set(vec![id("a"), id("gone")]);
        selection.retain_existing(&tree());
        assert_eq!(selection.ids(), &[id("a")]);
        assert_eq!(selection.anchor(), Some(&id("a")));
    }

    #[test]
    fn test_drag_set_expands_multi_selection_in_tree_order() {
        let tree = tree();
        let mut selection = Selection::new();
        selection.set(vec![id("b"), id("s1")]);

        assert_eq!(selection.drag_set(&tree, &id("b")), vec![id("s1"), id("b")]);
        assert_eq!(selection.drag_set(&tree, &id("a")), vec![id("a")]);
    }
}
