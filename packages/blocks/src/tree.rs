//! # Block Tree
//!
//! The page is a forest of top-level blocks under an implicit root. All
//! queries here are pure; structural edits go through the editor's mutation
//! engine, which works on a cloned tree and swaps it in whole.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::{BlockId, BlockKind, BlockNode, TreeError};

/// Where a node sits: its parent (`None` for the page root) and sibling index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub parent: Option<BlockId>,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockTree {
    blocks: Vec<BlockNode>,
}

impl BlockTree {
    pub fn new(blocks: Vec<BlockNode>) -> Self {
        let mut tree = Self { blocks };
        tree.renumber();
        tree
    }

    /// Parse a page tree, sorting siblings by their stored `order`.
    pub fn from_json(source: &str) -> Result<Self, TreeError> {
        let tree: BlockTree = serde_json::from_str(source)?;
        Ok(tree.normalized())
    }

    pub fn to_json_pretty(&self) -> Result<String, TreeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn blocks(&self) -> &[BlockNode] {
        &self.blocks
    }

    pub fn blocks_mut(&mut self) -> &mut Vec<BlockNode> {
        &mut self.blocks
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Total number of nodes at every depth
    pub fn node_count(&self) -> usize {
        self.flatten().len()
    }

    pub fn find(&self, id: &BlockId) -> Option<&BlockNode> {
        find_in(&self.blocks, id)
    }

    pub fn find_mut(&mut self, id: &BlockId) -> Option<&mut BlockNode> {
        find_in_mut(&mut self.blocks, id)
    }

    pub fn contains(&self, id: &BlockId) -> bool {
        self.find(id).is_some()
    }

    /// Ancestor ids ordered root-to-parent. Empty for a top-level block,
    /// `None` if `id` is not in the tree.
    pub fn path_to_root(&self, id: &BlockId) -> Option<Vec<BlockId>> {
        let mut path = Vec::new();
        path_in(&self.blocks, id, &mut path).then_some(path)
    }

    pub fn parent(&self, id: &BlockId) -> Option<&BlockNode> {
        let parent_id = self.path_to_root(id)?.pop()?;
        self.find(&parent_id)
    }

    pub fn locate(&self, id: &BlockId) -> Option<Location> {
        let path = self.path_to_root(id)?;
        let parent = path.last().cloned();
        let index = self
            .siblings(parent.as_ref())?
            .iter()
            .position(|node| &node.id == id)?;
        Some(Location { parent, index })
    }

    /// Children of `parent`, or the top-level blocks when `parent` is `None`.
    pub fn siblings(&self, parent: Option<&BlockId>) -> Option<&[BlockNode]> {
        match parent {
            None => Some(&self.blocks),
            Some(id) => self.find(id)?.children.as_deref(),
        }
    }

    pub fn siblings_mut(&mut self, parent: Option<&BlockId>) -> Option<&mut Vec<BlockNode>> {
        match parent {
            None => Some(&mut self.blocks),
            Some(id) => self.find_mut(id)?.children.as_mut(),
        }
    }

    /// All nodes in depth-first pre-order.
    pub fn flatten(&self) -> Vec<&BlockNode> {
        let mut nodes = Vec::new();
        for block in &self.blocks {
            block.walk(&mut |node| nodes.push(node));
        }
        nodes
    }

    pub fn flatten_ids(&self) -> Vec<BlockId> {
        self.flatten().into_iter().map(|node| node.id.clone()).collect()
    }

    /// True if `ancestor` appears on the path from the root to `id`.
    pub fn is_descendant_of(&self, id: &BlockId, ancestor: &BlockId) -> bool {
        self.path_to_root(id)
            .map(|path| path.contains(ancestor))
            .unwrap_or(false)
    }

    pub fn count_kind(&self, kind: BlockKind) -> usize {
        self.flatten().iter().filter(|node| node.kind == kind).count()
    }

    /// Rewrite every sibling list's `order` to its index.
    pub fn renumber(&mut self) {
        renumber_in(&mut self.blocks);
    }

    /// Sort every sibling list by stored `order` (stable), then renumber.
    pub fn normalized(mut self) -> Self {
        sort_in(&mut self.blocks);
        self.renumber();
        self
    }

    /// Report structural violations: duplicate ids, repeated singletons,
    /// children on leaf kinds, and container/child kind mismatches.
    pub fn check(&self) -> Vec<IntegrityIssue> {
        let mut issues = Vec::new();
        let mut seen = HashSet::new();

        for node in self.flatten() {
            if !seen.insert(&node.id) {
                issues.push(IntegrityIssue::DuplicateId(node.id.clone()));
            }
            if node.children.is_some() && !node.is_container() {
                issues.push(IntegrityIssue::ChildrenOnLeaf(node.id.clone()));
            }
            for child in node.children() {
                if !node.kind.accepts_child(child.kind) && node.is_container() {
                    issues.push(IntegrityIssue::MisplacedChild {
                        parent: Some(node.id.clone()),
                        child: child.id.clone(),
                    });
                }
            }
        }

        for block in &self.blocks {
            if !block.kind.allowed_at_root() {
                issues.push(IntegrityIssue::MisplacedChild {
                    parent: None,
                    child: block.id.clone(),
                });
            }
        }

        for kind in BlockKind::ALL.into_iter().filter(|k| k.is_singleton()) {
            if self.count_kind(kind) > 1 {
                issues.push(IntegrityIssue::DuplicateSingleton(kind));
            }
        }

        issues
    }
}

/// A structural violation found by [`BlockTree::check`]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IntegrityIssue {
    #[error("Duplicate block id: {0}")]
    DuplicateId(BlockId),

    #[error("Singleton kind appears more than once: {0}")]
    DuplicateSingleton(BlockKind),

    #[error("Leaf block has children: {0}")]
    ChildrenOnLeaf(BlockId),

    #[error("Block {child} is not allowed under {}", .parent.as_ref().map(|p| p.as_str()).unwrap_or("page root"))]
    MisplacedChild {
        parent: Option<BlockId>,
        child: BlockId,
    },
}

fn find_in<'a>(nodes: &'a [BlockNode], id: &BlockId) -> Option<&'a BlockNode> {
    for node in nodes {
        if &node.id == id {
            return Some(node);
        }
        if let Some(found) = find_in(node.children(), id) {
            return Some(found);
        }
    }
    None
}

fn find_in_mut<'a>(nodes: &'a mut [BlockNode], id: &BlockId) -> Option<&'a mut BlockNode> {
    for node in nodes.iter_mut() {
        if &node.id == id {
            return Some(node);
        }
        if let Some(children) = node.children.as_mut() {
            if let Some(found) = find_in_mut(children, id) {
                return Some(found);
            }
        }
    }
    None
}

fn path_in(nodes: &[BlockNode], id: &BlockId, path: &mut Vec<BlockId>) -> bool {
    for node in nodes {
        if &node.id == id {
            return true;
        }
        path.push(node.id.clone());
        if path_in(node.children(), id, path) {
            return true;
        }
        path.pop();
    }
    false
}

fn renumber_in(nodes: &mut [BlockNode]) {
    for (index, node) in nodes.iter_mut().enumerate() {
        node.order = index as i64;
        if let Some(children) = node.children.as_mut() {
            renumber_in(children);
        }
    }
}

fn sort_in(nodes: &mut [BlockNode]) {
    nodes.sort_by_key(|node| node.order);
    for node in nodes.iter_mut() {
        if let Some(children) = node.children.as_mut() {
            sort_in(children);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BlockTree {
        BlockTree::new(vec![
            BlockNode::new("header", BlockKind::Header),
            BlockNode::new("section", BlockKind::Section).with_children(vec![
                BlockNode::new("cols", BlockKind::Columns).with_children(vec![
                    BlockNode::new("col-a", BlockKind::Column)
                        .with_children(vec![BlockNode::new("img", BlockKind::Image)]),
                    BlockNode::new("col-b", BlockKind::Column),
                ]),
                BlockNode::new("text", BlockKind::Text),
            ]),
            BlockNode::new("footer", BlockKind::Footer),
        ])
    }

    fn id(s: &str) -> BlockId {
        BlockId::from(s)
    }

    #[test]
    fn test_find_nested() {
        let tree = sample();
        assert_eq!(tree.find(&id("img")).unwrap().kind, BlockKind::Image);
        assert!(tree.find(&id("missing")).is_none());
    }

    #[test]
    fn test_path_to_root() {
        let tree = sample();
        assert_eq!(
            tree.path_to_root(&id("img")).unwrap(),
            vec![id("section"), id("cols"), id("col-a")]
        );
        assert_eq!(tree.path_to_root(&id("header")).unwrap(), Vec::<BlockId>::new());
        assert!(tree.path_to_root(&id("missing")).is_none());
    }

    #[test]
    fn test_parent_and_locate() {
        let tree = sample();
        assert_eq!(tree.parent(&id("col-b")).unwrap().id, id("cols"));
        assert!(tree.parent(&id("section")).is_none());

        let location = tree.locate(&id("text")).unwrap();
        assert_eq!(location.parent, Some(id("section")));
        assert_eq!(location.index, 1);

        let root_location = tree.locate(&id("footer")).unwrap();
        assert_eq!(root_location, Location { parent: None, index: 2 });
    }

    #[test]
    fn test_flatten_pre_order() {
        let tree = sample();
        let ids: Vec<String> = tree.flatten_ids().iter().map(|i| i.to_string()).collect();
        assert_eq!(
            ids,
            vec!["header", "section", "cols", "col-a", "img", "col-b", "text", "footer"]
        );
        assert_eq!(tree.node_count(), 8);
    }

    #[test]
    fn test_from_json_sorts_by_order() {
        let tree = BlockTree::from_json(
            r#"[
                {"id": "b", "type": "text", "order": 5},
                {"id": "a", "type": "image", "order": 2}
            ]"#,
        )
        .unwrap();

        assert_eq!(tree.blocks()[0].id, id("a"));
        assert_eq!(tree.blocks()[0].order, 0);
        assert_eq!(tree.blocks()[1].order, 1);
    }

    #[test]
    fn test_check_clean_tree() {
        assert!(sample().check().is_empty());
    }

    #[test]
    fn test_check_reports_violations() {
        let tree = BlockTree::new(vec![
            BlockNode::new("h1", BlockKind::Header),
            BlockNode::new("h2", BlockKind::Header),
            BlockNode::new("col", BlockKind::Column),
            BlockNode::new("cols", BlockKind::Columns)
                .with_children(vec![BlockNode::new("h1", BlockKind::Image)]),
        ]);

        let issues = tree.check();
        assert!(issues.contains(&IntegrityIssue::DuplicateId(id("h1"))));
        assert!(issues.contains(&IntegrityIssue::DuplicateSingleton(BlockKind::Header)));
        assert!(issues.contains(&IntegrityIssue::MisplacedChild {
            parent: None,
            child: id("col"),
        }));
        assert!(issues.contains(&IntegrityIssue::MisplacedChild {
            parent: Some(id("cols")),
            child: id("h1"),
        }));
    }
}
