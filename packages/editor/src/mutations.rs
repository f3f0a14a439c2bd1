//! # Tree Mutations
//!
//! The only write path into a page tree.
//!
//! ## Design Principles
//!
//! 1. **Intent-preserving**: each mutation is one user-level operation
//! 2. **Validated**: structural rules are checked against the tree the
//!    mutation is applied to, even if the caller validated earlier
//! 3. **Non-destructive**: `apply` never touches its input; it returns a new
//!    tree, so history snapshots and in-flight readers stay valid
//!
//! ## Mutation Semantics
//!
//! ### Reorder
//! - Array-move within one sibling list
//! - When `from_index < to_index` the removal shifts the insertion point
//!   down by one, so `to_index` always names a slot in the original list
//!
//! ### Move / Reparent
//! - Dragged nodes keep their tree order; a node whose ancestor is also
//!   dragged travels with that ancestor
//! - Fails on cycles, kind mismatches and locks (see `drop_resolver`)
//!
//! ### Duplicate
//! - Deep clone with a fresh id on every cloned node, inserted right after
//!   the original
//!
//! ### Delete
//! - Removes node and all descendants
//! - Refused for `header`/`footer` and locked subtrees
//!
//! ### Locks
//! - A locked node cannot be moved, removed or regrouped, and its own child
//!   list cannot change. Settings and visibility stay editable.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use storefront_blocks::{BlockId, BlockKind, BlockNode, BlockTree, IdGenerator, Settings};

use crate::drop_resolver::{check_drop, check_placement, DropPosition, DropRejection};

/// Structural and content operations on the page tree
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Mutation {
    /// Move a sibling from one index to another within the same parent
    Reorder {
        #[serde(default)]
        parent_id: Option<BlockId>,
        from_index: usize,
        to_index: usize,
    },

    /// Drop one or more nodes before, after or inside a target
    Move {
        node_ids: Vec<BlockId>,
        target_id: BlockId,
        position: DropPosition,
    },

    /// Detach a node and insert it into a container
    Reparent {
        node_id: BlockId,
        container_id: BlockId,
        #[serde(default)]
        insert_index: Option<usize>,
    },

    /// Insert a copy of `node` with fresh ids on every node
    Insert {
        #[serde(default)]
        parent_id: Option<BlockId>,
        #[serde(default)]
        index: Option<usize>,
        node: BlockNode,
    },

    /// Create an empty block of `kind` right after `target_id`
    AddBelow { target_id: BlockId, kind: BlockKind },

    Duplicate { node_ids: Vec<BlockId> },

    Delete { node_ids: Vec<BlockId> },

    /// Wrap two or more siblings in a new group container
    Group { node_ids: Vec<BlockId> },

    /// Splice a group's children back into its parent
    Ungroup { group_id: BlockId },

    MoveUp { node_id: BlockId },

    MoveDown { node_id: BlockId },

    /// Shallow-merge into `settings`; `null` values remove keys
    UpdateSettings { node_id: BlockId, patch: Settings },

    SetVisible { node_id: BlockId, visible: bool },

    SetLocked { node_id: BlockId, locked: bool },
}

/// Coarse category recorded in history entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    Reorder,
    Move,
    Reparent,
    Insert,
    Duplicate,
    Delete,
    Group,
    Ungroup,
    UpdateSettings,
    SetVisibility,
    SetLock,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Node not found: {0}")]
    NodeNotFound(BlockId),

    #[error("Parent not found: {0}")]
    ParentNotFound(BlockId),

    #[error("Block {0} is locked")]
    Locked(BlockId),

    #[error("Cannot remove or copy the {0} block")]
    Singleton(BlockKind),

    #[error("The page already has a {0} block")]
    SingletonExists(BlockKind),

    #[error("Drop rejected: {0}")]
    DropRejected(#[from] DropRejection),

    #[error("Index {index} out of range for {len} siblings")]
    InvalidIndex { index: usize, len: usize },

    #[error("Block {0} is already at the edge of its parent")]
    AtBoundary(BlockId),

    #[error("No blocks given")]
    NothingSelected,

    #[error("Grouping needs at least two blocks")]
    TooFewNodes,

    #[error("Blocks do not share a parent")]
    NotSiblings,

    #[error("Block {0} is not a group")]
    NotAGroup(BlockId),
}

/// Result of applying a mutation: the new tree plus what changed
#[derive(Debug, Clone)]
pub struct Applied {
    pub tree: BlockTree,

    pub kind: MutationKind,

    pub description: String,

    /// Nodes the mutation created, moved or removed
    pub affected: Vec<BlockId>,
}

impl Mutation {
    pub fn kind(&self) -> MutationKind {
        match self {
            Mutation::Reorder { .. } | Mutation::MoveUp { .. } | Mutation::MoveDown { .. } => {
                MutationKind::Reorder
            }
            Mutation::Move { .. } => MutationKind::Move,
            Mutation::Reparent { .. } => MutationKind::Reparent,
            Mutation::Insert { .. } | Mutation::AddBelow { .. } => MutationKind::Insert,
            Mutation::Duplicate { .. } => MutationKind::Duplicate,
            Mutation::Delete { .. } => MutationKind::Delete,
            Mutation::Group { .. } => MutationKind::Group,
            Mutation::Ungroup { .. } => MutationKind::Ungroup,
            Mutation::UpdateSettings { .. } => MutationKind::UpdateSettings,
            Mutation::SetVisible { .. } => MutationKind::SetVisibility,
            Mutation::SetLocked { .. } => MutationKind::SetLock,
        }
    }

    /// Apply to a copy of `tree`, returning the new tree.
    ///
    /// `tree` is left untouched whether or not this succeeds.
    pub fn apply(&self, tree: &BlockTree, ids: &mut IdGenerator) -> Result<Applied, MutationError> {
        // Validate first
        self.validate(tree)?;

        let description = self.describe(tree);
        let mut next = tree.clone();

        let affected = match self {
            Mutation::Reorder { parent_id, from_index, to_index } => {
                Self::apply_reorder(&mut next, parent_id.as_ref(), *from_index, *to_index)?
            }

            Mutation::Move { node_ids, target_id, position } => {
                let dragged = normalize_ids(tree, node_ids)?;
                Self::apply_move(&mut next, &dragged, target_id, *position)?
            }

            Mutation::Reparent { node_id, container_id, insert_index } => {
                Self::apply_reparent(&mut next, node_id, container_id, *insert_index)?
            }

            Mutation::Insert { parent_id, index, node } => {
                Self::apply_insert(&mut next, parent_id.as_ref(), *index, node.clone(), ids)?
            }

            Mutation::AddBelow { target_id, kind } => {
                Self::apply_add_below(&mut next, target_id, *kind, ids)?
            }

            Mutation::Duplicate { node_ids } => {
                let originals = normalize_ids(tree, node_ids)?;
                Self::apply_duplicate(&mut next, &originals, ids)?
            }

            Mutation::Delete { node_ids } => {
                let targets = normalize_ids(tree, node_ids)?;
                for id in &targets {
                    detach(&mut next, id)?;
                }
                targets
            }

            Mutation::Group { node_ids } => {
                let members = normalize_ids(tree, node_ids)?;
                Self::apply_group(&mut next, &members, ids)?
            }

            Mutation::Ungroup { group_id } => Self::apply_ungroup(&mut next, group_id)?,

            Mutation::MoveUp { node_id } => {
                let location = locate(tree, node_id)?;
                Self::apply_reorder(
                    &mut next,
                    location.parent.as_ref(),
                    location.index,
                    location.index - 1,
                )?
            }

            Mutation::MoveDown { node_id } => {
                let location = locate(tree, node_id)?;
                Self::apply_reorder(
                    &mut next,
                    location.parent.as_ref(),
                    location.index,
                    location.index + 2,
                )?
            }

            Mutation::UpdateSettings { node_id, patch } => {
                let node = get_mut(&mut next, node_id)?;
                for (key, value) in patch {
                    if value.is_null() {
                        node.settings.remove(key);
                    } else {
                        node.settings.insert(key.clone(), value.clone());
                    }
                }
                vec![node_id.clone()]
            }

            Mutation::SetVisible { node_id, visible } => {
                get_mut(&mut next, node_id)?.visible = *visible;
                vec![node_id.clone()]
            }

            Mutation::SetLocked { node_id, locked } => {
                get_mut(&mut next, node_id)?.locked = *locked;
                vec![node_id.clone()]
            }
        };

        next.renumber();

        Ok(Applied {
            tree: next,
            kind: self.kind(),
            description,
            affected,
        })
    }

    /// Validate without applying
    pub fn validate(&self, tree: &BlockTree) -> Result<(), MutationError> {
        match self {
            Mutation::Reorder { parent_id, from_index, to_index } => {
                let siblings = siblings(tree, parent_id.as_ref())?;
                if *from_index >= siblings.len() {
                    return Err(MutationError::InvalidIndex { index: *from_index, len: siblings.len() });
                }
                if *to_index > siblings.len() {
                    return Err(MutationError::InvalidIndex { index: *to_index, len: siblings.len() });
                }
                ensure_editable(tree, parent_id.as_ref())?;
                ensure_unlocked(&siblings[*from_index])
            }

            Mutation::Move { node_ids, target_id, position } => {
                let target = get(tree, target_id)?;
                for id in normalize_ids(tree, node_ids)? {
                    let dragged = get(tree, &id)?;
                    ensure_unlocked(dragged)?;
                    ensure_editable(tree, locate(tree, &id)?.parent.as_ref())?;
                    check_drop(tree, dragged, target, *position)?;
                }
                Ok(())
            }

            Mutation::Reparent { node_id, container_id, .. } => {
                let node = get(tree, node_id)?;
                let container = get(tree, container_id)?;
                ensure_unlocked(node)?;
                ensure_editable(tree, locate(tree, node_id)?.parent.as_ref())?;
                check_drop(tree, node, container, DropPosition::Inside)?;
                Ok(())
            }

            Mutation::Insert { parent_id, node, .. } => {
                let parent = match parent_id {
                    Some(id) => Some(
                        tree.find(id)
                            .ok_or_else(|| MutationError::ParentNotFound(id.clone()))?,
                    ),
                    None => None,
                };
                check_placement(parent, node.kind)?;
                ensure_editable(tree, parent_id.as_ref())?;
                ensure_singletons_free(tree, node)
            }

            Mutation::AddBelow { target_id, kind } => {
                let location = locate(tree, target_id)?;
                check_placement(tree.parent(target_id), *kind)?;
                ensure_editable(tree, location.parent.as_ref())?;
                ensure_singletons_free(tree, &BlockNode::new("", *kind))
            }

            Mutation::Duplicate { node_ids } => {
                for id in normalize_ids(tree, node_ids)? {
                    let node = get(tree, &id)?;
                    if let Some(kind) = singleton_in(node) {
                        return Err(MutationError::Singleton(kind));
                    }
                    ensure_editable(tree, locate(tree, &id)?.parent.as_ref())?;
                }
                Ok(())
            }

            Mutation::Delete { node_ids } => {
                for id in normalize_ids(tree, node_ids)? {
                    let node = get(tree, &id)?;
                    if let Some(kind) = singleton_in(node) {
                        return Err(MutationError::Singleton(kind));
                    }
                    let mut locked = None;
                    node.walk(&mut |n| {
                        if n.locked && locked.is_none() {
                            locked = Some(n.id.clone());
                        }
                    });
                    if let Some(id) = locked {
                        return Err(MutationError::Locked(id));
                    }
                    ensure_editable(tree, locate(tree, &id)?.parent.as_ref())?;
                }
                Ok(())
            }

            Mutation::Group { node_ids } => {
                let members = normalize_ids(tree, node_ids)?;
                if members.len() < 2 {
                    return Err(MutationError::TooFewNodes);
                }
                let parent = locate(tree, &members[0])?.parent;
                for id in &members {
                    if locate(tree, id)?.parent != parent {
                        return Err(MutationError::NotSiblings);
                    }
                    ensure_unlocked(get(tree, id)?)?;
                }
                ensure_editable(tree, parent.as_ref())?;
                let parent_node = parent.as_ref().map(|id| get(tree, id)).transpose()?;
                check_placement(parent_node, BlockKind::Group)?;
                Ok(())
            }

            Mutation::Ungroup { group_id } => {
                let group = get(tree, group_id)?;
                if group.kind != BlockKind::Group {
                    return Err(MutationError::NotAGroup(group_id.clone()));
                }
                ensure_unlocked(group)?;
                let parent = tree.parent(group_id);
                ensure_editable(tree, parent.map(|p| &p.id))?;
                for child in group.children() {
                    check_placement(parent, child.kind)?;
                }
                Ok(())
            }

            Mutation::MoveUp { node_id } | Mutation::MoveDown { node_id } => {
                let location = locate(tree, node_id)?;
                let len = siblings(tree, location.parent.as_ref())?.len();
                let at_edge = match self {
                    Mutation::MoveUp { .. } => location.index == 0,
                    _ => location.index + 1 >= len,
                };
                if at_edge {
                    return Err(MutationError::AtBoundary(node_id.clone()));
                }
                ensure_unlocked(get(tree, node_id)?)?;
                ensure_editable(tree, location.parent.as_ref())
            }

            Mutation::UpdateSettings { node_id, .. }
            | Mutation::SetVisible { node_id, .. }
            | Mutation::SetLocked { node_id, .. } => {
                get(tree, node_id)?;
                Ok(())
            }
        }
    }

    /// Human-readable summary for the history panel
    pub fn describe(&self, tree: &BlockTree) -> String {
        match self {
            Mutation::Reorder { parent_id, from_index, .. } => {
                let name = tree
                    .siblings(parent_id.as_ref())
                    .and_then(|s| s.get(*from_index))
                    .map(|n| n.kind.to_string())
                    .unwrap_or_else(|| "block".to_string());
                format!("Reordered {}", name)
            }
            Mutation::Move { node_ids, .. } => format!("Moved {}", label(tree, node_ids)),
            Mutation::Reparent { node_id, container_id, .. } => format!(
                "Moved {} into {}",
                label(tree, std::slice::from_ref(node_id)),
                label(tree, std::slice::from_ref(container_id))
            ),
            Mutation::Insert { node, .. } => format!("Added {}", node.kind),
            Mutation::AddBelow { kind, .. } => format!("Added {}", kind),
            Mutation::Duplicate { node_ids } => format!("Duplicated {}", label(tree, node_ids)),
            Mutation::Delete { node_ids } => format!("Deleted {}", label(tree, node_ids)),
            Mutation::Group { node_ids } => format!("Grouped {} blocks", node_ids.len()),
            Mutation::Ungroup { .. } => "Ungrouped blocks".to_string(),
            Mutation::MoveUp { node_id } => {
                format!("Moved {} up", label(tree, std::slice::from_ref(node_id)))
            }
            Mutation::MoveDown { node_id } => {
                format!("Moved {} down", label(tree, std::slice::from_ref(node_id)))
            }
            Mutation::UpdateSettings { node_id, .. } => {
                format!("Updated {} settings", label(tree, std::slice::from_ref(node_id)))
            }
            Mutation::SetVisible { node_id, visible } => format!(
                "{} {}",
                if *visible { "Showed" } else { "Hid" },
                label(tree, std::slice::from_ref(node_id))
            ),
            Mutation::SetLocked { node_id, locked } => format!(
                "{} {}",
                if *locked { "Locked" } else { "Unlocked" },
                label(tree, std::slice::from_ref(node_id))
            ),
        }
    }

    fn apply_reorder(
        tree: &mut BlockTree,
        parent_id: Option<&BlockId>,
        from_index: usize,
        to_index: usize,
    ) -> Result<Vec<BlockId>, MutationError> {
        let siblings = siblings_mut(tree, parent_id)?;
        if from_index >= siblings.len() {
            return Err(MutationError::InvalidIndex { index: from_index, len: siblings.len() });
        }

        let node = siblings.remove(from_index);
        let insert_index = if from_index < to_index { to_index - 1 } else { to_index };
        let moved = node.id.clone();
        siblings.insert(insert_index.min(siblings.len()), node);

        Ok(vec![moved])
    }

    fn apply_move(
        tree: &mut BlockTree,
        dragged: &[BlockId],
        target_id: &BlockId,
        position: DropPosition,
    ) -> Result<Vec<BlockId>, MutationError> {
        let mut nodes = Vec::with_capacity(dragged.len());
        for id in dragged {
            nodes.push(detach(tree, id)?);
        }

        let (parent, index) = match position {
            DropPosition::Inside => (Some(target_id.clone()), None),
            DropPosition::Before | DropPosition::After => {
                let location = locate(tree, target_id)?;
                let offset = usize::from(position == DropPosition::After);
                (location.parent, Some(location.index + offset))
            }
        };

        let siblings = siblings_mut(tree, parent.as_ref())?;
        let mut index = index.unwrap_or(siblings.len()).min(siblings.len());
        for node in nodes {
            siblings.insert(index, node);
            index += 1;
        }

        Ok(dragged.to_vec())
    }

    fn apply_reparent(
        tree: &mut BlockTree,
        node_id: &BlockId,
        container_id: &BlockId,
        insert_index: Option<usize>,
    ) -> Result<Vec<BlockId>, MutationError> {
        let node = detach(tree, node_id)?;
        let children = siblings_mut(tree, Some(container_id))?;
        let index = insert_index.unwrap_or(children.len()).min(children.len());
        children.insert(index, node);
        Ok(vec![node_id.clone()])
    }

    fn apply_insert(
        tree: &mut BlockTree,
        parent_id: Option<&BlockId>,
        index: Option<usize>,
        mut node: BlockNode,
        ids: &mut IdGenerator,
    ) -> Result<Vec<BlockId>, MutationError> {
        node.sort_by_order();
        reassign_ids(&mut node, ids);
        let new_id = node.id.clone();

        let siblings = siblings_mut(tree, parent_id)?;
        let index = index.unwrap_or(siblings.len()).min(siblings.len());
        siblings.insert(index, node);

        Ok(vec![new_id])
    }

    fn apply_add_below(
        tree: &mut BlockTree,
        target_id: &BlockId,
        kind: BlockKind,
        ids: &mut IdGenerator,
    ) -> Result<Vec<BlockId>, MutationError> {
        let location = locate(tree, target_id)?;
        let node = BlockNode::new(ids.new_id(), kind);
        let new_id = node.id.clone();

        siblings_mut(tree, location.parent.as_ref())?.insert(location.index + 1, node);

        Ok(vec![new_id])
    }

    fn apply_duplicate(
        tree: &mut BlockTree,
        originals: &[BlockId],
        ids: &mut IdGenerator,
    ) -> Result<Vec<BlockId>, MutationError> {
        let mut created = Vec::with_capacity(originals.len());

        for id in originals {
            let mut copy = get(tree, id)?.clone();
            reassign_ids(&mut copy, ids);
            created.push(copy.id.clone());

            let location = locate(tree, id)?;
            siblings_mut(tree, location.parent.as_ref())?.insert(location.index + 1, copy);
        }

        Ok(created)
    }

    fn apply_group(
        tree: &mut BlockTree,
        members: &[BlockId],
        ids: &mut IdGenerator,
    ) -> Result<Vec<BlockId>, MutationError> {
        let parent = locate(tree, &members[0])?.parent;
        let group_id = ids.new_id();

        let siblings = siblings_mut(tree, parent.as_ref())?;
        let mut indices: Vec<usize> = members
            .iter()
            .filter_map(|id| siblings.iter().position(|node| &node.id == id))
            .collect();
        indices.sort_unstable();
        let first = *indices.first().ok_or(MutationError::NothingSelected)?;

        // Remove back to front so earlier indices stay valid
        let mut children: Vec<BlockNode> = indices
            .iter()
            .rev()
            .map(|&index| siblings.remove(index))
            .collect();
        children.reverse();
        for child in &mut children {
            child.group_id = Some(group_id.to_string());
        }

        let group = BlockNode::new(group_id.clone(), BlockKind::Group).with_children(children);
        siblings.insert(first, group);

        Ok(vec![group_id])
    }

    fn apply_ungroup(tree: &mut BlockTree, group_id: &BlockId) -> Result<Vec<BlockId>, MutationError> {
        let location = locate(tree, group_id)?;
        let siblings = siblings_mut(tree, location.parent.as_ref())?;

        let group = siblings.remove(location.index);
        let mut children = group.children.unwrap_or_default();
        for child in &mut children {
            if child.group_id.as_deref() == Some(group_id.as_str()) {
                child.group_id = None;
            }
        }

        let released: Vec<BlockId> = children.iter().map(|c| c.id.clone()).collect();
        siblings.splice(location.index..location.index, children);

        Ok(released)
    }
}

fn get<'a>(tree: &'a BlockTree, id: &BlockId) -> Result<&'a BlockNode, MutationError> {
    tree.find(id).ok_or_else(|| MutationError::NodeNotFound(id.clone()))
}

fn get_mut<'a>(tree: &'a mut BlockTree, id: &BlockId) -> Result<&'a mut BlockNode, MutationError> {
    tree.find_mut(id).ok_or_else(|| MutationError::NodeNotFound(id.clone()))
}

fn locate(tree: &BlockTree, id: &BlockId) -> Result<storefront_blocks::Location, MutationError> {
    tree.locate(id).ok_or_else(|| MutationError::NodeNotFound(id.clone()))
}

fn siblings<'a>(tree: &'a BlockTree, parent: Option<&BlockId>) -> Result<&'a [BlockNode], MutationError> {
    let Some(id) = parent else {
        return Ok(tree.blocks());
    };
    let node = tree.find(id).ok_or_else(|| MutationError::ParentNotFound(id.clone()))?;
    if !node.is_container() {
        return Err(DropRejection::NotAContainer(id.clone()).into());
    }
    Ok(node.children())
}

fn siblings_mut<'a>(
    tree: &'a mut BlockTree,
    parent: Option<&BlockId>,
) -> Result<&'a mut Vec<BlockNode>, MutationError> {
    let Some(id) = parent else {
        return Ok(tree.blocks_mut());
    };
    let node = tree.find_mut(id).ok_or_else(|| MutationError::ParentNotFound(id.clone()))?;
    if !node.is_container() {
        return Err(DropRejection::NotAContainer(id.clone()).into());
    }
    Ok(node.children.get_or_insert_with(Vec::new))
}

/// Remove a node (and its subtree) from wherever it sits.
fn detach(tree: &mut BlockTree, id: &BlockId) -> Result<BlockNode, MutationError> {
    let location = locate(tree, id)?;
    Ok(siblings_mut(tree, location.parent.as_ref())?.remove(location.index))
}

fn reassign_ids(node: &mut BlockNode, ids: &mut IdGenerator) {
    node.walk_mut(&mut |n| n.id = ids.new_id());
}

fn ensure_unlocked(node: &BlockNode) -> Result<(), MutationError> {
    if node.locked {
        Err(MutationError::Locked(node.id.clone()))
    } else {
        Ok(())
    }
}

/// The child list owned by `owner` (page root when `None`) may change.
fn ensure_editable(tree: &BlockTree, owner: Option<&BlockId>) -> Result<(), MutationError> {
    match owner {
        Some(id) => ensure_unlocked(get(tree, id)?),
        None => Ok(()),
    }
}

fn singleton_in(node: &BlockNode) -> Option<BlockKind> {
    let mut found = None;
    node.walk(&mut |n| {
        if n.kind.is_singleton() && found.is_none() {
            found = Some(n.kind);
        }
    });
    found
}

/// Inserting `node` must not produce a second header or footer.
fn ensure_singletons_free(tree: &BlockTree, node: &BlockNode) -> Result<(), MutationError> {
    for kind in BlockKind::ALL.into_iter().filter(|k| k.is_singleton()) {
        let mut incoming = 0;
        node.walk(&mut |n| {
            if n.kind == kind {
                incoming += 1;
            }
        });
        if incoming > 0 && tree.count_kind(kind) + incoming > 1 {
            return Err(MutationError::SingletonExists(kind));
        }
    }
    Ok(())
}

/// Dedupe, check existence, drop ids carried by a selected ancestor, and
/// order by tree position.
fn normalize_ids(tree: &BlockTree, node_ids: &[BlockId]) -> Result<Vec<BlockId>, MutationError> {
    if node_ids.is_empty() {
        return Err(MutationError::NothingSelected);
    }
    for id in node_ids {
        get(tree, id)?;
    }

    Ok(tree
        .flatten_ids()
        .into_iter()
        .filter(|id| node_ids.contains(id))
        .filter(|id| {
            !node_ids
                .iter()
                .any(|other| other != id && tree.is_descendant_of(id, other))
        })
        .collect())
}

fn label(tree: &BlockTree, ids: &[BlockId]) -> String {
    match ids {
        [single] => tree
            .find(single)
            .map(|node| node.kind.to_string())
            .unwrap_or_else(|| "block".to_string()),
        many => format!("{} blocks", many.len()),
    }
}
