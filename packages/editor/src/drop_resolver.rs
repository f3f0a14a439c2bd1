//! # Drop Position Resolver
//!
//! Turns pointer geometry into a structural decision and validates it.
//!
//! ## Thresholds
//!
//! ```text
//!   leaf target          container target
//! ┌──────────────┐     ┌──────────────┐
//! │   before     │     │ before  25%  │
//! │   (top 50%)  │     ├──────────────┤
//! ├──────────────┤     │ inside  50%  │
//! │   after      │     ├──────────────┤
//! │   (bottom)   │     │ after   25%  │
//! └──────────────┘     └──────────────┘
//! ```
//!
//! ## Validation order
//!
//! [`check_drop`] short-circuits on the first failing rule, and later rules
//! assume the earlier ones passed:
//!
//! 1. self drop
//! 2. `inside` a leaf
//! 3. target is a descendant of the dragged node (cycle)
//! 4. `column` reordered against a target under a different parent
//! 5. non-`column` dropped `inside` a `columns`
//! 6. destination parent does not accept the dragged kind
//! 7. destination container is locked

use serde::{Deserialize, Serialize};
use thiserror::Error;

use storefront_blocks::{BlockId, BlockKind, BlockNode, BlockTree};

use crate::geometry::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropPosition {
    Before,
    After,
    Inside,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DropRejection {
    #[error("Cannot drop a block onto itself")]
    SelfDrop,

    #[error("Block {0} cannot hold children")]
    NotAContainer(BlockId),

    #[error("Would create cycle")]
    CycleDetected,

    #[error("Columns can only be reordered within their own columns block")]
    ColumnOutsideParent,

    #[error("A columns block only accepts column children")]
    ColumnsOnlyAcceptColumn,

    #[error("A {child} block cannot be placed under {parent}")]
    IncompatibleParent { parent: String, child: BlockKind },

    #[error("Block {0} is locked")]
    TargetLocked(BlockId),
}

/// Which side of the target the pointer is on.
pub fn resolve_position(pointer_y: f32, target: Rect, is_container: bool) -> DropPosition {
    let relative = if target.height > 0.0 {
        (pointer_y - target.top()) / target.height
    } else {
        0.5
    };

    if is_container {
        if relative < 0.25 {
            DropPosition::Before
        } else if relative > 0.75 {
            DropPosition::After
        } else {
            DropPosition::Inside
        }
    } else if relative < 0.5 {
        DropPosition::Before
    } else {
        DropPosition::After
    }
}

/// Validate placing `dragged` at `position` relative to `target`.
pub fn check_drop(
    tree: &BlockTree,
    dragged: &BlockNode,
    target: &BlockNode,
    position: DropPosition,
) -> Result<(), DropRejection> {
    if dragged.id == target.id {
        return Err(DropRejection::SelfDrop);
    }

    let inside = position == DropPosition::Inside;

    if inside && !target.is_container() {
        return Err(DropRejection::NotAContainer(target.id.clone()));
    }

    // Applies to every position: before/after a descendant would also land
    // the dragged node inside its own subtree.
    if tree.is_descendant_of(&target.id, &dragged.id) {
        return Err(DropRejection::CycleDetected);
    }

    if dragged.kind == BlockKind::Column && !inside {
        let dragged_parent = tree.parent(&dragged.id).map(|p| &p.id);
        let target_parent = tree.parent(&target.id).map(|p| &p.id);
        if dragged_parent != target_parent {
            return Err(DropRejection::ColumnOutsideParent);
        }
    }

    if inside && target.kind == BlockKind::Columns && dragged.kind != BlockKind::Column {
        return Err(DropRejection::ColumnsOnlyAcceptColumn);
    }

    let destination = if inside { Some(target) } else { tree.parent(&target.id) };
    check_placement(destination, dragged.kind)?;

    if let Some(owner) = destination.filter(|owner| owner.locked) {
        return Err(DropRejection::TargetLocked(owner.id.clone()));
    }

    Ok(())
}

/// Whether a node of `child` kind may sit directly under `parent`
/// (`None` meaning the page root).
pub fn check_placement(parent: Option<&BlockNode>, child: BlockKind) -> Result<(), DropRejection> {
    let allowed = match parent {
        Some(parent) => parent.kind.accepts_child(child),
        None => child.allowed_at_root(),
    };

    if allowed {
        Ok(())
    } else {
        Err(DropRejection::IncompatibleParent {
            parent: parent
                .map(|p| p.kind.to_string())
                .unwrap_or_else(|| "page root".to_string()),
            child,
        })
    }
}

/// Boolean form of [`check_drop`].
pub fn can_drop(
    tree: &BlockTree,
    dragged: &BlockNode,
    target: &BlockNode,
    position: DropPosition,
) -> bool {
    check_drop(tree, dragged, target, position).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> BlockId {
        BlockId::from(s)
    }

    fn tree() -> BlockTree {
        BlockTree::new(vec![
            BlockNode::new("a", BlockKind::Section).with_children(vec![
                BlockNode::new("b", BlockKind::Section)
                    .with_children(vec![BlockNode::new("img", BlockKind::Image)]),
            ]),
            BlockNode::new("x", BlockKind::Columns).with_children(vec![
                BlockNode::new("y1", BlockKind::Column),
                BlockNode::new("y2", BlockKind::Column),
            ]),
            BlockNode::new("z", BlockKind::Columns)
                .with_children(vec![BlockNode::new("z1", BlockKind::Column)]),
            BlockNode::new("text", BlockKind::Text),
            BlockNode::new("locked", BlockKind::Section).locked(),
        ])
    }

    fn check(tree: &BlockTree, dragged: &str, target: &str, position: DropPosition) -> Result<(), DropRejection> {
        let dragged = tree.find(&id(dragged)).unwrap();
        let target = tree.find(&id(target)).unwrap();
        check_drop(tree, dragged, target, position)
    }

    #[test]
    fn test_container_thresholds() {
        let rect = Rect::new(0.0, 100.0, 300.0, 200.0);
        assert_eq!(resolve_position(100.0 + 20.0, rect, true), DropPosition::Before);
        assert_eq!(resolve_position(100.0 + 100.0, rect, true), DropPosition::Inside);
        assert_eq!(resolve_position(100.0 + 190.0, rect, true), DropPosition::After);
    }

    #[test]
    fn test_leaf_thresholds() {
        let rect = Rect::new(0.0, 0.0, 300.0, 50.0);
        assert_eq!(resolve_position(20.0, rect, false), DropPosition::Before);
        assert_eq!(resolve_position(30.0, rect, false), DropPosition::After);
    }

    #[test]
    fn test_zero_height_target_does_not_divide_by_zero() {
        let rect = Rect::new(0.0, 10.0, 100.0, 0.0);
        assert_eq!(resolve_position(10.0, rect, true), DropPosition::Inside);
    }

    #[test]
    fn test_rejects_self_drop() {
        assert_eq!(check(&tree(), "text", "text", DropPosition::After), Err(DropRejection::SelfDrop));
    }

    #[test]
    fn test_rejects_inside_leaf() {
        assert_eq!(
            check(&tree(), "img", "text", DropPosition::Inside),
            Err(DropRejection::NotAContainer(id("text")))
        );
    }

    #[test]
    fn test_rejects_drop_into_own_descendant() {
        let tree = tree();
        assert_eq!(check(&tree, "a", "b", DropPosition::Inside), Err(DropRejection::CycleDetected));
        assert_eq!(check(&tree, "a", "img", DropPosition::After), Err(DropRejection::CycleDetected));
        assert_eq!(check(&tree, "x", "y1", DropPosition::Inside), Err(DropRejection::CycleDetected));
    }

    #[test]
    fn test_column_reorder_within_parent_only() {
        let tree = tree();
        assert!(check(&tree, "y1", "y2", DropPosition::After).is_ok());
        assert_eq!(
            check(&tree, "y1", "z1", DropPosition::Before),
            Err(DropRejection::ColumnOutsideParent)
        );
    }

    #[test]
    fn test_columns_accept_only_column_inside() {
        let tree = tree();
        assert!(check(&tree, "y1", "z", DropPosition::Inside).is_ok());
        assert_eq!(
            check(&tree, "text", "z", DropPosition::Inside),
            Err(DropRejection::ColumnsOnlyAcceptColumn)
        );
    }

    #[test]
    fn test_leaf_cannot_land_between_columns() {
        let tree = tree();
        assert!(matches!(
            check(&tree, "text", "y1", DropPosition::After),
            Err(DropRejection::IncompatibleParent { .. })
        ));
        assert!(matches!(
            check(&tree, "y1", "b", DropPosition::Inside),
            Err(DropRejection::IncompatibleParent { .. })
        ));
    }

    #[test]
    fn test_locked_container_rejects_inside() {
        assert_eq!(
            check(&tree(), "text", "locked", DropPosition::Inside),
            Err(DropRejection::TargetLocked(id("locked")))
        );
        assert!(check(&tree(), "text", "locked", DropPosition::Before).is_ok());

        let tree = BlockTree::new(vec![BlockNode::new("frozen", BlockKind::Section)
            .locked()
            .with_children(vec![BlockNode::new("inner", BlockKind::Text)])]);
        let outside = BlockTree::new(vec![BlockNode::new("loose", BlockKind::Image)]);
        let loose = outside.find(&id("loose")).unwrap();
        assert_eq!(
            check_drop(&tree, loose, tree.find(&id("inner")).unwrap(), DropPosition::After),
            Err(DropRejection::TargetLocked(id("frozen")))
        );
    }

    #[test]
    fn test_valid_moves() {
        let tree = tree();
        assert!(can_drop(&tree, tree.find(&id("text")).unwrap(), tree.find(&id("b")).unwrap(), DropPosition::Inside));
        assert!(can_drop(&tree, tree.find(&id("b")).unwrap(), tree.find(&id("text")).unwrap(), DropPosition::Before));
    }
}
