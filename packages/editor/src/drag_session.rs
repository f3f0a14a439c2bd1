//! # Drag Sessions
//!
//! ```text
//!  idle ──begin──▶ dragging ──hover/move──▶ dragging
//!                     │
//!                     ├──end (valid target)──▶ commit ──▶ idle
//!                     └──end (no/invalid target) / cancel──▶ idle
//! ```
//!
//! A session pins the tree as it was when the gesture started, so hover
//! feedback is computed against a stable snapshot even if something else
//! edits the store mid-drag. Hover validity runs the same checks as the
//! commit, and the drop is re-validated against the live tree when it
//! commits.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, trace};

use storefront_blocks::{BlockId, BlockTree};

use crate::auto_scroll::AutoScroller;
use crate::drop_resolver::{resolve_position, DropPosition};
use crate::geometry::{GeometryProvider, Point, Rect};
use crate::mutations::{Mutation, MutationError};
use crate::store::{Commit, EditorStore};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DragError {
    #[error("A drag is already in progress")]
    AlreadyDragging,

    #[error("Block not found: {0}")]
    NodeNotFound(BlockId),

    #[error("Block {0} is locked")]
    Locked(BlockId),
}

/// Where the dragged blocks would land if released now
#[derive(Debug, Clone, PartialEq)]
pub struct DropCandidate {
    pub target: BlockId,
    pub position: DropPosition,

    /// Whether the drop indicator should be shown
    pub valid: bool,
}

#[derive(Debug, Clone)]
pub struct DragSession {
    pub dragged: Vec<BlockId>,
    pub snapshot: Arc<BlockTree>,
    pub candidate: Option<DropCandidate>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CancelReason {
    NoTarget,
    SelfDrop,
    /// Released over a target the indicator marked invalid
    InvalidTarget,
    Rejected(MutationError),
    Aborted,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DragOutcome {
    Committed(Commit),
    Cancelled(CancelReason),
}

#[derive(Default)]
pub struct DragController {
    session: Option<DragSession>,
    scroller: Option<AutoScroller>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_auto_scroll(mut self, scroller: AutoScroller) -> Self {
        self.scroller = Some(scroller);
        self
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    /// Start dragging `id`, carrying the whole selection if `id` is part of
    /// a multi-selection.
    pub fn begin(&mut self, store: &EditorStore, id: &BlockId) -> Result<&[BlockId], DragError> {
        if self.session.is_some() {
            return Err(DragError::AlreadyDragging);
        }

        let snapshot = store.tree().clone();
        if !snapshot.contains(id) {
            return Err(DragError::NodeNotFound(id.clone()));
        }

        // Neither a locked block nor a child of one may leave its place
        let dragged = store.selection().drag_set(&snapshot, id);
        let locked = dragged.iter().find_map(|dragged_id| {
            let node = snapshot.find(dragged_id)?;
            if node.locked {
                return Some(node.id.clone());
            }
            snapshot.parent(dragged_id).filter(|parent| parent.locked).map(|parent| parent.id.clone())
        });
        if let Some(locked) = locked {
            return Err(DragError::Locked(locked));
        }
        debug!(count = dragged.len(), "drag started");

        let session = self.session.insert(DragSession {
            dragged,
            snapshot,
            candidate: None,
        });
        Ok(&session.dragged)
    }

    /// Pointer is over `target`. Recomputes the drop position from the
    /// target's bounds; `None` if not dragging or the target has no bounds.
    pub fn hover(
        &mut self,
        target: &BlockId,
        pointer: Point,
        geometry: &dyn GeometryProvider,
    ) -> Option<&DropCandidate> {
        let session = self.session.as_mut()?;
        let bounds = geometry.bounds(target);
        let node = session.snapshot.find(target);

        let (Some(bounds), Some(node)) = (bounds, node) else {
            session.candidate = None;
            return None;
        };

        let position = resolve_position(pointer.y, bounds, node.is_container());
        let valid = Mutation::Move {
            node_ids: session.dragged.clone(),
            target_id: target.clone(),
            position,
        }
        .validate(&session.snapshot)
        .is_ok();

        trace!(target = %target, ?position, valid, "drag over");
        session.candidate = Some(DropCandidate {
            target: target.clone(),
            position,
            valid,
        });
        session.candidate.as_ref()
    }

    /// Pointer left every drop target.
    pub fn leave(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.candidate = None;
        }
    }

    /// Feed the pointer to auto-scroll. Returns the scroll velocity.
    pub fn pointer_moved(&mut self, pointer: Point, viewport: Rect) -> f32 {
        if self.session.is_none() {
            return 0.0;
        }
        self.scroller
            .as_mut()
            .map_or(0.0, |scroller| scroller.update(pointer, viewport))
    }

    /// One auto-scroll frame, for hosts that drive frames themselves.
    pub fn scroll_tick(&self) -> bool {
        self.session.is_some() && self.scroller.as_ref().is_some_and(AutoScroller::tick)
    }

    /// Release: commit to the last valid candidate or discard the session.
    pub fn end(&mut self, store: &mut EditorStore) -> DragOutcome {
        self.stop_scroll();

        let Some(session) = self.session.take() else {
            return DragOutcome::Cancelled(CancelReason::NoTarget);
        };

        let Some(candidate) = session.candidate else {
            debug!("drag ended without a target");
            return DragOutcome::Cancelled(CancelReason::NoTarget);
        };

        if session.dragged.contains(&candidate.target) {
            return DragOutcome::Cancelled(CancelReason::SelfDrop);
        }

        if !candidate.valid {
            debug!(target = %candidate.target, "drag ended over an invalid target");
            return DragOutcome::Cancelled(CancelReason::InvalidTarget);
        }

        // Re-validated against the live tree, which may have moved on
        // since the gesture started.
        match store.dispatch(Mutation::Move {
            node_ids: session.dragged,
            target_id: candidate.target,
            position: candidate.position,
        }) {
            Ok(commit) => DragOutcome::Committed(commit),
            Err(error) => {
                debug!(%error, "drop rejected");
                DragOutcome::Cancelled(CancelReason::Rejected(error))
            }
        }
    }

    /// Abort (e.g. Escape). No mutation happens.
    pub fn cancel(&mut self) -> DragOutcome {
        self.stop_scroll();
        if self.session.take().is_some() {
            debug!("drag cancelled");
        }
        DragOutcome::Cancelled(CancelReason::Aborted)
    }

    fn stop_scroll(&mut self) {
        if let Some(scroller) = self.scroller.as_mut() {
            scroller.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use storefront_blocks::{BlockKind, BlockNode};

    use crate::config::EditorConfig;

    fn id(s: &str) -> BlockId {
        BlockId::from(s)
    }

    fn store() -> EditorStore {
        let tree = BlockTree::new(vec![
            BlockNode::new("hero", BlockKind::Hero),
            BlockNode::new("section", BlockKind::Section)
                .with_children(vec![BlockNode::new("inner", BlockKind::Text)]),
            BlockNode::new("text", BlockKind::Text),
        ]);
        EditorStore::new("home", tree, &EditorConfig::default())
    }

    fn geometry() -> HashMap<BlockId, Rect> {
        HashMap::from([
            (id("hero"), Rect::new(0.0, 0.0, 400.0, 100.0)),
            (id("section"), Rect::new(0.0, 100.0, 400.0, 200.0)),
            (id("inner"), Rect::new(0.0, 150.0, 400.0, 50.0)),
            (id("text"), Rect::new(0.0, 300.0, 400.0, 40.0)),
        ])
    }

    fn ids(store: &EditorStore) -> Vec<String> {
        store.tree().blocks().iter().map(|n| n.id.to_string()).collect()
    }

    #[test]
    fn test_drag_into_container_commits() {
        let mut store = store();
        let mut drag = DragController::new();

        drag.begin(&store, &id("hero")).unwrap();
        let candidate = drag.hover(&id("section"), Point::new(10.0, 200.0), &geometry()).unwrap();
        assert_eq!(candidate.position, DropPosition::Inside);
        assert!(candidate.valid);

        let outcome = drag.end(&mut store);
        assert!(matches!(outcome, DragOutcome::Committed(_)));
        assert!(!drag.is_dragging());

        let section = store.tree().find(&id("section")).unwrap();
        assert_eq!(section.children().last().unwrap().id, id("hero"));
    }

    #[test]
    fn test_drop_into_own_child_is_invalid() {
        let mut store = store();
        let mut drag = DragController::new();

        drag.begin(&store, &id("section")).unwrap();
        let candidate = drag.hover(&id("inner"), Point::new(10.0, 160.0), &geometry()).unwrap();
        assert!(!candidate.valid);

        let before = store.tree().clone();
        assert_eq!(drag.end(&mut store), DragOutcome::Cancelled(CancelReason::InvalidTarget));
        assert_eq!(*store.tree(), before);
    }

    #[test]
    fn test_end_without_target_cancels() {
        let mut store = store();
        let mut drag = DragController::new();

        drag.begin(&store, &id("text")).unwrap();
        drag.hover(&id("hero"), Point::new(0.0, 10.0), &geometry());
        drag.leave();

        assert_eq!(drag.end(&mut store), DragOutcome::Cancelled(CancelReason::NoTarget));
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn test_cancel_discards_session() {
        let mut store = store();
        let mut drag = DragController::new();

        drag.begin(&store, &id("text")).unwrap();
        drag.hover(&id("hero"), Point::new(0.0, 10.0), &geometry());
        assert_eq!(drag.cancel(), DragOutcome::Cancelled(CancelReason::Aborted));
        assert!(!drag.is_dragging());
        assert_eq!(drag.end(&mut store), DragOutcome::Cancelled(CancelReason::NoTarget));
        assert_eq!(ids(&store), vec!["hero", "section", "text"]);
    }

    #[test]
    fn test_multi_selection_drags_together() {
        let mut store = store();
        store.select(&id("text"));
        store.select_add(&id("hero"));

        let mut drag = DragController::new();
        let dragged = drag.begin(&store, &id("text")).unwrap().to_vec();
        assert_eq!(dragged, vec![id("hero"), id("text")]);

        drag.hover(&id("section"), Point::new(0.0, 290.0), &geometry());
        let outcome = drag.end(&mut store);
        assert!(matches!(outcome, DragOutcome::Committed(_)));
        assert_eq!(ids(&store), vec!["section", "hero", "text"]);
    }

    #[test]
    fn test_snapshot_survives_background_edit() {
        let mut store = store();
        let mut drag = DragController::new();
        drag.begin(&store, &id("text")).unwrap();

        // Someone deletes the hover target mid-gesture
        store.delete(vec![id("hero")]).unwrap();

        let candidate = drag.hover(&id("hero"), Point::new(0.0, 10.0), &geometry()).unwrap();
        assert!(candidate.valid);

        let outcome = drag.end(&mut store);
        assert!(matches!(
            outcome,
            DragOutcome::Cancelled(CancelReason::Rejected(MutationError::NodeNotFound(_)))
        ));
    }

    #[test]
    fn test_locked_block_cannot_start_drag() {
        let mut store = store();
        store.set_locked(id("hero"), true).unwrap();

        let mut drag = DragController::new();
        assert_eq!(drag.begin(&store, &id("hero")).unwrap_err(), DragError::Locked(id("hero")));
        assert!(matches!(drag.begin(&store, &id("ghost")), Err(DragError::NodeNotFound(_))));
    }

    #[test]
    fn test_child_of_locked_block_cannot_start_drag() {
        let mut store = store();
        store.set_locked(id("section"), true).unwrap();

        let mut drag = DragController::new();
        assert_eq!(drag.begin(&store, &id("inner")).unwrap_err(), DragError::Locked(id("section")));
        assert!(!drag.is_dragging());
    }

    #[test]
    fn test_selection_with_locked_block_cannot_start_drag() {
        let mut store = store();
        store.set_locked(id("hero"), true).unwrap();
        store.select(&id("text"));
        store.select_add(&id("hero"));

        let mut drag = DragController::new();
        assert_eq!(drag.begin(&store, &id("text")).unwrap_err(), DragError::Locked(id("hero")));
    }

    #[test]
    fn test_hover_validity_matches_commit() {
        let mut store = store();
        store.set_locked(id("section"), true).unwrap();
        let mut drag = DragController::new();
        drag.begin(&store, &id("text")).unwrap();

        // Locked containers refuse new children
        let inside = drag.hover(&id("section"), Point::new(10.0, 200.0), &geometry()).unwrap().clone();
        assert_eq!(inside.position, DropPosition::Inside);
        assert!(!inside.valid);
        let inside_commit = Mutation::Move {
            node_ids: vec![id("text")],
            target_id: id("section"),
            position: DropPosition::Inside,
        }
        .validate(store.tree());
        assert!(inside_commit.is_err());

        let above = drag.hover(&id("hero"), Point::new(10.0, 5.0), &geometry()).unwrap().clone();
        assert_eq!(above.position, DropPosition::Before);
        assert!(above.valid);
        assert!(matches!(drag.end(&mut store), DragOutcome::Committed(_)));
        assert_eq!(ids(&store), vec!["text", "hero", "section"]);
    }

    #[test]
    fn test_end_over_invalid_candidate_cancels() {
        let mut store = store();
        store.set_locked(id("section"), true).unwrap();
        let mut drag = DragController::new();
        drag.begin(&store, &id("text")).unwrap();

        let candidate = drag.hover(&id("section"), Point::new(10.0, 200.0), &geometry()).unwrap();
        assert!(!candidate.valid);

        // Unlocking mid-gesture does not turn a rejected drop into a commit
        store.set_locked(id("section"), false).unwrap();
        let before = store.tree().clone();
        assert_eq!(drag.end(&mut store), DragOutcome::Cancelled(CancelReason::InvalidTarget));
        assert_eq!(*store.tree(), before);
        assert_eq!(store.tree().find(&id("section")).unwrap().children().len(), 1);
    }

    #[derive(Default)]
    struct Scrolled(std::sync::Mutex<f32>);

    impl crate::auto_scroll::ScrollTarget for Scrolled {
        fn scroll_by(&self, dy: f32) {
            *self.0.lock().unwrap() += dy;
        }
    }

    #[test]
    fn test_manual_scroll_ticks_only_while_dragging() {
        let store = store();
        let target = Arc::new(Scrolled::default());
        let scroller = AutoScroller::new(EditorConfig::default().auto_scroll, target.clone());
        let mut drag = DragController::new().with_auto_scroll(scroller);
        let viewport = Rect::new(0.0, 0.0, 400.0, 600.0);

        // not dragging yet
        assert_eq!(drag.pointer_moved(Point::new(0.0, 590.0), viewport), 0.0);
        assert!(!drag.scroll_tick());

        drag.begin(&store, &id("hero")).unwrap();
        assert_eq!(drag.pointer_moved(Point::new(0.0, 590.0), viewport), 8.0);
        assert!(drag.scroll_tick());
        assert_eq!(*target.0.lock().unwrap(), 8.0);

        drag.cancel();
        assert!(!drag.scroll_tick());
    }

    #[test]
    fn test_second_begin_is_rejected() {
        let store = store();
        let mut drag = DragController::new();
        drag.begin(&store, &id("hero")).unwrap();
        assert_eq!(drag.begin(&store, &id("text")).unwrap_err(), DragError::AlreadyDragging);
    }
}
