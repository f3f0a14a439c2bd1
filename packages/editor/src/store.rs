//! # Editor Store
//!
//! Owns the live page tree and is its only writer. Every structural edit
//! funnels through [`EditorStore::dispatch`], which applies a [`Mutation`]
//! to a copy of the tree, records the result in history, then swaps the
//! new tree in. Nothing becomes visible unless its history entry exists.
//!
//! The tree is published on a `watch` channel so an in-process preview can
//! render straight from the store without serialization.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, info};

use storefront_blocks::{BlockId, BlockKind, BlockNode, BlockTree, IdGenerator, PageDocument, Settings};

use crate::clipboard::{Clipboard, ClipboardBlock};
use crate::config::EditorConfig;
use crate::drop_resolver::{check_drop, DropPosition};
use crate::history::{History, HistoryItem};
use crate::mutations::{Mutation, MutationError, MutationKind};
use crate::selection::Selection;
use crate::EditorError;

/// Summary of a committed mutation
#[derive(Debug, Clone, PartialEq)]
pub struct Commit {
    pub kind: MutationKind,
    pub description: String,
    pub affected: Vec<BlockId>,
    pub revision: u64,
}

pub struct EditorStore {
    page_id: String,
    tree: Arc<BlockTree>,
    ids: IdGenerator,
    selection: Selection,
    history: History,

    /// Bumped whenever the live tree is replaced
    revision: u64,
    saved_revision: u64,

    tree_tx: watch::Sender<Arc<BlockTree>>,
    selection_tx: watch::Sender<Vec<BlockId>>,
}

impl EditorStore {
    pub fn new(page_id: impl Into<String>, tree: BlockTree, config: &EditorConfig) -> Self {
        let page_id = page_id.into();
        let ids = IdGenerator::for_tree(&page_id, &tree);
        let tree = Arc::new(tree);
        let (tree_tx, _) = watch::channel(tree.clone());
        let (selection_tx, _) = watch::channel(Vec::new());

        Self {
            page_id,
            history: History::new(tree.clone(), config.history_limit),
            tree,
            ids,
            selection: Selection::new(),
            revision: 0,
            saved_revision: 0,
            tree_tx,
            selection_tx,
        }
    }

    pub fn from_document(document: &PageDocument, config: &EditorConfig) -> Self {
        Self::new(document.id.clone(), document.blocks.clone(), config)
    }

    pub fn page_id(&self) -> &str {
        &self.page_id
    }

    pub fn tree(&self) -> &Arc<BlockTree> {
        &self.tree
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn history_items(&self) -> Vec<HistoryItem> {
        self.history.items()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Any change since the last save
    pub fn is_dirty(&self) -> bool {
        self.revision != self.saved_revision
    }

    pub fn mark_saved(&mut self) {
        self.saved_revision = self.revision;
    }

    /// Copy `template`'s metadata with the live tree as its blocks.
    pub fn to_document(&self, template: &PageDocument) -> PageDocument {
        PageDocument {
            blocks: (*self.tree).clone(),
            updated_at: Utc::now(),
            ..template.clone()
        }
    }

    /// Live tree updates, starting with the current tree
    pub fn subscribe(&self) -> watch::Receiver<Arc<BlockTree>> {
        self.tree_tx.subscribe()
    }

    pub fn subscribe_selection(&self) -> watch::Receiver<Vec<BlockId>> {
        self.selection_tx.subscribe()
    }

    /// Apply `mutation` to the live tree and record it.
    pub fn dispatch(&mut self, mutation: Mutation) -> Result<Commit, MutationError> {
        let applied = mutation.apply(&self.tree, &mut self.ids)?;
        if applied.tree == *self.tree {
            debug!(kind = ?applied.kind, "mutation left the tree unchanged");
            return Ok(Commit {
                kind: applied.kind,
                description: applied.description,
                affected: Vec::new(),
                revision: self.revision,
            });
        }
        let tree = Arc::new(applied.tree);

        self.history.record(
            applied.kind,
            applied.description.clone(),
            applied.affected.clone(),
            tree.clone(),
        );
        self.replace_tree(tree);

        match applied.kind {
            MutationKind::Insert
            | MutationKind::Duplicate
            | MutationKind::Group
            | MutationKind::Ungroup => self.selection.set(applied.affected.clone()),
            _ => self.selection.retain_existing(&self.tree),
        }
        self.publish_selection();

        info!(
            revision = self.revision,
            kind = ?applied.kind,
            "{}", applied.description
        );

        Ok(Commit {
            kind: applied.kind,
            description: applied.description,
            affected: applied.affected,
            revision: self.revision,
        })
    }

    /// Dispatch, treating a rejection as a no-op.
    pub fn try_dispatch(&mut self, mutation: Mutation) -> bool {
        match self.dispatch(mutation) {
            Ok(_) => true,
            Err(error) => {
                debug!(%error, "mutation rejected");
                false
            }
        }
    }

    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(tree) => {
                self.restore(tree);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(tree) => {
                self.restore(tree);
                true
            }
            None => false,
        }
    }

    /// Restore the tree as it was right after history entry `index`.
    pub fn jump_to(&mut self, index: usize) -> bool {
        match self.history.jump_to(index) {
            Some(tree) => {
                self.restore(tree);
                true
            }
            None => false,
        }
    }

    pub fn can_drop(&self, dragged: &BlockId, target: &BlockId, position: DropPosition) -> bool {
        match (self.tree.find(dragged), self.tree.find(target)) {
            (Some(dragged), Some(target)) => check_drop(&self.tree, dragged, target, position).is_ok(),
            _ => false,
        }
    }

    //
    // Structural operations
    //

    pub fn reorder(
        &mut self,
        parent_id: Option<BlockId>,
        from_index: usize,
        to_index: usize,
    ) -> Result<Commit, MutationError> {
        self.dispatch(Mutation::Reorder { parent_id, from_index, to_index })
    }

    pub fn move_nodes(
        &mut self,
        node_ids: Vec<BlockId>,
        target_id: BlockId,
        position: DropPosition,
    ) -> Result<Commit, MutationError> {
        self.dispatch(Mutation::Move { node_ids, target_id, position })
    }

    pub fn reparent(
        &mut self,
        node_id: BlockId,
        container_id: BlockId,
        insert_index: Option<usize>,
    ) -> Result<Commit, MutationError> {
        self.dispatch(Mutation::Reparent { node_id, container_id, insert_index })
    }

    /// Insert an empty block of `kind`; `None` index appends.
    pub fn insert(
        &mut self,
        parent_id: Option<BlockId>,
        index: Option<usize>,
        kind: BlockKind,
    ) -> Result<Commit, MutationError> {
        let node = BlockNode::new(BlockId::from(String::new()), kind);
        self.dispatch(Mutation::Insert { parent_id, index, node })
    }

    pub fn add_below(&mut self, target_id: BlockId, kind: BlockKind) -> Result<Commit, MutationError> {
        self.dispatch(Mutation::AddBelow { target_id, kind })
    }

    pub fn duplicate(&mut self, node_ids: Vec<BlockId>) -> Result<Commit, MutationError> {
        self.dispatch(Mutation::Duplicate { node_ids })
    }

    pub fn delete(&mut self, node_ids: Vec<BlockId>) -> Result<Commit, MutationError> {
        self.dispatch(Mutation::Delete { node_ids })
    }

    pub fn group(&mut self, node_ids: Vec<BlockId>) -> Result<Commit, MutationError> {
        self.dispatch(Mutation::Group { node_ids })
    }

    pub fn ungroup(&mut self, group_id: BlockId) -> Result<Commit, MutationError> {
        self.dispatch(Mutation::Ungroup { group_id })
    }

    pub fn move_up(&mut self, node_id: BlockId) -> Result<Commit, MutationError> {
        self.dispatch(Mutation::MoveUp { node_id })
    }

    pub fn move_down(&mut self, node_id: BlockId) -> Result<Commit, MutationError> {
        self.dispatch(Mutation::MoveDown { node_id })
    }

    /// Entry point for the settings panel. Never changes tree shape.
    pub fn update_settings(&mut self, node_id: BlockId, patch: Settings) -> Result<Commit, MutationError> {
        self.dispatch(Mutation::UpdateSettings { node_id, patch })
    }

    pub fn set_visible(&mut self, node_id: BlockId, visible: bool) -> Result<Commit, MutationError> {
        self.dispatch(Mutation::SetVisible { node_id, visible })
    }

    pub fn set_locked(&mut self, node_id: BlockId, locked: bool) -> Result<Commit, MutationError> {
        self.dispatch(Mutation::SetLocked { node_id, locked })
    }

    pub fn duplicate_selection(&mut self) -> Result<Commit, MutationError> {
        self.duplicate(self.selection.ids().to_vec())
    }

    pub fn delete_selection(&mut self) -> Result<Commit, MutationError> {
        self.delete(self.selection.ids().to_vec())
    }

    pub fn group_selection(&mut self) -> Result<Commit, MutationError> {
        self.group(self.selection.ids().to_vec())
    }

    //
    // Selection
    //

    /// Select exactly `id`. Unknown ids are ignored.
    pub fn select(&mut self, id: &BlockId) -> bool {
        self.update_selection(id, |selection, id| selection.replace(id))
    }

    pub fn select_add(&mut self, id: &BlockId) -> bool {
        self.update_selection(id, |selection, id| selection.add(id))
    }

    pub fn select_toggle(&mut self, id: &BlockId) -> bool {
        self.update_selection(id, |selection, id| selection.toggle(id))
    }

    pub fn select_range(&mut self, anchor: &BlockId, target: &BlockId) -> bool {
        let changed = self.selection.range(&self.tree, anchor, target);
        if changed {
            self.publish_selection();
        }
        changed
    }

    /// Range from the current anchor (shift-click)
    pub fn select_extend(&mut self, target: &BlockId) -> bool {
        let changed = self.selection.extend_to(&self.tree, target);
        if changed {
            self.publish_selection();
        }
        changed
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.publish_selection();
    }

    //
    // Clipboard
    //

    /// Copy the first selected block.
    pub fn copy_selection(&self, clipboard: &mut Clipboard) -> Result<bool, EditorError> {
        let Some(node) = self.selection.ids().first().and_then(|id| self.tree.find(id)) else {
            return Ok(false);
        };
        clipboard.copy(node)?;
        Ok(true)
    }

    /// Paste from `clipboard`; `None` if it holds nothing usable.
    pub fn paste(&mut self, clipboard: &mut Clipboard) -> Result<Option<Commit>, MutationError> {
        match clipboard.paste() {
            Some(block) => self.paste_block(&block).map(Some),
            None => Ok(None),
        }
    }

    /// Insert `block` after the first selected node, or at the end of the
    /// page when nothing is selected.
    pub fn paste_block(&mut self, block: &ClipboardBlock) -> Result<Commit, MutationError> {
        let location = self
            .selection
            .ids()
            .first()
            .and_then(|id| self.tree.locate(id));

        let (parent_id, index) = match location {
            Some(location) => (location.parent, Some(location.index + 1)),
            None => (None, None),
        };

        self.dispatch(Mutation::Insert {
            parent_id,
            index,
            node: block.to_node(),
        })
    }

    fn update_selection(&mut self, id: &BlockId, update: impl FnOnce(&mut Selection, BlockId)) -> bool {
        if !self.tree.contains(id) {
            return false;
        }
        update(&mut self.selection, id.clone());
        self.publish_selection();
        true
    }

    fn restore(&mut self, tree: Arc<BlockTree>) {
        self.replace_tree(tree);
        self.selection.retain_existing(&self.tree);
        self.publish_selection();
        debug!(revision = self.revision, cursor = ?self.history.cursor(), "restored from history");
    }

    fn replace_tree(&mut self, tree: Arc<BlockTree>) {
        self.tree = tree;
        self.revision += 1;
        self.tree_tx.send_replace(self.tree.clone());
    }

    fn publish_selection(&self) {
        self.selection_tx.send_if_modified(|ids| {
            if ids.as_slice() == self.selection.ids() {
                false
            } else {
                *ids = self.selection.ids().to_vec();
                true
            }
        });
    }
}
