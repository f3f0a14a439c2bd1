//! # History
//!
//! Linear undo log with arbitrary jumps.
//!
//! ## Design
//!
//! - Every committed mutation appends an entry holding the tree as it was
//!   right after the commit
//! - The cursor names the entry the live tree corresponds to; `None` means
//!   the baseline (the tree before the oldest retained entry)
//! - Recording while the cursor is behind the end truncates every later
//!   entry first; redo branches are not kept
//! - When the cap is exceeded the oldest entry is dropped and its snapshot
//!   becomes the new baseline, so every retained index stays reconstructable
//!
//! Snapshots are `Arc`-shared with the store, so an entry costs one
//! refcount unless the tree is later replaced.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use storefront_blocks::{BlockId, BlockTree};

use crate::MutationKind;

/// One committed mutation
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    /// Monotonic, never reused within a session
    pub id: u64,

    pub kind: MutationKind,

    pub description: String,

    pub timestamp: DateTime<Utc>,

    pub affected: Vec<BlockId>,

    /// Tree right after this entry committed
    pub snapshot: Arc<BlockTree>,
}

/// What the history panel shows for an entry
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    pub index: usize,
    pub kind: MutationKind,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    pub current: bool,
}

#[derive(Debug)]
pub struct History {
    baseline: Arc<BlockTree>,

    entries: Vec<HistoryEntry>,

    cursor: Option<usize>,

    /// Maximum number of retained entries (0 = unlimited)
    limit: usize,

    next_id: u64,
}

impl History {
    pub fn new(baseline: Arc<BlockTree>, limit: usize) -> Self {
        Self {
            baseline,
            entries: Vec::new(),
            cursor: None,
            limit,
            next_id: 1,
        }
    }

    /// Append an entry after the cursor, discarding any redo tail.
    pub fn record(
        &mut self,
        kind: MutationKind,
        description: String,
        affected: Vec<BlockId>,
        snapshot: Arc<BlockTree>,
    ) -> &HistoryEntry {
        let keep = self.cursor.map_or(0, |cursor| cursor + 1);
        self.entries.truncate(keep);

        self.entries.push(HistoryEntry {
            id: self.next_id,
            kind,
            description,
            timestamp: Utc::now(),
            affected,
            snapshot,
        });
        self.next_id += 1;

        if self.limit > 0 && self.entries.len() > self.limit {
            let evicted = self.entries.remove(0);
            self.baseline = evicted.snapshot;
        }

        let last = self.entries.len() - 1;
        self.cursor = Some(last);
        &self.entries[last]
    }

    /// Step back one entry. Returns the tree to restore.
    pub fn undo(&mut self) -> Option<Arc<BlockTree>> {
        let cursor = self.cursor?;
        self.cursor = cursor.checked_sub(1);
        Some(self.current())
    }

    /// Step forward one entry. Returns the tree to restore.
    pub fn redo(&mut self) -> Option<Arc<BlockTree>> {
        let next = self.cursor.map_or(0, |cursor| cursor + 1);
        if next >= self.entries.len() {
            return None;
        }
        self.cursor = Some(next);
        Some(self.current())
    }

    /// Move the cursor to `index`, returning the tree as it was right after
    /// that entry committed.
    pub fn jump_to(&mut self, index: usize) -> Option<Arc<BlockTree>> {
        if index >= self.entries.len() {
            return None;
        }
        self.cursor = Some(index);
        Some(self.current())
    }

    /// Move before the oldest retained entry.
    pub fn jump_to_baseline(&mut self) -> Arc<BlockTree> {
        self.cursor = None;
        self.baseline.clone()
    }

    /// Tree the cursor currently points at
    pub fn current(&self) -> Arc<BlockTree> {
        match self.cursor {
            Some(index) => self.entries[index].snapshot.clone(),
            None => self.baseline.clone(),
        }
    }

    pub fn can_undo(&self) -> bool {
        self.cursor.is_some()
    }

    pub fn can_redo(&self) -> bool {
        self.cursor.map_or(0, |cursor| cursor + 1) < self.entries.len()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn items(&self) -> Vec<HistoryItem> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, entry)| HistoryItem {
                index,
                kind: entry.kind,
                description: entry.description.clone(),
                timestamp: entry.timestamp,
                current: self.cursor == Some(index),
            })
            .collect()
    }

    /// Drop every entry and start over from `baseline`.
    pub fn reset(&mut self, baseline: Arc<BlockTree>) {
        self.baseline = baseline;
        self.entries.clear();
        self.cursor = None;
    }
}
