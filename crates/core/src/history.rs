//! Bounded snapshot history with linear undo/redo semantics.
//!
//! Snapshots are full deep copies of the document. Copies are taken both
//! on record and on undo/redo: the stack must be immune to later
//! mutation of the live document, and a document handed back by
//! `undo`/`redo` must be immune to later mutation of the stored
//! snapshot. Redo history is discarded as soon as a new edit diverges
//! from it.

use crate::document::Document;

/// Default maximum number of snapshots kept per session.
pub const DEFAULT_HISTORY_CAP: usize = 50;

/// Snapshot stack plus a cursor into it.
///
/// Invariant: `0 <= index < stack.len()` whenever the stack is
/// non-empty. When the cap is exceeded the oldest snapshot is evicted
/// and the cursor shifts down by one, preserving relative position.
#[derive(Debug, Clone)]
pub struct History {
    stack: Vec<Document>,
    index: usize,
    cap: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAP)
    }
}

impl History {
    /// Create an empty history bounded to `cap` snapshots (minimum 1).
    pub fn new(cap: usize) -> Self {
        Self {
            stack: Vec::new(),
            index: 0,
            cap: cap.max(1),
        }
    }

    /// Record a new snapshot after a mutation.
    ///
    /// Truncates any snapshots past the cursor (the divergence rule),
    /// appends a deep copy of `document`, and evicts the oldest entry if
    /// the cap is exceeded.
    pub fn record(&mut self, document: &Document) {
        if !self.stack.is_empty() {
            self.stack.truncate(self.index + 1);
        }
        self.stack.push(document.clone());
        if self.stack.len() > self.cap {
            self.stack.remove(0);
        }
        self.index = self.stack.len() - 1;
    }

    /// Step back one snapshot, returning a deep copy of it. `None` when
    /// already at the oldest recoverable state.
    pub fn undo(&mut self) -> Option<Document> {
        if !self.can_undo() {
            return None;
        }
        self.index -= 1;
        Some(self.stack[self.index].clone())
    }

    /// Step forward one snapshot, returning a deep copy of it. `None`
    /// when there is nothing to redo.
    pub fn redo(&mut self) -> Option<Document> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        Some(self.stack[self.index].clone())
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        !self.stack.is_empty() && self.index + 1 < self.stack.len()
    }

    /// Number of snapshots currently held.
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Current cursor position. Meaningful only when non-empty.
    pub fn index(&self) -> usize {
        self.index
    }
}
