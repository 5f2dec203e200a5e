//! The editing session: one document, one history, one writer.
//!
//! Each session is an explicit object handed to whoever drives the
//! editor; there is no ambient singleton. All mutations are applied
//! synchronously in the order received, and every successful mutation
//! is immediately recorded into history. Undo would be unsound
//! otherwise, so the document is private and only reachable through
//! the recording methods here.

use masthead_core::block::{BlockData, BlockId, BlockKind, BlockPatch};
use masthead_core::document::Document;
use masthead_core::error::CoreResult;
use masthead_core::history::History;
use masthead_core::types::ArticleId;

/// How many recently used block kinds the session remembers (for the
/// host's quick-insert palette).
const RECENT_KINDS_CAP: usize = 5;

/// Interactive editing session over one article's block document.
pub struct EditorSession {
    article_id: ArticleId,
    document: Document,
    history: History,
    selected: Option<BlockId>,
    recent_kinds: Vec<BlockKind>,
}

impl EditorSession {
    /// Open a session on the given document. The opening state is
    /// recorded as the first history snapshot, so a full run of undos
    /// lands back on it.
    pub fn new(article_id: ArticleId, document: Document) -> Self {
        let mut history = History::default();
        history.record(&document);
        Self {
            article_id,
            document,
            history,
            selected: None,
            recent_kinds: Vec::new(),
        }
    }

    pub fn article_id(&self) -> ArticleId {
        self.article_id
    }

    /// The live document. Read-only; mutations go through the session.
    pub fn document(&self) -> &Document {
        &self.document
    }

    // -----------------------------------------------------------------------
    // Mutations (each records a history snapshot)
    // -----------------------------------------------------------------------

    /// Append a block, returning its id.
    pub fn push_block(&mut self, data: BlockData) -> BlockId {
        self.note_recent(data.kind());
        let id = self.document.push_block(data);
        self.history.record(&self.document);
        id
    }

    /// Insert a block at a position (clamped to the end), returning its id.
    pub fn insert_block(&mut self, index: usize, data: BlockData) -> BlockId {
        self.note_recent(data.kind());
        let id = self.document.insert_block(index, data);
        self.history.record(&self.document);
        id
    }

    /// Remove a block by id. Clears the selection if it pointed at the
    /// removed block.
    pub fn remove_block(&mut self, id: BlockId) -> CoreResult<()> {
        self.document.remove_block(id)?;
        if self.selected == Some(id) {
            self.selected = None;
        }
        self.history.record(&self.document);
        Ok(())
    }

    /// Merge a patch into a block's payload.
    pub fn update_block(&mut self, id: BlockId, patch: &BlockPatch) -> CoreResult<()> {
        self.document.update_block(id, patch)?;
        self.history.record(&self.document);
        Ok(())
    }

    /// Rearrange the document to match the given id permutation.
    pub fn reorder(&mut self, ids: &[BlockId]) -> CoreResult<()> {
        self.document.reorder(ids)?;
        self.history.record(&self.document);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // History
    // -----------------------------------------------------------------------

    /// Step the document back one snapshot. Returns `false` when there
    /// is nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(document) => {
                self.document = document;
                true
            }
            None => false,
        }
    }

    /// Step the document forward one snapshot. Returns `false` when
    /// there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(document) => {
                self.document = document;
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // -----------------------------------------------------------------------
    // Selection and recents
    // -----------------------------------------------------------------------

    /// Select a block (or clear the selection with `None`). Selection
    /// is session state only; it does not touch history.
    pub fn select(&mut self, id: Option<BlockId>) {
        self.selected = id.filter(|id| self.document.get(*id).is_some());
    }

    pub fn selected(&self) -> Option<BlockId> {
        self.selected
    }

    /// Most recently used block kinds, newest first, deduplicated.
    pub fn recent_kinds(&self) -> &[BlockKind] {
        &self.recent_kinds
    }

    fn note_recent(&mut self, kind: BlockKind) {
        self.recent_kinds.retain(|k| *k != kind);
        self.recent_kinds.insert(0, kind);
        self.recent_kinds.truncate(RECENT_KINDS_CAP);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heading(text: &str) -> BlockData {
        BlockData::Heading {
            level: 1,
            text: text.into(),
        }
    }

    fn paragraph(text: &str) -> BlockData {
        BlockData::Paragraph { text: text.into() }
    }

    fn session() -> EditorSession {
        EditorSession::new(uuid::Uuid::new_v4(), Document::new())
    }

    #[test]
    fn add_add_delete_then_three_undos() {
        let mut s = session();
        let h = s.push_block(heading("H"));
        s.push_block(paragraph("P"));
        s.remove_block(h).unwrap();
        assert_eq!(s.document().len(), 1);

        // undo the delete: [H, P]
        assert!(s.undo());
        assert_eq!(s.document().len(), 2);
        assert_eq!(s.document().blocks()[0].id, h);

        // undo the second add: [H]
        assert!(s.undo());
        assert_eq!(s.document().len(), 1);

        // undo the first add: []
        assert!(s.undo());
        assert!(s.document().is_empty());
        assert!(!s.can_undo());
    }

    #[test]
    fn every_mutation_is_undoable() {
        let mut s = session();
        let a = s.push_block(paragraph("a"));
        let b = s.push_block(paragraph("b"));
        s.update_block(
            a,
            &BlockPatch {
                text: Some("a2".into()),
                ..Default::default()
            },
        )
        .unwrap();
        s.reorder(&[b, a]).unwrap();
        // 4 mutations -> 4 undos back to empty.
        for _ in 0..4 {
            assert!(s.undo());
        }
        assert!(s.document().is_empty());
        assert!(!s.undo());
    }

    #[test]
    fn redo_is_discarded_on_divergence() {
        let mut s = session();
        s.push_block(paragraph("a"));
        s.push_block(paragraph("b"));
        s.undo();
        s.undo();
        assert!(s.can_redo());
        s.push_block(heading("divergent"));
        assert!(!s.can_redo());
    }

    #[test]
    fn redo_restores_the_undone_state() {
        let mut s = session();
        s.push_block(paragraph("a"));
        let before = s.document().clone();
        s.push_block(paragraph("b"));
        s.undo();
        assert_eq!(*s.document(), before);
        assert!(s.redo());
        assert_eq!(s.document().len(), 2);
    }

    #[test]
    fn failed_mutation_records_nothing() {
        let mut s = session();
        s.push_block(paragraph("a"));
        assert!(s.remove_block(uuid::Uuid::new_v4()).is_err());
        // Only the open + one add are in history.
        assert!(s.undo());
        assert!(s.document().is_empty());
        assert!(!s.can_undo());
    }

    #[test]
    fn removing_the_selected_block_clears_selection() {
        let mut s = session();
        let a = s.push_block(paragraph("a"));
        s.select(Some(a));
        assert_eq!(s.selected(), Some(a));
        s.remove_block(a).unwrap();
        assert_eq!(s.selected(), None);
    }

    #[test]
    fn selecting_an_unknown_block_is_a_no_op() {
        let mut s = session();
        s.select(Some(uuid::Uuid::new_v4()));
        assert_eq!(s.selected(), None);
    }

    #[test]
    fn recent_kinds_dedupe_newest_first() {
        let mut s = session();
        s.push_block(paragraph("a"));
        s.push_block(heading("h"));
        s.push_block(paragraph("b"));
        assert_eq!(s.recent_kinds(), &[BlockKind::Paragraph, BlockKind::Heading]);
    }
}
