//! Document: an ordered sequence of blocks owned by one editing session.
//!
//! Invariant: the blocks' `order` values are always a dense 0-based
//! permutation. Every insert/delete re-derives them; the sequence is
//! never left sparse.

use serde::{Deserialize, Serialize};

use crate::block::{Block, BlockData, BlockId, BlockPatch};
use crate::error::{CoreError, CoreResult};

/// Ordered collection of typed content blocks.
///
/// Structural equality (`PartialEq`) is what the auto-save scheduler
/// uses to decide whether anything actually changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    blocks: Vec<Block>,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Look up a block by id.
    pub fn get(&self, id: BlockId) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == id)
    }

    /// Append a new block with the given payload, returning its id.
    pub fn push_block(&mut self, data: BlockData) -> BlockId {
        let block = Block::new(data);
        let id = block.id;
        self.blocks.push(block);
        self.renumber();
        id
    }

    /// Insert a new block at the given position (clamped to the end),
    /// returning its id.
    pub fn insert_block(&mut self, index: usize, data: BlockData) -> BlockId {
        let block = Block::new(data);
        let id = block.id;
        let index = index.min(self.blocks.len());
        self.blocks.insert(index, block);
        self.renumber();
        id
    }

    /// Remove a block by id and close the gap.
    pub fn remove_block(&mut self, id: BlockId) -> CoreResult<()> {
        let pos = self
            .blocks
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| CoreError::not_found("Block", id))?;
        self.blocks.remove(pos);
        self.renumber();
        Ok(())
    }

    /// Merge a patch into the payload of the block with the given id.
    /// Order and kind are untouched.
    pub fn update_block(&mut self, id: BlockId, patch: &BlockPatch) -> CoreResult<()> {
        let block = self
            .blocks
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| CoreError::not_found("Block", id))?;
        block.apply_patch(patch);
        Ok(())
    }

    /// Rearrange the document to match the given id sequence.
    ///
    /// The sequence must be a permutation of the current block ids;
    /// anything else (missing, extra, or duplicated ids) is a
    /// validation error and leaves the document unchanged. Order values
    /// are re-derived from the new positions.
    pub fn reorder(&mut self, ids: &[BlockId]) -> CoreResult<()> {
        if ids.len() != self.blocks.len() {
            return Err(CoreError::Validation(format!(
                "Reorder sequence has {} ids but the document has {} blocks",
                ids.len(),
                self.blocks.len()
            )));
        }
        let mut reordered = Vec::with_capacity(self.blocks.len());
        for id in ids {
            let pos = self
                .blocks
                .iter()
                .position(|b| b.id == *id && !reordered.iter().any(|r: &Block| r.id == *id))
                .ok_or_else(|| {
                    CoreError::Validation(format!(
                        "Reorder sequence is not a permutation of the document (id {id})"
                    ))
                })?;
            reordered.push(self.blocks[pos].clone());
        }
        self.blocks = reordered;
        self.renumber();
        Ok(())
    }

    /// Re-derive dense 0-based order values from the current positions.
    fn renumber(&mut self) {
        for (i, block) in self.blocks.iter_mut().enumerate() {
            block.order = i;
        }
    }
}
