//! Append-only chain store rooted at a deterministic genesis block.

use crate::block::Block;
use crate::constants::{GENESIS_PREV_HASH, GENESIS_TIMESTAMP, GENESIS_VERSION};
use crate::difficulty::Difficulty;
use crate::error::Error;
use tracing::debug;

/// The genesis sentinel: empty transaction set, previous-hash `"0"`,
/// difficulty 0 and a fixed timestamp, so every replica derives the same
/// genesis hash without any exchange.
pub fn genesis_block() -> Block {
    Block::new(
        GENESIS_VERSION,
        GENESIS_PREV_HASH,
        vec![],
        Difficulty(0),
        GENESIS_TIMESTAMP,
    )
}

/// Grows monotonically and is never truncated or reordered. Candidates are
/// re-validated at append time rather than trusting the caller: duplicate
/// hashes, broken parent links and failed hash/Merkle/PoW checks are all
/// rejected before the block lands.
#[derive(Clone, Debug)]
pub struct Chain {
    blocks: Vec<Block>,
}

impl Chain {
    pub fn new() -> Self {
        Self {
            blocks: vec![genesis_block()],
        }
    }

    pub fn genesis(&self) -> &Block {
        &self.blocks[0]
    }

    /// The most recently appended block.
    pub fn tip(&self) -> &Block {
        self.blocks.last().expect("chain always holds genesis")
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        false // genesis is always present
    }

    pub fn get(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn contains_hash(&self, hash: &str) -> bool {
        self.blocks.iter().any(|b| b.hash == hash)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter()
    }

    /// Append `block` after validating it against the current tip.
    pub fn append(&mut self, block: Block) -> Result<(), Error> {
        if self.contains_hash(&block.hash) {
            return Err(Error::DuplicateBlock);
        }
        if block.prev_hash != self.tip().hash {
            return Err(Error::BrokenLink);
        }
        if !block.verify_hash() {
            return Err(Error::InvalidBlock("stale block hash"));
        }
        if !block.verify_merkle_root() {
            return Err(Error::InvalidBlock("merkle root mismatch"));
        }
        if !block.meets_difficulty() {
            return Err(Error::InvalidBlock("difficulty target not met"));
        }
        debug!(height = self.blocks.len(), hash = %block.hash, "block appended");
        self.blocks.push(block);
        Ok(())
    }
}

impl Default for Chain {
    fn default() -> Self {
        Self::new()
    }
}
