//! Ordered container of transactions with a Merkle root and a cached hash.

use crate::difficulty::Difficulty;
use crate::error::Error;
use crate::hashing::{merkle_root, sha256_hex};
use crate::keys::{Keypair, PublicKey, Signature};
use crate::transaction::Transaction;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The block hash is a pure function of
/// `{version, prev_hash, timestamp, difficulty, nonce, merkle_root}`.
/// Mutating the nonce (or any hashed field) invalidates the cached hash;
/// `recompute_hash` must run before the hash is trusted again.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub version: String,
    pub prev_hash: String,
    pub timestamp: u64,
    pub difficulty: Difficulty,
    pub nonce: u64,
    pub transactions: Vec<Transaction>,
    pub merkle_root: String,
    pub hash: String,
    pub signature: Option<Signature>,
}

impl Block {
    /// Build a block with nonce 0. The Merkle root is computed from the
    /// transactions exactly as passed, then the block hash, in that order.
    pub fn new(
        version: impl Into<String>,
        prev_hash: impl Into<String>,
        transactions: Vec<Transaction>,
        difficulty: Difficulty,
        timestamp: u64,
    ) -> Self {
        let mut block = Self {
            version: version.into(),
            prev_hash: prev_hash.into(),
            timestamp,
            difficulty,
            nonce: 0,
            merkle_root: tx_merkle_root(&transactions),
            transactions,
            hash: String::new(),
            signature: None,
        };
        block.recompute_hash();
        block
    }

    /// The canonical hash preimage. Numeric fields render as decimal text.
    pub fn hash_preimage(&self) -> String {
        format!(
            "{}{}{}{}{}{}",
            self.version,
            self.prev_hash,
            self.timestamp,
            self.difficulty,
            self.nonce,
            self.merkle_root
        )
    }

    /// Refresh the cached hash after a nonce or field mutation. The mining
    /// loop calls this on every attempt.
    pub fn recompute_hash(&mut self) {
        self.hash = sha256_hex(self.hash_preimage().as_bytes());
    }

    /// Attach a signature over the block hash, at most once.
    pub fn sign(&mut self, keypair: &Keypair) -> Result<(), Error> {
        if self.signature.is_some() {
            return Err(Error::AlreadySigned);
        }
        self.signature = Some(keypair.sign(self.hash.as_bytes()));
        Ok(())
    }

    /// False if unsigned, true iff the signature validates the stored hash.
    pub fn verify_signature(&self, key: &PublicKey) -> bool {
        match &self.signature {
            Some(sig) => key.verify(self.hash.as_bytes(), sig),
            None => false,
        }
    }

    /// Recompute the Merkle root from the current transaction list and compare.
    pub fn verify_merkle_root(&self) -> bool {
        self.merkle_root == tx_merkle_root(&self.transactions)
    }

    /// Recompute the block hash from current field values and compare.
    pub fn verify_hash(&self) -> bool {
        self.hash == sha256_hex(self.hash_preimage().as_bytes())
    }

    /// True iff the cached hash satisfies this block's difficulty target.
    pub fn meets_difficulty(&self) -> bool {
        self.difficulty.is_met(&self.hash)
    }
}

fn tx_merkle_root(transactions: &[Transaction]) -> String {
    let leaves: Vec<String> = transactions.iter().map(|tx| tx.hash.clone()).collect();
    merkle_root(&leaves)
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string_pretty(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}
