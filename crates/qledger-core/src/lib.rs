//! Ledger core: canonical hashing, signed transactions and blocks,
//! an append-only chain store, and a proof-of-work miner.
//!
//! Everything here is transport- and storage-agnostic. Callers that want
//! networking or persistence supply them on top of these types.

pub mod block;
pub mod chain;
pub mod constants;
pub mod difficulty;
pub mod error;
pub mod hashing;
pub mod keys;
pub mod mine;
pub mod transaction;

pub use block::Block;
pub use chain::Chain;
pub use difficulty::Difficulty;
pub use error::Error;
pub use keys::{Keypair, PublicKey, Signature};
pub use transaction::Transaction;

use std::time::{SystemTime, UNIX_EPOCH};

/// Current unix time in seconds. Timestamps are captured once and passed
/// explicitly into hashing, never read implicitly inside it.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_secs()
}
