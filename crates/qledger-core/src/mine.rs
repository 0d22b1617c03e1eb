//! Proof-of-work nonce search.
//!
//! The timestamp is fixed at block construction, so the search space is the
//! nonce alone. Both searches are bounded by a caller-supplied attempt budget
//! and fail with `PowExhausted` when it runs out.

use crate::block::Block;
use crate::error::Error;
use crate::hashing::sha256_hex;
use rayon::prelude::*;
use tracing::info;

/// Increment the nonce from its current value until the block hash satisfies
/// the difficulty target. The returned block carries the winning nonce and a
/// fresh hash.
pub fn mine_block(mut block: Block, max_attempts: u64) -> Result<Block, Error> {
    for _ in 0..max_attempts {
        block.recompute_hash();
        if block.meets_difficulty() {
            info!(nonce = block.nonce, hash = %block.hash, "mined block");
            return Ok(block);
        }
        block.nonce = block.nonce.wrapping_add(1);
    }
    Err(Error::PowExhausted {
        attempts: max_attempts,
    })
}

/// Same contract as `mine_block`, but the nonce range is searched in parallel
/// with rayon. Any satisfying nonce may win, not necessarily the smallest.
pub fn mine_block_parallel(mut block: Block, max_attempts: u64) -> Result<Block, Error> {
    // Only the nonce varies per attempt; prebuild the surrounding preimage.
    let prefix = format!(
        "{}{}{}{}",
        block.version, block.prev_hash, block.timestamp, block.difficulty
    );
    let suffix = block.merkle_root.clone();
    let target = block.difficulty;
    let start = block.nonce;

    let found = (start..start.saturating_add(max_attempts))
        .into_par_iter()
        .find_any(|nonce| {
            let hash = sha256_hex(format!("{prefix}{nonce}{suffix}").as_bytes());
            target.is_met(&hash)
        });

    match found {
        Some(nonce) => {
            block.nonce = nonce;
            block.recompute_hash();
            info!(nonce, hash = %block.hash, "mined block (parallel)");
            Ok(block)
        }
        None => Err(Error::PowExhausted {
            attempts: max_attempts,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::difficulty::Difficulty;
    use crate::transaction::Transaction;

    fn template(difficulty: u32) -> Block {
        let txs = vec![
            Transaction::new("alice", vec!["bob".to_string()], 10.0, 1_600_000_000).unwrap(),
            Transaction::new("bob", vec!["carol".to_string()], 5.0, 1_600_000_100).unwrap(),
        ];
        Block::new("1.0", "0", txs, Difficulty(difficulty), 1_600_000_200)
    }

    #[test]
    fn mined_hash_carries_the_required_zero_prefix() {
        let mined = mine_block(template(2), 1_000_000).unwrap();
        assert!(mined.hash.starts_with("00"));
        assert!(mined.verify_hash());
    }

    #[test]
    fn zero_difficulty_wins_on_the_first_attempt() {
        let mined = mine_block(template(0), 1).unwrap();
        assert_eq!(mined.nonce, 0);
    }

    #[test]
    fn exhausted_budget_fails_typed() {
        let err = mine_block(template(16), 3).unwrap_err();
        assert_eq!(err, Error::PowExhausted { attempts: 3 });
    }

    #[test]
    fn parallel_search_agrees_with_the_predicate() {
        let mined = mine_block_parallel(template(2), 4_000_000).unwrap();
        assert!(mined.hash.starts_with("00"));
        assert!(mined.verify_hash());
        assert!(mined.meets_difficulty());
    }

    #[test]
    fn parallel_search_also_exhausts() {
        let err = mine_block_parallel(template(16), 3).unwrap_err();
        assert_eq!(err, Error::PowExhausted { attempts: 3 });
    }
}
