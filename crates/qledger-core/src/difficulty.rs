//! Proof-of-work difficulty predicate.
//!
//! One convention only: a hash satisfies `Difficulty(n)` iff its lowercase hex
//! rendering starts with `n` zero characters. The numeric
//! interpret-as-big-integer convention is deliberately not supported.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Difficulty(pub u32);

impl Difficulty {
    /// True iff `hash_hex` starts with at least `self.0` zero hex characters.
    pub fn is_met(&self, hash_hex: &str) -> bool {
        let n = self.0 as usize;
        hash_hex.len() >= n && hash_hex.as_bytes()[..n].iter().all(|b| *b == b'0')
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
