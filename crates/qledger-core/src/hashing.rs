//! Canonical SHA-256 hashing and the binary Merkle fold.
//!
//! Digests circulate as lowercase hex strings; the Merkle fold concatenates
//! hex digests (not raw bytes) before re-hashing, and an odd trailing leaf is
//! promoted by re-hashing it alone rather than pairing it with itself. Both
//! choices are part of the hash format and must not change.

use sha2::{Digest, Sha256};

/// SHA-256 digest of `bytes` as lowercase hex.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Fold an ordered sequence of hex-digest leaves down to a single root.
///
/// - empty input -> `""`
/// - a single leaf is the root verbatim, with no hashing pass
/// - otherwise levels are folded pairwise left-to-right until one remains
pub fn merkle_root(leaves: &[String]) -> String {
    if leaves.is_empty() {
        return String::new();
    }
    let mut level: Vec<String> = leaves.to_vec();
    while level.len() > 1 {
        let mut next = Vec::with_capacity(level.len().div_ceil(2));
        for pair in level.chunks(2) {
            let combined = if pair.len() == 2 {
                format!("{}{}", pair[0], pair[1])
            } else {
                pair[0].clone()
            };
            next.push(sha256_hex(combined.as_bytes()));
        }
        level = next;
    }
    level.swap_remove(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_hex_known_vector() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn merkle_root_empty_is_sentinel() {
        assert_eq!(merkle_root(&[]), "");
    }

    #[test]
    fn merkle_root_single_leaf_is_the_leaf() {
        let leaf = sha256_hex(b"only");
        assert_eq!(merkle_root(&[leaf.clone()]), leaf);
    }

    #[test]
    fn merkle_root_two_leaves() {
        let h1 = sha256_hex(b"one");
        let h2 = sha256_hex(b"two");
        let expected = sha256_hex(format!("{h1}{h2}").as_bytes());
        assert_eq!(merkle_root(&[h1, h2]), expected);
    }

    #[test]
    fn merkle_root_three_leaves_promotes_the_odd_one() {
        let h1 = sha256_hex(b"one");
        let h2 = sha256_hex(b"two");
        let h3 = sha256_hex(b"three");
        let left = sha256_hex(format!("{h1}{h2}").as_bytes());
        let right = sha256_hex(h3.as_bytes());
        let expected = sha256_hex(format!("{left}{right}").as_bytes());
        assert_eq!(merkle_root(&[h1, h2, h3]), expected);
    }

    #[test]
    fn merkle_root_is_order_sensitive() {
        let h1 = sha256_hex(b"one");
        let h2 = sha256_hex(b"two");
        assert_ne!(
            merkle_root(&[h1.clone(), h2.clone()]),
            merkle_root(&[h2, h1])
        );
    }

    #[test]
    fn merkle_root_is_deterministic() {
        let leaves: Vec<String> = (0..7).map(|i| sha256_hex(format!("leaf-{i}").as_bytes())).collect();
        assert_eq!(merkle_root(&leaves), merkle_root(&leaves));
    }
}
