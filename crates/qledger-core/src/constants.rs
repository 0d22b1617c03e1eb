pub const HASH_SIZE: usize = 32;
pub const HASH_HEX_SIZE: usize = HASH_SIZE * 2;

/// Delimiter joining receiver identifiers inside the transaction hash preimage.
pub const RECEIVER_DELIMITER: &str = "|";

pub const BLOCK_VERSION: &str = "1.0";

/// Genesis is fully deterministic so that independent replicas agree on its
/// hash without any exchange.
pub const GENESIS_VERSION: &str = "1.0";
pub const GENESIS_PREV_HASH: &str = "0";
pub const GENESIS_TIMESTAMP: u64 = 0;

pub const DEFAULT_MAX_POW_ATTEMPTS: u64 = 50_000_000;
