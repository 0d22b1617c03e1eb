use thiserror::Error;

/// Typed outcomes for every fallible core operation. Verification queries
/// (`verify_hash`, `verify_signature`, `verify_merkle_root`) return `bool`
/// instead; a failed check is an expected answer, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("transaction sender must not be empty")]
    EmptySender,

    #[error("transaction needs at least one receiver")]
    NoReceivers,

    #[error("already signed; signatures are attached exactly once")]
    AlreadySigned,

    #[error("malformed key material")]
    InvalidKey,

    #[error("block with the same hash is already in the chain")]
    DuplicateBlock,

    #[error("block's previous hash does not match the chain tip")]
    BrokenLink,

    #[error("invalid block: {0}")]
    InvalidBlock(&'static str),

    #[error("proof-of-work search exhausted after {attempts} attempts")]
    PowExhausted { attempts: u64 },
}
