//! Quorum-based block finalization over replicated chain stores.
//!
//! Each node exclusively owns a chain replica and a vote tally; nodes interact
//! only through `receive_block`/`receive_vote` and a pluggable [`Transport`].
//! A candidate finalizes on a node once two thirds of the known peers have
//! assented with verifiable votes.

pub mod error;
pub mod node;
pub mod transport;
pub mod vote;

pub use error::ConsensusError;
pub use node::{FinalizeOutcome, Node, PeerRegistry, Phase};
pub use transport::{ChannelTransport, Transport};
pub use vote::{Ballot, NodeId, Vote};
