//! Signed votes on a candidate block.

use qledger_core::{Keypair, PublicKey, Signature};
use serde::{Deserialize, Serialize};

pub type NodeId = String;

/// A vote is a tagged variant, not a bare boolean. Only distinct `Assent`
/// voters count toward quorum.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ballot {
    Assent,
    Reject,
}

impl Ballot {
    fn tag(self) -> &'static str {
        match self {
            Ballot::Assent => "assent",
            Ballot::Reject => "reject",
        }
    }
}

/// An assent or rejection of one candidate block, signed by the voter so the
/// claimed identity is unforgeable. The signature covers both the candidate
/// hash and the ballot, so a relayed vote cannot be flipped in transit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vote {
    pub voter: NodeId,
    pub block_hash: String,
    pub ballot: Ballot,
    pub signature: Signature,
}

impl Vote {
    pub fn new(voter: NodeId, block_hash: String, ballot: Ballot, keypair: &Keypair) -> Self {
        let signature = keypair.sign(Self::message(&block_hash, ballot).as_bytes());
        Self {
            voter,
            block_hash,
            ballot,
            signature,
        }
    }

    fn message(block_hash: &str, ballot: Ballot) -> String {
        format!("{block_hash}:{}", ballot.tag())
    }

    /// True iff the signature binds this voter's key to this hash and ballot.
    pub fn verify(&self, key: &PublicKey) -> bool {
        key.verify(
            Self::message(&self.block_hash, self.ballot).as_bytes(),
            &self.signature,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vote_verifies_under_the_signer_key() {
        let keypair = Keypair::from_seed([1u8; 32]);
        let vote = Vote::new("node-0".into(), "abc123".into(), Ballot::Assent, &keypair);
        assert!(vote.verify(&keypair.public_key()));
    }

    #[test]
    fn flipping_the_ballot_invalidates_the_signature() {
        let keypair = Keypair::from_seed([1u8; 32]);
        let mut vote = Vote::new("node-0".into(), "abc123".into(), Ballot::Assent, &keypair);
        vote.ballot = Ballot::Reject;
        assert!(!vote.verify(&keypair.public_key()));
    }

    #[test]
    fn changing_the_candidate_invalidates_the_signature() {
        let keypair = Keypair::from_seed([1u8; 32]);
        let mut vote = Vote::new("node-0".into(), "abc123".into(), Ballot::Assent, &keypair);
        vote.block_hash = "def456".into();
        assert!(!vote.verify(&keypair.public_key()));
    }

    #[test]
    fn another_key_cannot_claim_the_vote() {
        let signer = Keypair::from_seed([1u8; 32]);
        let other = Keypair::from_seed([2u8; 32]);
        let vote = Vote::new("node-0".into(), "abc123".into(), Ballot::Assent, &signer);
        assert!(!vote.verify(&other.public_key()));
    }
}
