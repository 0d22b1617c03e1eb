//! Consensus node: validate a candidate block, fan out a signed vote, tally
//! peer votes, finalize on quorum.

use crate::error::ConsensusError;
use crate::transport::Transport;
use crate::vote::{Ballot, NodeId, Vote};
use qledger_core::{Block, Chain, Keypair, PublicKey};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::thread;
use tracing::{debug, info, warn};

/// Known peer identities and their verifying keys. Shared read-only between
/// the nodes of one deployment.
#[derive(Clone, Debug, Default)]
pub struct PeerRegistry {
    keys: HashMap<NodeId, PublicKey>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: NodeId, key: PublicKey) {
        self.keys.insert(id, key);
    }

    pub fn key_of(&self, id: &NodeId) -> Option<&PublicKey> {
        self.keys.get(id)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Per-candidate lifecycle. A node handles one candidate at a time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    AwaitingVotes { candidate: String },
    Finalized { hash: String },
}

/// Result of a finalize attempt. `QuorumNotReached` is a normal outcome,
/// not an error; the caller may keep collecting votes and try again.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FinalizeOutcome {
    Finalized { assents: usize },
    QuorumNotReached { assents: usize, quorum: usize },
}

/// Distinct assents required to finalize among `total_nodes` participants.
pub fn quorum(total_nodes: usize) -> usize {
    2 * total_nodes / 3
}

/// A consensus participant. Owns its chain replica and vote tally exclusively;
/// other nodes reach it only through `receive_vote` (usually via a
/// [`Transport`] mailbox). Both entry points are safe to call concurrently
/// from multiple sender threads.
pub struct Node {
    id: NodeId,
    keypair: Keypair,
    registry: Arc<PeerRegistry>,
    block_signer: Option<PublicKey>,
    chain: Mutex<Chain>,
    phase: Mutex<Phase>,
    votes: Mutex<HashMap<NodeId, (String, Ballot)>>,
}

impl Node {
    pub fn new(id: NodeId, keypair: Keypair, registry: Arc<PeerRegistry>) -> Self {
        Self {
            id,
            keypair,
            registry,
            block_signer: None,
            chain: Mutex::new(Chain::new()),
            phase: Mutex::new(Phase::Idle),
            votes: Mutex::new(HashMap::new()),
        }
    }

    /// Expect candidate blocks to be signed by `key`. When set, validation
    /// rejects unsigned blocks and blocks signed by any other key.
    pub fn with_block_signer(mut self, key: PublicKey) -> Self {
        self.block_signer = Some(key);
        self
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn public_key(&self) -> PublicKey {
        self.keypair.public_key()
    }

    pub fn phase(&self) -> Phase {
        self.phase.lock().expect("phase lock poisoned").clone()
    }

    pub fn chain_len(&self) -> usize {
        self.chain.lock().expect("chain lock poisoned").len()
    }

    pub fn tip_hash(&self) -> String {
        self.chain.lock().expect("chain lock poisoned").tip().hash.clone()
    }

    /// Independent candidate check: PoW satisfaction, Merkle root, hash
    /// integrity, and the block signature whenever a signer key is known.
    pub fn validate(&self, block: &Block) -> bool {
        let structurally_sound =
            block.meets_difficulty() && block.verify_merkle_root() && block.verify_hash();
        match &self.block_signer {
            Some(key) => structurally_sound && block.verify_signature(key),
            None => structurally_sound,
        }
    }

    /// Validate `candidate` and fan a signed vote out to every other peer,
    /// one thread per send, joined before returning. A failed delivery is
    /// logged and otherwise ignored (fire-and-forget).
    pub fn receive_block(
        &self,
        candidate: &Block,
        peers: &[NodeId],
        transport: &dyn Transport,
    ) -> Ballot {
        let ballot = if self.validate(candidate) {
            let mut phase = self.phase.lock().expect("phase lock poisoned");
            *phase = Phase::AwaitingVotes {
                candidate: candidate.hash.clone(),
            };
            Ballot::Assent
        } else {
            warn!(node = %self.id, hash = %candidate.hash, "candidate block failed validation");
            Ballot::Reject
        };

        let vote = Vote::new(self.id.clone(), candidate.hash.clone(), ballot, &self.keypair);
        thread::scope(|s| {
            for peer in peers.iter().filter(|p| **p != self.id) {
                let vote = vote.clone();
                s.spawn(move || {
                    if let Err(err) = transport.send_vote(peer, vote) {
                        warn!(node = %self.id, %peer, %err, "vote delivery failed");
                    }
                });
            }
        });
        ballot
    }

    /// Record a peer's vote. Rejects unknown voters and bad signatures; a
    /// repeated vote from the same peer overwrites its previous entry, so
    /// re-votes never double-count.
    pub fn receive_vote(&self, vote: Vote) -> Result<(), ConsensusError> {
        let key = self
            .registry
            .key_of(&vote.voter)
            .ok_or_else(|| ConsensusError::UnknownPeer(vote.voter.clone()))?;
        if !vote.verify(key) {
            return Err(ConsensusError::BadVoteSignature(vote.voter.clone()));
        }
        debug!(node = %self.id, voter = %vote.voter, ballot = ?vote.ballot, "vote recorded");
        let mut votes = self.votes.lock().expect("vote tally lock poisoned");
        votes.insert(vote.voter.clone(), (vote.block_hash, vote.ballot));
        Ok(())
    }

    /// Count of distinct peers that assented to `block_hash`.
    pub fn assents_for(&self, block_hash: &str) -> usize {
        let votes = self.votes.lock().expect("vote tally lock poisoned");
        votes
            .values()
            .filter(|(hash, ballot)| hash == block_hash && *ballot == Ballot::Assent)
            .count()
    }

    /// Append `candidate` to the local chain iff at least
    /// `2 * total_nodes / 3` distinct peers assented to it.
    pub fn finalize(
        &self,
        candidate: &Block,
        total_nodes: usize,
    ) -> Result<FinalizeOutcome, ConsensusError> {
        let assents = self.assents_for(&candidate.hash);
        let quorum = quorum(total_nodes);
        if assents < quorum {
            debug!(node = %self.id, assents, quorum, "quorum not reached");
            return Ok(FinalizeOutcome::QuorumNotReached { assents, quorum });
        }

        let mut chain = self.chain.lock().expect("chain lock poisoned");
        chain.append(candidate.clone())?;
        let mut phase = self.phase.lock().expect("phase lock poisoned");
        *phase = Phase::Finalized {
            hash: candidate.hash.clone(),
        };
        info!(node = %self.id, hash = %candidate.hash, height = chain.len() - 1, assents, "block finalized");
        Ok(FinalizeOutcome::Finalized { assents })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qledger_core::mine::mine_block;
    use qledger_core::{Difficulty, Transaction};

    fn candidate_on(chain_tip: String, difficulty: u32) -> Block {
        let txs = vec![Transaction::new(
            "alice",
            vec!["bob".to_string()],
            7.0,
            1_600_000_000,
        )
        .unwrap()];
        let block = Block::new("1.0", chain_tip, txs, Difficulty(difficulty), 1_600_000_300);
        mine_block(block, 1_000_000).unwrap()
    }

    fn single_node() -> (Node, Block) {
        let keypair = Keypair::from_seed([11u8; 32]);
        let mut registry = PeerRegistry::new();
        registry.insert("node-0".into(), keypair.public_key());
        let node = Node::new("node-0".into(), keypair, Arc::new(registry));
        let candidate = candidate_on(node.tip_hash(), 1);
        (node, candidate)
    }

    #[test]
    fn validate_accepts_a_well_formed_candidate() {
        let (node, candidate) = single_node();
        assert!(node.validate(&candidate));
    }

    #[test]
    fn validate_rejects_a_tampered_merkle_root() {
        let (node, mut candidate) = single_node();
        candidate.transactions.clear();
        assert!(!node.validate(&candidate));
    }

    #[test]
    fn validate_rejects_unmet_difficulty() {
        let (node, mut candidate) = single_node();
        candidate.difficulty = Difficulty(16);
        candidate.recompute_hash();
        assert!(!node.validate(&candidate));
    }

    #[test]
    fn known_signer_key_makes_the_signature_mandatory() {
        let signer = Keypair::from_seed([12u8; 32]);
        let keypair = Keypair::from_seed([11u8; 32]);
        let node = Node::new("node-0".into(), keypair, Arc::new(PeerRegistry::new()))
            .with_block_signer(signer.public_key());

        let mut candidate = candidate_on(node.tip_hash(), 1);
        assert!(!node.validate(&candidate)); // unsigned
        candidate.sign(&signer).unwrap();
        assert!(node.validate(&candidate));
    }

    #[test]
    fn unknown_voters_are_rejected() {
        let (node, candidate) = single_node();
        let stranger = Keypair::from_seed([99u8; 32]);
        let vote = Vote::new(
            "stranger".into(),
            candidate.hash.clone(),
            Ballot::Assent,
            &stranger,
        );
        assert_eq!(
            node.receive_vote(vote),
            Err(ConsensusError::UnknownPeer("stranger".into()))
        );
    }

    #[test]
    fn forged_votes_are_rejected() {
        let (node, candidate) = single_node();
        let forger = Keypair::from_seed([99u8; 32]);
        // Claims node-0's identity but signs with a different key.
        let vote = Vote::new(
            "node-0".into(),
            candidate.hash.clone(),
            Ballot::Assent,
            &forger,
        );
        assert_eq!(
            node.receive_vote(vote),
            Err(ConsensusError::BadVoteSignature("node-0".into()))
        );
    }

    #[test]
    fn quorum_is_two_thirds_floor() {
        assert_eq!(quorum(10), 6);
        assert_eq!(quorum(3), 2);
        assert_eq!(quorum(4), 2);
        assert_eq!(quorum(100), 66);
    }
}
