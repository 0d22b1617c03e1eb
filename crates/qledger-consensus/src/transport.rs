//! Vote delivery abstraction.
//!
//! The consensus code never sleeps to fake latency; slow or lossy delivery is
//! a property of the `Transport` implementation, which makes it mockable in
//! tests. The in-memory implementation is a set of mpsc mailboxes.

use crate::error::ConsensusError;
use crate::vote::{NodeId, Vote};
use std::collections::HashMap;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Mutex;

/// Delivery of one vote to one peer's mailbox. Fire-and-forget: the only
/// contract is that delivery either happens or returns an error, with no
/// acknowledgment beyond that.
pub trait Transport: Send + Sync {
    fn send_vote(&self, to: &NodeId, vote: Vote) -> Result<(), ConsensusError>;
}

/// In-memory mailbox transport. Votes queue per receiver until the owner
/// drains them, so delivery order across senders is arbitrary.
pub struct ChannelTransport {
    senders: Mutex<HashMap<NodeId, Sender<Vote>>>,
    receivers: Mutex<HashMap<NodeId, Receiver<Vote>>>,
}

impl ChannelTransport {
    pub fn new(ids: &[NodeId]) -> Self {
        let mut senders = HashMap::new();
        let mut receivers = HashMap::new();
        for id in ids {
            let (tx, rx) = channel();
            senders.insert(id.clone(), tx);
            receivers.insert(id.clone(), rx);
        }
        Self {
            senders: Mutex::new(senders),
            receivers: Mutex::new(receivers),
        }
    }

    /// Take every vote currently queued for `id`.
    pub fn drain(&self, id: &NodeId) -> Vec<Vote> {
        let receivers = self.receivers.lock().expect("transport lock poisoned");
        match receivers.get(id) {
            Some(rx) => rx.try_iter().collect(),
            None => Vec::new(),
        }
    }
}

impl Transport for ChannelTransport {
    fn send_vote(&self, to: &NodeId, vote: Vote) -> Result<(), ConsensusError> {
        let sender = {
            let senders = self.senders.lock().expect("transport lock poisoned");
            senders
                .get(to)
                .cloned()
                .ok_or_else(|| ConsensusError::MailboxClosed(to.clone()))?
        };
        sender
            .send(vote)
            .map_err(|_| ConsensusError::MailboxClosed(to.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vote::Ballot;
    use qledger_core::Keypair;

    #[test]
    fn queued_votes_drain_in_order_per_sender() {
        let ids: Vec<NodeId> = vec!["a".into(), "b".into()];
        let transport = ChannelTransport::new(&ids);
        let keypair = Keypair::from_seed([1u8; 32]);

        let v1 = Vote::new("a".into(), "h1".into(), Ballot::Assent, &keypair);
        let v2 = Vote::new("a".into(), "h2".into(), Ballot::Assent, &keypair);
        transport.send_vote(&"b".into(), v1.clone()).unwrap();
        transport.send_vote(&"b".into(), v2.clone()).unwrap();

        assert_eq!(transport.drain(&"b".into()), vec![v1, v2]);
        assert!(transport.drain(&"b".into()).is_empty());
        assert!(transport.drain(&"a".into()).is_empty());
    }

    #[test]
    fn unknown_mailbox_is_an_error() {
        let transport = ChannelTransport::new(&["a".into()]);
        let keypair = Keypair::from_seed([1u8; 32]);
        let vote = Vote::new("a".into(), "h".into(), Ballot::Assent, &keypair);
        let err = transport.send_vote(&"nope".into(), vote).unwrap_err();
        assert_eq!(err, ConsensusError::MailboxClosed("nope".into()));
    }
}
