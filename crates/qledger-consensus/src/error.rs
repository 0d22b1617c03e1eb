use crate::vote::NodeId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsensusError {
    #[error("vote from unknown peer {0}")]
    UnknownPeer(NodeId),

    #[error("vote signature from {0} did not verify")]
    BadVoteSignature(NodeId),

    #[error("no mailbox registered for {0}")]
    MailboxClosed(NodeId),

    #[error(transparent)]
    Core(#[from] qledger_core::Error),
}
