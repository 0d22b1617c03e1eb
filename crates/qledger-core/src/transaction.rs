//! Signed unit of value transfer.

use crate::constants::RECEIVER_DELIMITER;
use crate::error::Error;
use crate::hashing::sha256_hex;
use crate::keys::{Keypair, PublicKey, Signature};
use crate::unix_now;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A transaction's hash is computed exactly once at construction from
/// `sender ‖ receivers.join("|") ‖ amount ‖ timestamp` and is never recomputed
/// implicitly; `verify_hash` exists to detect post-construction tampering.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: String,
    pub receivers: Vec<String>,
    pub amount: f64,
    pub timestamp: u64,
    pub hash: String,
    pub signature: Option<Signature>,
}

impl Transaction {
    /// Build a transaction with an explicit timestamp (unix seconds).
    pub fn new(
        sender: impl Into<String>,
        receivers: Vec<String>,
        amount: f64,
        timestamp: u64,
    ) -> Result<Self, Error> {
        let sender = sender.into();
        if sender.is_empty() {
            return Err(Error::EmptySender);
        }
        if receivers.is_empty() {
            return Err(Error::NoReceivers);
        }
        let hash = sha256_hex(canonical_preimage(&sender, &receivers, amount, timestamp).as_bytes());
        Ok(Self {
            sender,
            receivers,
            amount,
            timestamp,
            hash,
            signature: None,
        })
    }

    /// Build a transaction stamped with the current time.
    pub fn create(
        sender: impl Into<String>,
        receivers: Vec<String>,
        amount: f64,
    ) -> Result<Self, Error> {
        Self::new(sender, receivers, amount, unix_now())
    }

    /// Attach a signature over the transaction hash. A signature is attached
    /// at most once; re-signing is a caller bug surfaced as `AlreadySigned`.
    pub fn sign(&mut self, keypair: &Keypair) -> Result<(), Error> {
        if self.signature.is_some() {
            return Err(Error::AlreadySigned);
        }
        self.signature = Some(keypair.sign(self.hash.as_bytes()));
        Ok(())
    }

    /// False if unsigned, true iff the signature validates the stored hash.
    pub fn verify_signature(&self, key: &PublicKey) -> bool {
        match &self.signature {
            Some(sig) => key.verify(self.hash.as_bytes(), sig),
            None => false,
        }
    }

    /// Recompute the hash from current field values and compare.
    pub fn verify_hash(&self) -> bool {
        self.hash
            == sha256_hex(
                canonical_preimage(&self.sender, &self.receivers, self.amount, self.timestamp)
                    .as_bytes(),
            )
    }
}

fn canonical_preimage(sender: &str, receivers: &[String], amount: f64, timestamp: u64) -> String {
    format!(
        "{sender}{}{amount}{timestamp}",
        receivers.join(RECEIVER_DELIMITER)
    )
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string_pretty(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}
