//! Local node identity
//!
//! Holds this node's well-known name and Ed25519 key, and signs
//! transactions that require that key.

use crate::domain::{TransactionSignature, WireTransaction};
use crate::error::CommitError;
use crate::ports::outbound::{IdentityProvider, TransactionSigner};
use async_trait::async_trait;
use shared_crypto::Ed25519KeyPair;
use shared_types::{IdentityError, Party};
use tracing::debug;

/// Identity and signing key of the node running the flows.
pub struct LocalIdentity {
    party: Party,
    keypair: Ed25519KeyPair,
}

impl LocalIdentity {
    pub fn new(name: impl Into<String>, keypair: Ed25519KeyPair) -> Result<Self, IdentityError> {
        let party = Party::new(name, keypair.public_key())?;
        Ok(Self { party, keypair })
    }

    /// Identity with a fresh random key.
    pub fn generate(name: impl Into<String>) -> Result<Self, IdentityError> {
        Self::new(name, Ed25519KeyPair::generate())
    }

    pub fn party(&self) -> &Party {
        &self.party
    }
}

impl std::fmt::Debug for LocalIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalIdentity")
            .field("party", &self.party)
            .finish_non_exhaustive()
    }
}

impl IdentityProvider for LocalIdentity {
    fn our_identity(&self) -> Party {
        self.party.clone()
    }
}

#[async_trait]
impl TransactionSigner for LocalIdentity {
    async fn sign(&self, tx: &WireTransaction) -> Result<TransactionSignature, CommitError> {
        let our_key = self.keypair.public_key();
        if !tx.signers.contains(&our_key) {
            return Err(CommitError::Signing {
                reason: format!("{} is not a required signer", self.party),
            });
        }

        debug!(party = %self.party, "[bn-membership] Signing transaction");
        Ok(TransactionSignature {
            by: our_key,
            signature: self.keypair.sign(&tx.id()),
        })
    }
}
