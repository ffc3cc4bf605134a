//! Membership transactions
//!
//! A transaction is an atomic change-set: the versions it consumes, the
//! versions it produces, one command naming the required signers, and the
//! notary that arbitrates double-spends. Its id is a SHA3-256 digest of the
//! canonical bincode encoding of all of those, so any tampering with the
//! content invalidates both the id and every signature over it.

use super::record::{MembershipRecord, StateAndRef, StateRef};
use crate::error::CommitError;
use serde::{Deserialize, Serialize};
use shared_crypto::{verify_signature, Sha3Hasher};
use shared_types::{Hash, Party, PublicKey, Signature};
use std::fmt;

/// Domain tag mixed into every transaction id.
pub const TX_ID_DOMAIN: &[u8] = b"bn-membership.tx.v1";

/// Contract commands
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    Activate,
    Suspend,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Activate => "Activate",
            Self::Suspend => "Suspend",
        })
    }
}

/// A signature over a transaction id by one key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSignature {
    pub by: PublicKey,
    pub signature: Signature,
}

#[derive(Serialize)]
struct IdPreimage<'a> {
    inputs: &'a [StateRef],
    outputs: &'a [MembershipRecord],
    command: Command,
    signers: &'a [PublicKey],
    notary: &'a Party,
}

/// An unsigned, fully built transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireTransaction {
    pub inputs: Vec<StateRef>,
    pub outputs: Vec<MembershipRecord>,
    pub command: Command,
    /// Keys that must sign for the command.
    pub signers: Vec<PublicKey>,
    pub notary: Party,
    id: Hash,
}

impl WireTransaction {
    /// Transaction id as computed when the transaction was built.
    pub fn id(&self) -> Hash {
        self.id
    }

    /// Recompute the id from the current content.
    pub fn compute_id(&self) -> Result<Hash, CommitError> {
        compute_id(
            &self.inputs,
            &self.outputs,
            self.command,
            &self.signers,
            &self.notary,
        )
    }

    /// Check that the content still hashes to the stored id.
    pub fn verify_id(&self) -> Result<(), CommitError> {
        if self.compute_id()? == self.id {
            Ok(())
        } else {
            Err(CommitError::Rejected {
                reason: "transaction content does not match its id".into(),
            })
        }
    }

    /// Reference the `index`th output will have once committed.
    pub fn out_ref(&self, index: u32) -> StateRef {
        StateRef::new(self.id, index)
    }
}

fn compute_id(
    inputs: &[StateRef],
    outputs: &[MembershipRecord],
    command: Command,
    signers: &[PublicKey],
    notary: &Party,
) -> Result<Hash, CommitError> {
    let preimage = IdPreimage {
        inputs,
        outputs,
        command,
        signers,
        notary,
    };
    let bytes = bincode::serialize(&preimage).map_err(|e| CommitError::Rejected {
        reason: format!("transaction encoding failed: {e}"),
    })?;

    let mut hasher = Sha3Hasher::with_domain(TX_ID_DOMAIN);
    hasher.update(&bytes);
    Ok(hasher.finalize())
}

/// Incrementally assembles a [`WireTransaction`].
#[derive(Clone, Debug)]
pub struct TransactionBuilder {
    notary: Party,
    inputs: Vec<StateRef>,
    outputs: Vec<MembershipRecord>,
    command: Option<(Command, Vec<PublicKey>)>,
}

impl TransactionBuilder {
    pub fn new(notary: Party) -> Self {
        Self {
            notary,
            inputs: Vec::new(),
            outputs: Vec::new(),
            command: None,
        }
    }

    pub fn add_input_state(&mut self, input: &StateAndRef) -> &mut Self {
        self.inputs.push(input.reference);
        self
    }

    pub fn add_output_state(&mut self, output: MembershipRecord) -> &mut Self {
        self.outputs.push(output);
        self
    }

    /// Set the command and the single key required to sign it.
    pub fn add_command(&mut self, command: Command, signer: PublicKey) -> &mut Self {
        self.command = Some((command, vec![signer]));
        self
    }

    /// Freeze the builder into a transaction with a computed id.
    pub fn to_wire_transaction(&self) -> Result<WireTransaction, CommitError> {
        let (command, signers) = self.command.clone().ok_or_else(|| CommitError::Rejected {
            reason: "transaction has no command".into(),
        })?;
        if self.outputs.is_empty() {
            return Err(CommitError::Rejected {
                reason: "transaction has no outputs".into(),
            });
        }

        let id = compute_id(
            &self.inputs,
            &self.outputs,
            command,
            &signers,
            &self.notary,
        )?;

        Ok(WireTransaction {
            inputs: self.inputs.clone(),
            outputs: self.outputs.clone(),
            command,
            signers,
            notary: self.notary.clone(),
            id,
        })
    }
}

/// A transaction together with the signatures collected over its id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub tx: WireTransaction,
    pub signatures: Vec<TransactionSignature>,
}

impl SignedTransaction {
    pub fn new(tx: WireTransaction, signature: TransactionSignature) -> Self {
        Self {
            tx,
            signatures: vec![signature],
        }
    }

    pub fn id(&self) -> Hash {
        self.tx.id()
    }

    /// Committed view of output `index`.
    pub fn out_ref(&self, index: u32) -> Option<StateAndRef> {
        self.tx
            .outputs
            .get(index as usize)
            .map(|state| StateAndRef::new(state.clone(), self.tx.out_ref(index)))
    }

    /// Zero-trust check: the id matches the content, every signature is
    /// valid, and every required signer has signed.
    pub fn verify_required_signatures(&self) -> Result<(), CommitError> {
        self.tx.verify_id()?;
        let id = self.id();

        for sig in &self.signatures {
            verify_signature(&sig.by, &id, &sig.signature).map_err(|e| CommitError::Rejected {
                reason: format!("invalid signature: {e}"),
            })?;
        }

        let missing = self
            .tx
            .signers
            .iter()
            .filter(|key| !self.signatures.iter().any(|sig| &sig.by == *key))
            .count();
        if missing > 0 {
            return Err(CommitError::Rejected {
                reason: format!("missing {missing} required signature(s)"),
            });
        }

        Ok(())
    }
}
