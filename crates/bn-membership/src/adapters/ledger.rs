//! In-Memory Ledger Adapter
//!
//! Implements both `MembershipRecordStore` and `FinalityGateway`. All
//! versions ever committed are kept; a version is current until a committed
//! transaction consumes it. Consumption is a compare-and-set under a single
//! write lock, so of two transactions spending the same version exactly one
//! is applied. Only transactions signed by the business network operator
//! alone are accepted.

use crate::domain::{
    Command, MembershipMetadata, MembershipRecord, MembershipStatus, SignedTransaction,
    StateAndRef, StateRef,
};
use crate::error::{hex_id, CommitError, MembershipError, MembershipResult};
use crate::ports::outbound::{FinalityGateway, MembershipRecordStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use shared_crypto::Sha3Hasher;
use shared_types::{Hash, LinearId, Party};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Domain tag for ids of onboarding issuances.
const ISSUANCE_DOMAIN: &[u8] = b"bn-membership.issue.v1";

#[derive(Default)]
struct LedgerState {
    /// Every committed version, consumed or not.
    versions: HashMap<StateRef, MembershipRecord>,
    /// Consumed version -> consuming transaction.
    consumed: HashMap<StateRef, Hash>,
    /// Current version per party.
    current: HashMap<Party, StateRef>,
    /// Committed transactions in commit order.
    transactions: Vec<SignedTransaction>,
}

/// Single-notary in-memory ledger.
pub struct InMemoryLedger {
    notary: Party,
    operator: Party,
    state: RwLock<LedgerState>,
}

impl InMemoryLedger {
    /// Create an empty ledger notarised by `notary` for the network run by
    /// `operator`.
    pub fn new(notary: Party, operator: Party) -> Self {
        Self {
            notary,
            operator,
            state: RwLock::new(LedgerState::default()),
        }
    }

    pub fn notary(&self) -> &Party {
        &self.notary
    }

    pub fn operator(&self) -> &Party {
        &self.operator
    }

    /// Record a new PENDING membership, standing in for onboarding.
    ///
    /// Fails with `Store` if the party already has a current membership.
    pub fn issue_pending(
        &self,
        party: Party,
        metadata: MembershipMetadata,
        now: DateTime<Utc>,
    ) -> MembershipResult<StateAndRef> {
        let record = MembershipRecord::pending(party, metadata, now);
        let bytes = bincode::serialize(&record).map_err(|e| MembershipError::Store {
            reason: format!("failed to encode issuance: {e}"),
        })?;
        let mut hasher = Sha3Hasher::with_domain(ISSUANCE_DOMAIN);
        hasher.update(&bytes);
        let reference = StateRef::new(hasher.finalize(), 0);

        let mut state = self.state.write();
        if state.current.contains_key(&record.party) {
            return Err(MembershipError::Store {
                reason: format!("{} already has a membership", record.party),
            });
        }
        state.current.insert(record.party.clone(), reference);
        state.versions.insert(reference, record.clone());

        info!(
            party = %record.party,
            linear_id = %record.linear_id,
            "[bn-membership] 📝 Issued pending membership {}",
            reference
        );
        Ok(StateAndRef::new(record, reference))
    }

    /// Every version of one lineage, oldest first.
    pub fn history(&self, linear_id: &LinearId) -> Vec<StateAndRef> {
        let state = self.state.read();
        let head = state.current.values().copied().find(|reference| {
            state
                .versions
                .get(reference)
                .is_some_and(|record| &record.linear_id == linear_id)
        });

        let mut chain = Vec::new();
        let mut cursor = head;
        while let Some(reference) = cursor {
            let Some(record) = state.versions.get(&reference) else {
                break;
            };
            cursor = record.previous_version;
            chain.push(StateAndRef::new(record.clone(), reference));
        }
        chain.reverse();
        chain
    }

    /// Committed transactions in commit order.
    pub fn transactions(&self) -> Vec<SignedTransaction> {
        self.state.read().transactions.clone()
    }

    pub fn transaction(&self, id: &Hash) -> Option<SignedTransaction> {
        self.state
            .read()
            .transactions
            .iter()
            .find(|tx| &tx.id() == id)
            .cloned()
    }

    /// Number of versions ever committed, including issuances.
    pub fn version_count(&self) -> usize {
        self.state.read().versions.len()
    }

    /// Check the membership contract rules for one transaction.
    fn verify_contract(
        &self,
        tx: &SignedTransaction,
        inputs: &[&MembershipRecord],
    ) -> Result<(), CommitError> {
        let reject = |reason: &str| CommitError::Rejected {
            reason: reason.to_string(),
        };

        let wire = &tx.tx;
        if wire.signers != [self.operator.owning_key] {
            warn!(
                operator = %self.operator,
                signers = wire.signers.len(),
                "[bn-membership] Rejected transaction not signed by the operator alone"
            );
            return Err(reject("membership changes must be signed by the operator only"));
        }
        let ([input], [output]) = (inputs, wire.outputs.as_slice()) else {
            return Err(reject("membership transactions consume one version and produce one"));
        };

        let expected = match wire.command {
            Command::Activate => MembershipStatus::Active,
            Command::Suspend => MembershipStatus::Suspended,
        };
        if output.status != expected {
            return Err(reject("output status does not match command"));
        }
        if output.previous_version != Some(wire.inputs[0]) {
            return Err(reject("output does not supersede its input"));
        }
        if output.party != input.party || output.linear_id != input.linear_id {
            return Err(reject("output changes the membership lineage"));
        }
        if output.modified < input.modified {
            return Err(reject("output modified timestamp moves backwards"));
        }
        Ok(())
    }
}

#[async_trait]
impl MembershipRecordStore for InMemoryLedger {
    async fn current_membership(&self, party: &Party) -> MembershipResult<Option<StateAndRef>> {
        let state = self.state.read();
        Ok(state.current.get(party).and_then(|reference| {
            state
                .versions
                .get(reference)
                .map(|record| StateAndRef::new(record.clone(), *reference))
        }))
    }
}

#[async_trait]
impl FinalityGateway for InMemoryLedger {
    async fn finalize(&self, tx: SignedTransaction) -> Result<SignedTransaction, CommitError> {
        // Zero-trust: re-verify id and signatures before touching state
        tx.verify_required_signatures()?;

        if tx.tx.notary != self.notary {
            warn!(
                expected = %self.notary,
                named = %tx.tx.notary,
                "[bn-membership] Rejected transaction naming a foreign notary"
            );
            return Err(CommitError::Rejected {
                reason: format!(
                    "transaction names notary {}, expected {}",
                    tx.tx.notary, self.notary
                ),
            });
        }

        let tx_id = tx.id();
        let mut state = self.state.write();

        let mut inputs = Vec::with_capacity(tx.tx.inputs.len());
        for input in &tx.tx.inputs {
            if let Some(consumed_by) = state.consumed.get(input) {
                debug!(
                    "[bn-membership] Double-spend of {} (already consumed by {})",
                    input,
                    hex_id(consumed_by)
                );
                return Err(CommitError::Conflict {
                    input: *input,
                    consumed_by: hex_id(consumed_by),
                });
            }
            let record = state.versions.get(input).ok_or_else(|| CommitError::Rejected {
                reason: format!("unknown input {input}"),
            })?;
            inputs.push(record);
        }
        self.verify_contract(&tx, &inputs)?;

        for input in &tx.tx.inputs {
            state.consumed.insert(*input, tx_id);
        }
        for (index, output) in tx.tx.outputs.iter().enumerate() {
            let reference = tx.tx.out_ref(index as u32);
            state.current.insert(output.party.clone(), reference);
            state.versions.insert(reference, output.clone());
        }
        state.transactions.push(tx.clone());

        info!(
            command = %tx.tx.command,
            "[bn-membership] ✅ Finalized transaction {}",
            hex_id(&tx_id)
        );
        Ok(tx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{TransactionBuilder, TransactionSignature};
    use chrono::Duration;
    use shared_crypto::Ed25519KeyPair;

    fn notary() -> Party {
        Party::new("O=Notary,L=Zurich,C=CH", [5u8; 32]).unwrap()
    }

    fn member() -> Party {
        Party::new("O=PartyA,L=London,C=GB", [1u8; 32]).unwrap()
    }

    fn operator_key() -> Ed25519KeyPair {
        Ed25519KeyPair::from_seed([7u8; 32])
    }

    fn ledger() -> InMemoryLedger {
        let operator = Party::new("O=BNO,L=New York,C=US", operator_key().public_key()).unwrap();
        InMemoryLedger::new(notary(), operator)
    }

    fn transition(
        key: &Ed25519KeyPair,
        notary: Party,
        input: &StateAndRef,
        command: Command,
        status: MembershipStatus,
    ) -> SignedTransaction {
        let output = input
            .state
            .supersede(input.reference, status, input.state.modified + Duration::seconds(1));
        let mut builder = TransactionBuilder::new(notary);
        builder
            .add_input_state(input)
            .add_output_state(output)
            .add_command(command, key.public_key());
        let wire = builder.to_wire_transaction().unwrap();
        let signature = TransactionSignature {
            by: key.public_key(),
            signature: key.sign(&wire.id()),
        };
        SignedTransaction::new(wire, signature)
    }

    fn activation(key: &Ed25519KeyPair, input: &StateAndRef) -> SignedTransaction {
        transition(key, notary(), input, Command::Activate, MembershipStatus::Active)
    }

    #[tokio::test]
    async fn test_issue_pending_becomes_current() {
        let ledger = ledger();
        let issued = ledger
            .issue_pending(member(), MembershipMetadata::new(), Utc::now())
            .unwrap();

        let current = ledger.current_membership(&member()).await.unwrap();
        assert_eq!(current, Some(issued.clone()));
        assert_eq!(ledger.history(&issued.state.linear_id), vec![issued]);
    }

    #[test]
    fn test_issue_pending_twice_fails() {
        let ledger = ledger();
        ledger
            .issue_pending(member(), MembershipMetadata::new(), Utc::now())
            .unwrap();
        let second = ledger.issue_pending(member(), MembershipMetadata::new(), Utc::now());
        assert!(matches!(second, Err(MembershipError::Store { .. })));
    }

    #[tokio::test]
    async fn test_finalize_supersedes_current() {
        let ledger = ledger();
        let key = operator_key();
        let issued = ledger
            .issue_pending(member(), MembershipMetadata::new(), Utc::now())
            .unwrap();

        let tx = activation(&key, &issued);
        let committed = ledger.finalize(tx.clone()).await.unwrap();

        let current = ledger.current_membership(&member()).await.unwrap().unwrap();
        assert_eq!(current, committed.out_ref(0).unwrap());
        assert!(current.state.is_active());
        assert_eq!(current.state.previous_version, Some(issued.reference));
        assert_eq!(ledger.transactions().len(), 1);
        assert_eq!(ledger.transaction(&tx.id()), Some(tx));
    }

    #[tokio::test]
    async fn test_double_spend_is_conflict() {
        let ledger = ledger();
        let key = operator_key();
        let issued = ledger
            .issue_pending(member(), MembershipMetadata::new(), Utc::now())
            .unwrap();

        let first = activation(&key, &issued);
        let second = transition(
            &key,
            notary(),
            &issued,
            Command::Suspend,
            MembershipStatus::Suspended,
        );

        ledger.finalize(first.clone()).await.unwrap();
        let err = ledger.finalize(second).await.unwrap_err();
        assert_eq!(
            err,
            CommitError::Conflict {
                input: issued.reference,
                consumed_by: hex_id(&first.id()),
            }
        );
        assert_eq!(ledger.transactions().len(), 1);
    }

    #[tokio::test]
    async fn test_foreign_notary_is_rejected() {
        let ledger = ledger();
        let key = operator_key();
        let issued = ledger
            .issue_pending(member(), MembershipMetadata::new(), Utc::now())
            .unwrap();
        let rogue = Party::new("O=RogueNotary,L=Paris,C=FR", [6u8; 32]).unwrap();

        let tx = transition(&key, rogue, &issued, Command::Activate, MembershipStatus::Active);
        assert!(matches!(
            ledger.finalize(tx).await,
            Err(CommitError::Rejected { .. })
        ));
        let current = ledger.current_membership(&member()).await.unwrap().unwrap();
        assert_eq!(current, issued);
    }

    #[tokio::test]
    async fn test_command_status_mismatch_is_rejected() {
        let ledger = ledger();
        let key = operator_key();
        let issued = ledger
            .issue_pending(member(), MembershipMetadata::new(), Utc::now())
            .unwrap();

        let tx = transition(
            &key,
            notary(),
            &issued,
            Command::Activate,
            MembershipStatus::Suspended,
        );
        let err = ledger.finalize(tx).await.unwrap_err();
        assert_eq!(
            err,
            CommitError::Rejected {
                reason: "output status does not match command".into()
            }
        );
    }

    #[tokio::test]
    async fn test_unknown_input_is_rejected() {
        let ledger = ledger();
        let key = operator_key();
        let record = MembershipRecord::pending(member(), MembershipMetadata::new(), Utc::now());
        let phantom = StateAndRef::new(record, StateRef::new([0xee; 32], 0));

        assert!(matches!(
            ledger.finalize(activation(&key, &phantom)).await,
            Err(CommitError::Rejected { .. })
        ));
    }

    #[tokio::test]
    async fn test_history_walks_previous_versions() {
        let ledger = ledger();
        let key = operator_key();
        let issued = ledger
            .issue_pending(member(), MembershipMetadata::new(), Utc::now())
            .unwrap();

        let activated = ledger
            .finalize(activation(&key, &issued))
            .await
            .unwrap()
            .out_ref(0)
            .unwrap();
        let suspended = ledger
            .finalize(transition(
                &key,
                notary(),
                &activated,
                Command::Suspend,
                MembershipStatus::Suspended,
            ))
            .await
            .unwrap()
            .out_ref(0)
            .unwrap();

        let history = ledger.history(&issued.state.linear_id);
        assert_eq!(history, vec![issued, activated, suspended]);
        assert_eq!(ledger.version_count(), 3);
        assert!(ledger.history(&LinearId::new()).is_empty());
    }

    #[tokio::test]
    async fn test_change_signed_by_other_key_is_rejected() {
        let ledger = ledger();
        let issued = ledger
            .issue_pending(member(), MembershipMetadata::new(), Utc::now())
            .unwrap();

        // Well-formed and correctly signed, but not by the operator
        let rogue = Ed25519KeyPair::generate();
        let err = ledger.finalize(activation(&rogue, &issued)).await.unwrap_err();
        assert_eq!(
            err,
            CommitError::Rejected {
                reason: "membership changes must be signed by the operator only".into()
            }
        );

        let current = ledger.current_membership(&member()).await.unwrap().unwrap();
        assert!(current.state.is_pending());
        assert_eq!(current, issued);
        assert!(ledger.transactions().is_empty());
    }
}
