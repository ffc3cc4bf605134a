//! Driven Ports (SPI - Outbound Dependencies)
//!
//! Everything the flows need from the outside world. Ports that may suspend
//! on I/O are `async`; identity and time lookups are synchronous.

use crate::domain::{Command, SignedTransaction, StateAndRef, TransactionSignature, WireTransaction};
use crate::error::{ActivationError, CommitError, MembershipResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared_types::{FlowId, Hash, Party, ProgressStep};

/// Authoritative view of membership records.
#[async_trait]
pub trait MembershipRecordStore: Send + Sync {
    /// Current (unconsumed) version of `party`'s membership, if any.
    async fn current_membership(&self, party: &Party) -> MembershipResult<Option<StateAndRef>>;
}

/// Business network configuration.
pub trait NetworkConfigProvider: Send + Sync {
    /// The business network operator.
    fn operator(&self) -> MembershipResult<Party>;

    /// Notary named on every membership transaction.
    fn notary(&self) -> MembershipResult<Party>;
}

/// Identity of the node running the flow.
pub trait IdentityProvider: Send + Sync {
    fn our_identity(&self) -> Party;
}

/// Time source for record timestamps
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Default clock using system time
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Signs transaction ids on behalf of our identity.
#[async_trait]
pub trait TransactionSigner: Send + Sync {
    /// Sign `tx.id()`. Fails with `CommitError::Signing` when no key is
    /// available for the required signer.
    async fn sign(&self, tx: &WireTransaction) -> Result<TransactionSignature, CommitError>;
}

/// Notarises and records a signed transaction.
///
/// Implementations must invalidate every input exactly once across
/// concurrent callers and expose the outputs only if the whole transaction
/// is applied.
#[async_trait]
pub trait FinalityGateway: Send + Sync {
    async fn finalize(&self, tx: SignedTransaction) -> Result<SignedTransaction, CommitError>;
}

/// Receives flow progress and outcomes.
///
/// Reporting is best effort; flows never fail because a sink dropped a
/// notification.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    /// `flow_id` reached `step`.
    async fn step(&self, flow_id: FlowId, step: ProgressStep);

    /// `flow_id` aborted.
    async fn failed(&self, flow_id: FlowId, error: &ActivationError);

    /// A membership change for `party` was committed as `tx_id`.
    async fn committed(&self, party: &Party, command: Command, tx_id: Hash);
}
