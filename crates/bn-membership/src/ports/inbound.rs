//! Driving Ports (API - Inbound)

use crate::domain::{SignedTransaction, StateAndRef};
use crate::error::{ActivationError, MembershipResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared_types::{FlowId, Hash, Party};

/// One unit of work the service can run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowRequest {
    /// Look up the party's current membership and activate it.
    ActivateFor(Party),
    /// Activate exactly this version, which must still be current.
    SelfIssue(StateAndRef),
    /// Look up the party's current membership and suspend it.
    SuspendFor(Party),
}

/// Outcome of a successful flow run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommittedRecord {
    /// Current version after the flow.
    pub record: StateAndRef,
    /// Transaction that produced `record`; `None` when nothing was committed.
    pub transaction: Option<SignedTransaction>,
    pub flow_id: FlowId,
}

impl CommittedRecord {
    /// True when the flow was a no-op.
    pub fn is_unchanged(&self) -> bool {
        self.transaction.is_none()
    }

    pub fn transaction_id(&self) -> Option<Hash> {
        self.transaction.as_ref().map(SignedTransaction::id)
    }
}

/// Primary Membership API
///
/// This is the driving port for the Membership subsystem. Every operation
/// except `current_membership` is operator-only and reports its progress
/// under a fresh flow id.
#[async_trait]
pub trait MembershipApi: Send + Sync {
    /// Run `request` under a caller-chosen flow id.
    ///
    /// Subscribing to progress for `flow_id` before calling guarantees no
    /// step is missed.
    async fn execute(
        &self,
        flow_id: FlowId,
        request: FlowRequest,
    ) -> Result<CommittedRecord, ActivationError>;

    /// Activate the current membership of `party`.
    ///
    /// An already-active membership is returned unchanged, not as an error.
    async fn activate_for(&self, party: &Party) -> Result<CommittedRecord, ActivationError>;

    /// Activate a specific membership version.
    ///
    /// Fails with `StaleVersion` if `version` has been superseded.
    async fn self_issue(&self, version: StateAndRef) -> Result<CommittedRecord, ActivationError>;

    /// Suspend the current membership of `party`.
    async fn suspend_for(&self, party: &Party) -> Result<CommittedRecord, ActivationError>;

    /// Read-only lookup of the current version.
    async fn current_membership(&self, party: &Party) -> MembershipResult<Option<StateAndRef>>;
}
