//! Error types for the Membership subsystem
//!
//! Taxonomy: `NotAuthorized`, `NotFound`, `InvalidTransition` and `Commit`
//! are the flow outcomes callers branch on. An already-active membership is
//! NOT an error and never appears here.

use crate::domain::{MembershipEvent, MembershipStatus, StateRef};
use shared_types::{Hash, ProgressStep};
use thiserror::Error;

/// Failures at the commit boundary (signing, notarisation, ledger append).
///
/// Whatever the variant, the consumed version is still current afterwards,
/// except for `Unresolved` where the outcome is unknown.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommitError {
    /// The signing collaborator could not produce a signature.
    #[error("Signing failed: {reason}")]
    Signing { reason: String },

    /// The input version was already consumed by another transaction.
    #[error("Conflict: input {input} already consumed by transaction {consumed_by}")]
    Conflict { input: StateRef, consumed_by: String },

    /// The finality collaborator could not be reached.
    #[error("Transport failure: {reason}")]
    Transport { reason: String },

    /// The change-set was refused (bad signature, wrong notary, malformed).
    #[error("Transaction rejected: {reason}")]
    Rejected { reason: String },

    /// No acknowledgement arrived in time; the transaction may or may not
    /// have been applied and must not be retried blindly.
    #[error("Commit unresolved for transaction {}: no acknowledgement", hex_id(.tx_id))]
    Unresolved { tx_id: Hash },
}

impl CommitError {
    /// Short label for metrics and logs.
    pub fn reason_label(&self) -> &'static str {
        match self {
            Self::Signing { .. } => "signing",
            Self::Conflict { .. } => "conflict",
            Self::Transport { .. } => "transport",
            Self::Rejected { .. } => "rejected",
            Self::Unresolved { .. } => "unresolved",
        }
    }
}

/// Membership subsystem errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MembershipError {
    /// Caller is not the configured business network operator.
    #[error("Not authorized: {caller} is not the business network operator {operator}")]
    NotAuthorized { caller: String, operator: String },

    /// No current membership record exists for the party.
    #[error("Membership not found for party {party}")]
    NotFound { party: String },

    /// The event has no row in the transition table for the current status.
    #[error("Invalid transition: cannot {event} a {from} membership")]
    InvalidTransition {
        from: MembershipStatus,
        event: MembershipEvent,
    },

    /// The supplied version is not the party's current membership.
    #[error("Stale version: {given} is not the current membership {current}")]
    StaleVersion { given: StateRef, current: StateRef },

    /// Commit boundary failure.
    #[error("Commit failed: {0}")]
    Commit(#[from] CommitError),

    /// Record store lookup failed.
    #[error("Record store error: {reason}")]
    Store { reason: String },

    /// Operator or notary identity could not be resolved.
    #[error("Configuration error: {reason}")]
    Configuration { reason: String },
}

impl MembershipError {
    /// Short label for metrics and logs.
    pub fn kind_label(&self) -> &'static str {
        match self {
            Self::NotAuthorized { .. } => "not_authorized",
            Self::NotFound { .. } => "not_found",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::StaleVersion { .. } => "stale_version",
            Self::Commit(_) => "commit",
            Self::Store { .. } => "store",
            Self::Configuration { .. } => "configuration",
        }
    }
}

/// Result type for membership operations
pub type MembershipResult<T> = Result<T, MembershipError>;

/// A flow failure together with the progress step it happened at.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{step}: {kind}")]
pub struct ActivationError {
    /// Last step reached before failing.
    pub step: ProgressStep,
    /// What went wrong.
    pub kind: MembershipError,
}

impl ActivationError {
    pub fn new(step: ProgressStep, kind: MembershipError) -> Self {
        Self { step, kind }
    }

    pub fn kind(&self) -> &MembershipError {
        &self.kind
    }

    pub fn step(&self) -> ProgressStep {
        self.step
    }

    /// The commit error, if the flow failed at the commit boundary.
    pub fn commit_error(&self) -> Option<&CommitError> {
        match &self.kind {
            MembershipError::Commit(err) => Some(err),
            _ => None,
        }
    }
}

pub(crate) fn hex_id(id: &Hash) -> String {
    id[..8].iter().map(|b| format!("{b:02x}")).collect()
}
