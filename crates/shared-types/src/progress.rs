//! # Flow Progress Steps
//!
//! Named lifecycle stages a membership flow passes through. Each flow run
//! is identified by a [`FlowId`]; steps are emitted as events, never stored
//! on a shared tracker, so concurrent runs cannot observe each other's state.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Correlation id of one flow run.
pub type FlowId = Uuid;

/// A named stage of a membership flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProgressStep {
    /// Resolving the party's current membership record.
    LookingForMembershipState,
    /// Handing the resolved record to the self-issue flow.
    ActivatingTheMembershipState,
    /// Confirming this node is the business network operator.
    VerifyingOperator,
    /// Building, signing and committing the activation.
    Activating,
    /// Activation committed.
    Activated,
    /// Record was already active; nothing committed.
    AlreadyActive,
    /// Building, signing and committing the suspension.
    Suspending,
    /// Suspension committed.
    Suspended,
    /// Record was already suspended; nothing committed.
    AlreadySuspended,
}

impl ProgressStep {
    /// Human readable label shown to operators.
    pub fn label(&self) -> &'static str {
        match self {
            Self::LookingForMembershipState => "Looking for party's membership state",
            Self::ActivatingTheMembershipState => "Activating the membership state",
            Self::VerifyingOperator => "Verifying business network operator",
            Self::Activating => "Activating Membership",
            Self::Activated => "Membership Activated",
            Self::AlreadyActive => "Membership is already active",
            Self::Suspending => "Suspending Membership",
            Self::Suspended => "Membership Suspended",
            Self::AlreadySuspended => "Membership is already suspended",
        }
    }

    /// Whether the step ends a flow run.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Activated | Self::AlreadyActive | Self::Suspended | Self::AlreadySuspended
        )
    }
}

impl fmt::Display for ProgressStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
