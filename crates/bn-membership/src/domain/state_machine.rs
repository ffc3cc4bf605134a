//! Membership lifecycle state machine
//!
//! ```text
//!                 Activate                    Activate (no-op)
//!   [PENDING] ─────────────────→ [ACTIVE] ←──────────┐
//!       │                          │  └──────────────┘
//!       │ Suspend                  │ Suspend
//!       ↓                          ↓
//!   [SUSPENDED] ←──────────────────┘
//!     │    ↑
//!     └────┘ Suspend (no-op)
//! ```
//!
//! Any (status, event) pair not drawn above is an invalid transition. In
//! particular a suspended membership cannot be re-activated through this
//! flow.

use super::record::{MembershipRecord, MembershipStatus};
use super::transaction::Command;
use crate::error::{MembershipError, MembershipResult};
use serde::{Deserialize, Serialize};
use shared_types::ProgressStep;
use std::fmt;

/// Events that drive membership transitions
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MembershipEvent {
    /// Operator admits the member.
    Activate,
    /// Operator excludes the member.
    Suspend,
}

impl MembershipEvent {
    /// Contract command tagging the transaction that applies this event.
    pub fn command(&self) -> Command {
        match self {
            Self::Activate => Command::Activate,
            Self::Suspend => Command::Suspend,
        }
    }

    /// Step reported while the change is being committed.
    pub fn in_progress_step(&self) -> ProgressStep {
        match self {
            Self::Activate => ProgressStep::Activating,
            Self::Suspend => ProgressStep::Suspending,
        }
    }

    /// Step reported once the change is committed.
    pub fn done_step(&self) -> ProgressStep {
        match self {
            Self::Activate => ProgressStep::Activated,
            Self::Suspend => ProgressStep::Suspended,
        }
    }

    /// Step reported when the record is already in the target status.
    pub fn no_op_step(&self) -> ProgressStep {
        match self {
            Self::Activate => ProgressStep::AlreadyActive,
            Self::Suspend => ProgressStep::AlreadySuspended,
        }
    }
}

impl fmt::Display for MembershipEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Activate => "activate",
            Self::Suspend => "suspend",
        })
    }
}

/// Outcome of applying an event to the current record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    /// Commit a new version with this status.
    Transition(MembershipStatus),
    /// Record already has the target status; commit nothing.
    NoOp,
}

/// Decide what `event` does to `record`.
///
/// Pure and deterministic: the same record and event always yield the same
/// decision.
pub fn decide(record: &MembershipRecord, event: MembershipEvent) -> MembershipResult<Decision> {
    use MembershipEvent::*;
    use MembershipStatus::*;

    match (record.status, event) {
        (Pending, Activate) => Ok(Decision::Transition(Active)),
        (Active, Activate) => Ok(Decision::NoOp),

        (Pending, Suspend) | (Active, Suspend) => Ok(Decision::Transition(Suspended)),
        (Suspended, Suspend) => Ok(Decision::NoOp),

        (from, event) => Err(MembershipError::InvalidTransition { from, event }),
    }
}
