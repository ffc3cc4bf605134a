//! Membership records and version references
//!
//! Records are immutable. A status change produces a new record whose
//! `previous_version` points at the version it supersedes, so each
//! membership is an append-only chain of versions sharing one `linear_id`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_types::{Hash, LinearId, Party};
use std::collections::BTreeMap;
use std::fmt;

/// Opaque key/value metadata attached to a membership.
pub type MembershipMetadata = BTreeMap<String, String>;

/// Lifecycle status of a membership.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MembershipStatus {
    /// Requested, awaiting operator activation.
    Pending,
    /// Full member of the business network.
    Active,
    /// Temporarily excluded by the operator.
    Suspended,
}

impl fmt::Display for MembershipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "PENDING",
            Self::Active => "ACTIVE",
            Self::Suspended => "SUSPENDED",
        })
    }
}

/// Reference to one committed record version: the transaction that
/// produced it and its output position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StateRef {
    pub tx_id: Hash,
    pub index: u32,
}

impl StateRef {
    pub fn new(tx_id: Hash, index: u32) -> Self {
        Self { tx_id, index }
    }
}

impl fmt::Display for StateRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.tx_id[..8] {
            write!(f, "{byte:02x}")?;
        }
        write!(f, "({})", self.index)
    }
}

/// One immutable version of a party's membership.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipRecord {
    /// Counterparty this membership describes.
    pub party: Party,
    pub status: MembershipStatus,
    /// When the lineage was first created.
    pub issued: DateTime<Utc>,
    /// When the status last changed, by the committing authority's clock.
    pub modified: DateTime<Utc>,
    pub linear_id: LinearId,
    pub metadata: MembershipMetadata,
    /// Version this one supersedes; `None` for the first version.
    pub previous_version: Option<StateRef>,
}

impl MembershipRecord {
    /// First version of a new membership, as created by onboarding.
    pub fn pending(party: Party, metadata: MembershipMetadata, now: DateTime<Utc>) -> Self {
        Self {
            party,
            status: MembershipStatus::Pending,
            issued: now,
            modified: now,
            linear_id: LinearId::new(),
            metadata,
            previous_version: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == MembershipStatus::Active
    }

    pub fn is_pending(&self) -> bool {
        self.status == MembershipStatus::Pending
    }

    pub fn is_suspended(&self) -> bool {
        self.status == MembershipStatus::Suspended
    }

    /// Next version of this record with a new status.
    ///
    /// `modified` never moves backwards even if `now` lags the previous
    /// version's timestamp.
    pub fn supersede(
        &self,
        own_ref: StateRef,
        status: MembershipStatus,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            party: self.party.clone(),
            status,
            issued: self.issued,
            modified: now.max(self.modified),
            linear_id: self.linear_id,
            metadata: self.metadata.clone(),
            previous_version: Some(own_ref),
        }
    }
}

/// A record version together with its reference on the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateAndRef {
    pub state: MembershipRecord,
    pub reference: StateRef,
}

impl StateAndRef {
    pub fn new(state: MembershipRecord, reference: StateRef) -> Self {
        Self { state, reference }
    }
}
