//! # bn-membership
//!
//! Business network membership lifecycle: operator-only activation and
//! suspension of membership records, committed through a single-writer
//! finality gateway.
//!
//! ## Overview
//!
//! This subsystem provides:
//! - **State machine**: PENDING → ACTIVE, PENDING/ACTIVE → SUSPENDED, with
//!   idempotent no-ops for repeated requests
//! - **Operator guard**: only the business network operator mutates records
//! - **Atomic commit**: consume the current version, produce the next, exactly once
//! - **Progress**: ordered steps per flow run, published as events
//!
//! ## Architecture
//!
//! ```text
//!  MembershipApi ──→ MembershipService ──┬── NetworkConfigProvider (operator, notary)
//!                                        ├── MembershipRecordStore (current version)
//!                                        ├── TransactionSigner     (Ed25519)
//!                                        ├── FinalityGateway       (consume + produce)
//!                                        └── ProgressSink          (shared bus)
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use bn_membership::{MembershipDependencies, MembershipService};
//! use bn_membership::ports::inbound::MembershipApi;
//!
//! let service = MembershipService::new(deps);
//! let committed = service.activate_for(&party).await?;
//! assert!(committed.record.state.is_active());
//! ```

pub mod adapters;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod service;

pub use domain::{
    Command, MembershipEvent, MembershipMetadata, MembershipRecord, MembershipStatus,
    SignedTransaction, StateAndRef, StateRef,
};
pub use error::{ActivationError, CommitError, MembershipError, MembershipResult};
pub use ports::inbound::{CommittedRecord, FlowRequest, MembershipApi};
pub use service::{
    FlowHandle, FlowJoinError, MembershipConfig, MembershipDependencies, MembershipService,
};
