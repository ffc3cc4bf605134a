//! Domain module for the Membership subsystem
//!
//! ## Core Modules
//! - record: immutable membership versions and their ledger references
//! - state_machine: PENDING / ACTIVE / SUSPENDED transitions
//! - authorization: operator-only guard
//! - transaction: change-sets, ids and signatures

pub mod authorization;
pub mod record;
pub mod state_machine;
pub mod transaction;

pub use authorization::authorize_operator;
pub use record::{MembershipMetadata, MembershipRecord, MembershipStatus, StateAndRef, StateRef};
pub use state_machine::{decide, Decision, MembershipEvent};
pub use transaction::{
    Command, SignedTransaction, TransactionBuilder, TransactionSignature, WireTransaction,
    TX_ID_DOMAIN,
};
