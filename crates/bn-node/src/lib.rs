//! # BN Node
//!
//! Wires the membership subsystem to an in-memory ledger, the shared event
//! bus and this node's signing identity.
//!
//! ```text
//! NodeConfig ──→ MembershipNode ──┬── InMemoryLedger (store + finality)
//!                                 ├── LocalIdentity  (identity + signer)
//!                                 ├── EventBusProgressSink ──→ InMemoryEventBus
//!                                 └── MembershipService
//! ```

pub mod config;
pub mod container;
pub mod report;

pub use config::{ConfigError, NodeConfig};
pub use container::{MembershipNode, NodeAction, NodeError};
pub use report::{FlowReport, Outcome};
