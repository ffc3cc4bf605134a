//! # Adapters Layer (Hexagonal Architecture)
//!
//! Local implementations of every outbound port, so the subsystem runs
//! self-contained.

mod clock;
mod identity;
mod ledger;
mod network_config;
mod progress;

pub use clock::ManualClock;
pub use identity::LocalIdentity;
pub use ledger::InMemoryLedger;
pub use network_config::StaticNetworkConfig;
pub use progress::{EventBusProgressSink, RecordedCommit, RecordingProgressSink};
