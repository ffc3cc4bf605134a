//! # BN Test Suite
//!
//! Cross-crate tests that run membership flows end to end.
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── bus_flows.rs     # Service + ledger + event bus
//!     └── node_wiring.rs   # Configured node, reports and JSON output
//! ```
//!
//! ```bash
//! cargo test -p bn-tests integration::
//! ```

pub mod integration;
