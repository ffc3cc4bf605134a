//! Integration tests across crates.

pub mod bus_flows;
pub mod node_wiring;
