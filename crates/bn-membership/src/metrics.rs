//! # Membership Metrics
//!
//! Prometheus metrics for membership flows.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! bn-membership = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `membership_transitions_total` - Committed transitions (by command)
//! - `membership_noops_total` - Flows that found the target status already set (by event)
//! - `membership_flow_failures_total` - Failed flows (by error kind)
//! - `membership_commit_failures_total` - Commit boundary failures (by reason)
//! - `membership_commit_duration_seconds` - Time from signing to finality acknowledgement

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_histogram, register_int_counter_vec, Histogram, IntCounterVec};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Committed transitions, labeled by command
    pub static ref TRANSITIONS: IntCounterVec = register_int_counter_vec!(
        "membership_transitions_total",
        "Total number of committed membership transitions",
        &["command"]
    )
    .expect("Failed to create TRANSITIONS metric");

    /// No-op flows, labeled by event
    pub static ref NOOPS: IntCounterVec = register_int_counter_vec!(
        "membership_noops_total",
        "Total number of flows that committed nothing",
        &["event"]
    )
    .expect("Failed to create NOOPS metric");

    /// Failed flows, labeled by error kind
    pub static ref FLOW_FAILURES: IntCounterVec = register_int_counter_vec!(
        "membership_flow_failures_total",
        "Total number of failed membership flows",
        &["kind"]
    )
    .expect("Failed to create FLOW_FAILURES metric");

    /// Commit failures, labeled by reason
    pub static ref COMMIT_FAILURES: IntCounterVec = register_int_counter_vec!(
        "membership_commit_failures_total",
        "Total number of commit boundary failures",
        &["reason"]
    )
    .expect("Failed to create COMMIT_FAILURES metric");

    /// Commit round-trip time
    pub static ref COMMIT_DURATION: Histogram = register_histogram!(
        "membership_commit_duration_seconds",
        "Time from signing to finality acknowledgement",
        vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 30.0]
    )
    .expect("Failed to create COMMIT_DURATION metric");
}

// =============================================================================
// METRIC RECORDING FUNCTIONS
// =============================================================================

/// Record a committed transition
#[cfg(feature = "metrics")]
pub fn record_transition(command: &str) {
    TRANSITIONS.with_label_values(&[command]).inc();
}

/// Record a no-op flow
#[cfg(feature = "metrics")]
pub fn record_noop(event: &str) {
    NOOPS.with_label_values(&[event]).inc();
}

/// Record a failed flow
#[cfg(feature = "metrics")]
pub fn record_flow_failure(kind: &str) {
    FLOW_FAILURES.with_label_values(&[kind]).inc();
}

/// Record a commit failure with reason
#[cfg(feature = "metrics")]
pub fn record_commit_failure(reason: &str) {
    COMMIT_FAILURES.with_label_values(&[reason]).inc();
}

/// Record commit round-trip time
#[cfg(feature = "metrics")]
pub fn observe_commit_duration(seconds: f64) {
    COMMIT_DURATION.observe(seconds);
}

// =============================================================================
// NO-OP IMPLEMENTATIONS (when metrics feature disabled)
// =============================================================================

#[cfg(not(feature = "metrics"))]
pub fn record_transition(_command: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_noop(_event: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_flow_failure(_kind: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_commit_failure(_reason: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn observe_commit_duration(_seconds: f64) {}
