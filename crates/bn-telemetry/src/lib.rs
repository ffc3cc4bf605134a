//! # BN Telemetry
//!
//! Logging and metrics setup shared by BN-Membership binaries. Library
//! crates only emit `tracing` events and register Prometheus collectors;
//! this crate installs the subscriber and renders the registry.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bn_telemetry::{init_logging, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     init_logging(&TelemetryConfig::from_env())?;
//!     tracing::info!("node starting");
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `BN_SERVICE_NAME` | `bn-node` | Service name attached to every log line |
//! | `BN_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `BN_CONSOLE_OUTPUT` | `true` | Write logs to stderr |
//! | `BN_JSON_LOGS` | `false` (true in containers) | JSON formatted logs |

mod config;
mod logging;
mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::encode_metrics;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize log subscriber: {0}")]
    SubscriberInit(String),

    #[error("Failed to encode metrics: {0}")]
    MetricsEncode(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}
