//! # Replica Telemetry
//!
//! Logging and metrics for replica execution nodes.
//!
//! ## Components
//!
//! - **Logging**: `tracing-subscriber` registry with an env filter and either
//!   pretty or JSON output
//! - **Metrics**: Prometheus counters and histograms in a process-wide
//!   registry, exported in text format
//!
//! ## Usage
//!
//! ```rust,ignore
//! use replica_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     let _guard = init_telemetry(TelemetryConfig::from_env()).expect("telemetry");
//!     // Replica runs here
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `RP_SERVICE_NAME` | `replica` | Service name attached to logs |
//! | `RP_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `RP_JSON_LOGS` | `false` | Emit JSON instead of pretty logs |
//! | `RP_CONSOLE_OUTPUT` | `true` | Write logs to stdout at all |

#![warn(missing_docs)]

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{encode_metrics, register_metrics, HistogramTimer, MetricsHandle};

use thiserror::Error;

/// Telemetry initialization errors.
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The log filter directive could not be parsed.
    #[error("Invalid log filter: {0}")]
    Filter(String),

    /// A global subscriber was already installed.
    #[error("Failed to install log subscriber: {0}")]
    LoggingInit(String),

    /// A metric could not be registered or encoded.
    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),
}

/// Initialize metrics and logging.
///
/// The returned guard should be held for the lifetime of the process.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let metrics = register_metrics()?;
    init_logging(&config)?;

    tracing::info!(
        service = %config.service_name,
        json_logs = config.json_logs,
        "Telemetry initialized"
    );

    Ok(TelemetryGuard {
        service_name: config.service_name,
        _metrics: metrics,
    })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    service_name: String,
    _metrics: MetricsHandle,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.service_name, "Shutting down telemetry");
    }
}
