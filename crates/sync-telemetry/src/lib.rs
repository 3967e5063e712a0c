//! # Sync Telemetry
//!
//! Logging and metrics for the cross-window replication protocol.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sync_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let _guard = init_telemetry(&TelemetryConfig::from_env())?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `OVERLAY_SERVICE_NAME` | `overlay-sync` | Service name attached to logs |
//! | `OVERLAY_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `OVERLAY_JSON_LOGS` | `false` | Emit JSON lines instead of human output |
//! | `OVERLAY_CONSOLE_OUTPUT` | `true` | Write logs to stdout at all |

mod config;
mod logging;
mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{
    gather_metrics, register_metrics, MetricsHandle, DISPATCHES_ABSORBED, DISPATCHES_APPLIED,
    ENVELOPES_RECEIVED, ENVELOPES_SENT, RECONSTRUCTION_FAILURES, SEND_FAILURES,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging and register metrics.
///
/// Returns a guard that must be held for the lifetime of the application.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let metrics = register_metrics()?;
    init_logging(config)?;

    tracing::info!(
        service = %config.service_name,
        json_logs = config.json_logs,
        "Telemetry initialized"
    );

    Ok(TelemetryGuard { _metrics: metrics })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    _metrics: MetricsHandle,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!("Shutting down telemetry...");
    }
}

/// Increment a counter, optionally with label values.
#[macro_export]
macro_rules! metric_inc {
    ($metric:expr) => {
        $metric.inc()
    };
    ($metric:expr, $labels:expr) => {
        $metric.with_label_values($labels).inc()
    };
}
