//! Prometheus metrics for the replication protocol.
//!
//! All metrics follow the naming convention: `sync_<thing>_total` and carry
//! an `action_type` label where one is known.

use lazy_static::lazy_static;
use prometheus::{CounterVec, Encoder, Opts, Registry, TextEncoder};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    /// Envelopes handed to the relay by the broadcast middleware
    pub static ref ENVELOPES_SENT: CounterVec = CounterVec::new(
        Opts::new("sync_envelopes_sent_total", "Wire envelopes sent to the relay"),
        &["action_type"]
    ).expect("metric creation failed");

    /// Envelopes received and applied by an inbound listener
    pub static ref ENVELOPES_RECEIVED: CounterVec = CounterVec::new(
        Opts::new("sync_envelopes_received_total", "Wire envelopes reconstructed and dispatched"),
        &["action_type"]
    ).expect("metric creation failed");

    /// Broadcast sends that failed and degraded to local apply
    pub static ref SEND_FAILURES: CounterVec = CounterVec::new(
        Opts::new("sync_broadcast_send_failures_total", "Broadcast sends that failed"),
        &["action_type"]
    ).expect("metric creation failed");

    /// Inbound envelopes dropped because they could not be reconstructed
    pub static ref RECONSTRUCTION_FAILURES: CounterVec = CounterVec::new(
        Opts::new("sync_reconstruction_failures_total", "Inbound envelopes dropped"),
        &["reason"]
    ).expect("metric creation failed");

    /// Dispatches swallowed by middleware
    pub static ref DISPATCHES_ABSORBED: CounterVec = CounterVec::new(
        Opts::new("sync_dispatches_absorbed_total", "Dispatches absorbed before reducers"),
        &["action_type"]
    ).expect("metric creation failed");

    /// Dispatches that reached the reducers
    pub static ref DISPATCHES_APPLIED: CounterVec = CounterVec::new(
        Opts::new("sync_dispatches_applied_total", "Dispatches applied by reducers"),
        &["action_type"]
    ).expect("metric creation failed");
}

/// Handle returned once metrics are registered.
pub struct MetricsHandle {
    _registered: bool,
}

/// Register all metrics with the global registry.
///
/// Registering twice is tolerated: already-registered collectors are skipped.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let collectors: [Box<dyn prometheus::core::Collector>; 6] = [
        Box::new(ENVELOPES_SENT.clone()),
        Box::new(ENVELOPES_RECEIVED.clone()),
        Box::new(SEND_FAILURES.clone()),
        Box::new(RECONSTRUCTION_FAILURES.clone()),
        Box::new(DISPATCHES_ABSORBED.clone()),
        Box::new(DISPATCHES_APPLIED.clone()),
    ];

    for collector in collectors {
        match REGISTRY.register(collector) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle { _registered: true })
}

/// Render all registered metrics in the Prometheus text format.
pub fn gather_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder
        .encode(&REGISTRY.gather(), &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
