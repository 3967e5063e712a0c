//! Overlay runtime binary.
//!
//! Opens the configured windows, keeps the relay running until Ctrl+C, then
//! logs the protocol counters and shuts down.

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use overlay_runtime::{OverlayRuntime, RuntimeConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let config = RuntimeConfig::from_env().context("Invalid configuration")?;
    let _telemetry =
        sync_telemetry::init_telemetry(&config.telemetry).context("Failed to initialize telemetry")?;

    let mut runtime = OverlayRuntime::new(config).context("Invalid configuration")?;
    runtime.start()?;

    info!("Overlay relay is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    match sync_telemetry::gather_metrics() {
        Ok(text) => debug!(metrics = %text, "Protocol counters"),
        Err(e) => warn!(error = %e, "Could not gather metrics"),
    }

    runtime.shutdown();
    Ok(())
}
