//! # Overlay Runtime
//!
//! Stands in for the privileged process of the desktop overlay: owns the
//! relay hub and one replicated store per window.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (from env) and validate it
//! 2. Create the relay hub
//! 3. Bootstrap every configured window (connect, build store, restore UI
//!    flags, arm inbound listener)
//! 4. Signal ready
//!
//! ```text
//!   main window                 relay                  widget window
//!  ┌───────────┐   envelope   ┌───────┐   envelope   ┌───────────┐
//!  │   Store   │ ───────────► │  hub  │ ───────────► │   Store   │
//!  └───────────┘              └───────┘              └───────────┘
//! ```
//!
//! A window opened later does not receive earlier envelopes; it catches up
//! through its own API fetch.

pub mod container;

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use sync_bus::InMemoryRelay;
use sync_store::{Store, SystemTimeSource, TimeSource};
use sync_types::WindowId;
use tracing::info;

use crate::container::windows::window_kv;
pub use crate::container::{bootstrap_window, ConfigError, RuntimeConfig, Transport, WindowRuntime};

/// The relay host and its windows.
pub struct OverlayRuntime {
    config: RuntimeConfig,
    relay: InMemoryRelay,
    windows: BTreeMap<WindowId, WindowRuntime>,
    clock: Arc<dyn TimeSource>,
}

impl OverlayRuntime {
    /// Validate `config` and create the relay. No window is opened yet.
    pub fn new(config: RuntimeConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let relay = InMemoryRelay::with_config(config.relay_capacity, config.delivery);
        Ok(Self {
            config,
            relay,
            windows: BTreeMap::new(),
            clock: Arc::new(SystemTimeSource),
        })
    }

    /// Replace the clock handed to every store opened afterwards.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn TimeSource>) -> Self {
        self.clock = clock;
        self
    }

    /// Open every configured window. Must run inside a tokio runtime.
    pub fn start(&mut self) -> Result<()> {
        info!(
            windows = self.config.window_ids.len(),
            capacity = self.config.relay_capacity,
            delivery = ?self.config.delivery,
            "Starting overlay runtime"
        );

        for window in self.config.window_ids.clone() {
            self.open_window(window)?;
        }

        info!(
            connected = ?self.relay.connected_windows(),
            "All windows bootstrapped"
        );
        Ok(())
    }

    /// Open one more window. Opening an already open window returns its store.
    pub fn open_window(&mut self, window: WindowId) -> Result<Store> {
        if let Some(existing) = self.windows.get(&window) {
            return Ok(existing.store().clone());
        }

        let runtime = bootstrap_window(
            &self.relay,
            window.clone(),
            self.config.transport,
            self.clock.clone(),
            window_kv(),
        )
        .with_context(|| format!("Failed to bootstrap window {window}"))?;

        let store = runtime.store().clone();
        self.windows.insert(window, runtime);
        Ok(store)
    }

    /// Close one window. Returns whether it was open.
    pub fn close_window(&mut self, window: &WindowId) -> bool {
        match self.windows.remove(window) {
            Some(runtime) => {
                runtime.close();
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn store(&self, window: &WindowId) -> Option<Store> {
        self.windows.get(window).map(|runtime| runtime.store().clone())
    }

    #[must_use]
    pub fn windows(&self) -> Vec<WindowId> {
        self.windows.keys().cloned().collect()
    }

    #[must_use]
    pub fn relay(&self) -> &InMemoryRelay {
        &self.relay
    }

    #[must_use]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Close the relay and every window.
    pub fn shutdown(mut self) {
        info!("Initiating shutdown...");
        self.relay.shutdown();
        for (_, runtime) in std::mem::take(&mut self.windows) {
            runtime.close();
        }
        info!(
            envelopes_relayed = self.relay.envelopes_relayed(),
            "Shutdown complete"
        );
    }
}
