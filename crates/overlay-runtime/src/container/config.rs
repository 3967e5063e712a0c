//! # Runtime Configuration
//!
//! All values have defaults and can be overridden from the environment.
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `OVERLAY_WINDOW_IDS` | `main,widget` | Windows opened at startup |
//! | `OVERLAY_RELAY_CAPACITY` | `1000` | Envelopes buffered per window |
//! | `OVERLAY_DELIVERY` | `exclude-sender` | `exclude-sender` or `include-sender` |
//! | `OVERLAY_TRANSPORT` | `direct` | `direct` or `channel` (JSON hop) |
//!
//! Telemetry variables are read by [`TelemetryConfig::from_env`].

use std::collections::HashSet;
use std::env;
use sync_bus::{DeliveryPolicy, DEFAULT_CHANNEL_CAPACITY};
use sync_telemetry::TelemetryConfig;
use sync_types::WindowId;
use thiserror::Error;

/// How a window's outbound envelopes reach the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transport {
    /// Straight into the in-memory hub.
    #[default]
    Direct,
    /// JSON-encoded over a channel, drained by a forwarding task.
    Channel,
}

impl Transport {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "direct" => Some(Self::Direct),
            "channel" | "ipc" => Some(Self::Channel),
            _ => None,
        }
    }
}

/// Complete runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Windows opened at startup.
    pub window_ids: Vec<WindowId>,
    /// Relay channel capacity.
    pub relay_capacity: usize,
    /// Sender exclusion policy of the relay.
    pub delivery: DeliveryPolicy,
    pub transport: Transport,
    pub telemetry: TelemetryConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            window_ids: vec![WindowId::from("main"), WindowId::from("widget")],
            relay_capacity: DEFAULT_CHANNEL_CAPACITY,
            delivery: DeliveryPolicy::default(),
            transport: Transport::default(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("No windows configured")]
    NoWindows,

    #[error("Window id must not be empty")]
    EmptyWindowId,

    #[error("Window {0} configured twice")]
    DuplicateWindow(String),

    #[error("Relay capacity must be greater than zero")]
    ZeroCapacity,

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

impl RuntimeConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::from_lookup(|key| env::var(key).ok())?;
        config.telemetry = TelemetryConfig::from_env();
        Ok(config)
    }

    /// Load overrides through `lookup`. Unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(ids) = lookup("OVERLAY_WINDOW_IDS") {
            config.window_ids = ids.split(',').map(|id| WindowId::new(id.trim())).collect();
        }

        if let Some(raw) = lookup("OVERLAY_RELAY_CAPACITY") {
            config.relay_capacity = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "OVERLAY_RELAY_CAPACITY",
                value: raw.clone(),
            })?;
        }

        if let Some(raw) = lookup("OVERLAY_DELIVERY") {
            config.delivery = DeliveryPolicy::parse(&raw).ok_or(ConfigError::InvalidValue {
                key: "OVERLAY_DELIVERY",
                value: raw.clone(),
            })?;
        }

        if let Some(raw) = lookup("OVERLAY_TRANSPORT") {
            config.transport = Transport::parse(&raw).ok_or(ConfigError::InvalidValue {
                key: "OVERLAY_TRANSPORT",
                value: raw.clone(),
            })?;
        }

        Ok(config)
    }

    /// Reject configurations the runtime cannot start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_ids.is_empty() {
            return Err(ConfigError::NoWindows);
        }
        if self.relay_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }

        let mut seen = HashSet::new();
        for id in &self.window_ids {
            if id.as_str().is_empty() {
                return Err(ConfigError::EmptyWindowId);
            }
            if !seen.insert(id.as_str()) {
                return Err(ConfigError::DuplicateWindow(id.to_string()));
            }
        }
        Ok(())
    }
}
