//! # Window Container
//!
//! Configuration and per-window wiring: each window gets a relay
//! connection, a store whose broadcast middleware sends through that
//! connection, and an inbound listener feeding the store.

pub mod config;
pub mod windows;

pub use config::{ConfigError, RuntimeConfig, Transport};
pub use windows::{bootstrap_window, WindowRuntime};
