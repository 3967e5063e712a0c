//! Ports layer.
//!
//! - Inbound (driving): what hosts and listeners call on a window store
//! - Outbound (driven): relay send, clock and per-window persistence

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
