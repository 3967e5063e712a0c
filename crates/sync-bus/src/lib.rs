//! # Sync Bus - Relay Hub Between Windows
//!
//! The privileged process hosts one [`InMemoryRelay`]. Every window connects
//! to it once and receives a [`RelayConnection`]: an outbound [`RelayHandle`]
//! and an inbound [`Subscription`].
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │ main window  │                    │ widget window│
//! │              │    send()          │              │
//! │              │ ──────┐            │              │
//! └──────────────┘       │            └──────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │    Relay     │          │
//!                  │              │ ─────────┘
//!                  └──────────────┘  recv()
//! ```
//!
//! ## Delivery
//!
//! - FIFO from one producer to one consumer (broadcast channel order).
//! - No global order across producers, no acknowledgement, no retry.
//! - Sender exclusion uses the internal connection id, never the envelope's
//!   `sourceWindow`.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod publisher;
pub mod subscriber;

pub use publisher::{ConnectionId, DeliveryPolicy, InMemoryRelay, RelayConnection, RelayHandle};
pub use subscriber::{EnvelopeStream, Subscription};

use thiserror::Error;

/// Maximum envelopes buffered per window before the slowest one lags.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

/// Errors from relay operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RelayError {
    /// The relay hub was shut down.
    #[error("Relay closed")]
    Closed,

    /// The transport to the relay is gone (host side dropped).
    #[error("Relay transport disconnected: {0}")]
    Disconnected(String),

    /// The envelope could not be encoded for the transport.
    #[error("Envelope encoding failed: {0}")]
    Encoding(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_capacity() {
        assert_eq!(DEFAULT_CHANNEL_CAPACITY, 1000);
    }

    #[test]
    fn test_error_display() {
        assert_eq!(RelayError::Closed.to_string(), "Relay closed");
    }
}
