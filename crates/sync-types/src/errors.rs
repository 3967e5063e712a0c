//! # Error Types
//!
//! Errors raised while parsing actions, contexts and envelopes.

use thiserror::Error;

/// Errors shared across the sync crates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// Context string is empty or not a string.
    #[error("Invalid context: {0:?}")]
    InvalidContext(String),

    /// A JSON action did not have the expected `{ type, payload }` shape.
    #[error("Malformed action: {0}")]
    MalformedAction(String),

    /// Envelope could not be encoded or decoded.
    #[error("Envelope serialization failed: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
