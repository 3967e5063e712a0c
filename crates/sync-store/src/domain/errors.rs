//! Store error types.

use sync_types::{ActionType, SyncError};
use thiserror::Error;

/// Errors raised while applying or routing an action in one window.
///
/// None of these reach UI callers as panics: the store logs them and leaves
/// state untouched.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StoreError {
    /// Payload data has the wrong JSON shape for the reducer.
    #[error("Invalid {kind} data: {reason}")]
    InvalidData { kind: &'static str, reason: String },

    /// Update or remove without any recognized id key.
    #[error("No identifier found for {kind}")]
    MissingIdentifier { kind: &'static str },

    /// A type with a known slice prefix but no reducer.
    #[error("No reducer handles {0}")]
    UnhandledAction(ActionType),

    /// The inbound listener was already armed for this store.
    #[error("Inbound listener already armed for window {0}")]
    ListenerAlreadyArmed(String),

    /// The per-window key-value store failed.
    #[error("Persistence failed: {0}")]
    Persistence(String),

    #[error(transparent)]
    Sync(#[from] SyncError),
}
