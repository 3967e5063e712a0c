//! # Wire Envelope
//!
//! The serializable unit that crosses the relay between windows.
//!
//! ```json
//! { "type": "buckets/addBucket",
//!   "payload": { "data": { "name": "Leads" }, "context": "personal" },
//!   "timestamp": 1718000000000,
//!   "sourceWindow": "main" }
//! ```
//!
//! The broadcast flag is a local dispatch concept and never appears here.
//! `timestamp` and `sourceWindow` are informational: they are not used for
//! ordering, conflict resolution or self-delivery filtering.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::action::ActionType;
use crate::errors::SyncError;
use crate::Timestamp;

/// Opaque identifier of a window (e.g. `"main"`, `"widget"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(String);

impl WindowId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WindowId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Envelope exchanged through the relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireEnvelope {
    /// Copy of the action type.
    #[serde(rename = "type")]
    pub action_type: ActionType,
    /// Domain payload: `{ data, context }` for contextual types, raw data otherwise.
    pub payload: Value,
    /// Producer-side send time.
    pub timestamp: Timestamp,
    /// Producing window.
    pub source_window: WindowId,
}

impl WireEnvelope {
    pub fn new(
        action_type: ActionType,
        payload: Value,
        timestamp: Timestamp,
        source_window: WindowId,
    ) -> Self {
        Self {
            action_type,
            payload,
            timestamp,
            source_window,
        }
    }

    /// Encode as a JSON string for process-boundary transports.
    pub fn to_json(&self) -> Result<String, SyncError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode from a JSON string.
    pub fn from_json(raw: &str) -> Result<Self, SyncError> {
        Ok(serde_json::from_str(raw)?)
    }
}
