//! # Sync Types Crate
//!
//! Types shared by every window store and by the relay hub.
//!
//! ## Design Principles
//!
//! - **Two action layers**: [`Action`] is what reducers apply. [`Dispatch`]
//!   wraps an action with an optional [`BroadcastIntent`] and is consumed only
//!   by middleware. Reducers never see the broadcast flag.
//! - **Explicit context**: contextual payloads always carry a [`Context`]
//!   (`"personal"` or a team id).
//! - **Envelope is the wire unit**: [`WireEnvelope`] is the only thing that
//!   crosses the relay. It never carries the broadcast flag.

pub mod action;
pub mod context;
pub mod envelope;
pub mod errors;

pub use action::{Action, ActionPayload, ActionType, BroadcastIntent, Dispatch};
pub use context::Context;
pub use envelope::{WindowId, WireEnvelope};
pub use errors::SyncError;

/// Milliseconds since the Unix epoch.
pub type Timestamp = u64;
