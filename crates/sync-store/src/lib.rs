//! # Sync Store - Replicated Window State
//!
//! One store per window. Business slices (buckets, leads, metrics, vaults,
//! teams) look the same in every window through action replication over a
//! relay; UI state stays local.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ Store (window "main")                                        │
//! │                                                              │
//! │  dispatch ─► Logging ─► Broadcast ──┬──► RootState::reduce   │
//! │                            │        │                        │
//! │                            ▼        │                        │
//! │                      RelaySender    │                        │
//! └────────────────────────────┼────────┼────────────────────────┘
//!                              ▼        │
//!                           Relay       │ InboundListener
//!                              │        │ (reconstruct, ApplyLocally)
//!                              └────────┘ in every other window
//! ```
//!
//! ## Modules
//!
//! - `domain`: entities, normalization, slice state, reducers
//! - `actions`: per-slice type strings and action creators
//! - `policy`: replication allow-list
//! - `middleware`: dispatch chain, broadcast middleware
//! - `ports` / `adapters`: relay sender, clock, key-value store
//! - `store`: the window store handle
//! - `inbound`: envelope reconstruction and the listener task
//! - `api`: local ingestion of remote API responses

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod actions;
pub mod adapters;
pub mod api;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod policy;
pub mod ports;
pub mod store;

pub use api::{begin_fetch, ingest_response, ApiResponse, Resource};
pub use domain::{
    Bucket, ContextSlices, Entity, Lead, Metric, RootState, SliceState, StoreError, Team,
    UiState, Vault,
};
pub use inbound::{reconstruct, InboundListener, ReconstructionError};
pub use middleware::{BroadcastMiddleware, Flow, LoggingMiddleware, Middleware};
pub use policy::{PayloadShape, ReplicationPolicy};
pub use ports::{
    DispatchApi, DispatchOutcome, KeyValueStore, ManualClock, RelaySender, SystemTimeSource,
    TimeSource,
};
pub use store::{Store, StoreBuilder, METRIC_VISIBILITY_KEY};
