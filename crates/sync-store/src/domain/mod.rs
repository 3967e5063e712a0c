//! # Domain Layer
//!
//! Pure state and reducers. No I/O, no clock, no relay.
//!
//! - `normalize`: alias-group field coercion
//! - `entities`: `Bucket`, `Lead`, `Metric`, `Vault`, `Team`
//! - `collection`: `SliceState` and per-context `ContextSlices`
//! - `state`: `RootState` and the root reducer
//! - `errors`: `StoreError`

pub mod collection;
pub mod entities;
pub mod errors;
pub mod normalize;
pub mod state;

pub use collection::{ContextSlices, SliceState};
pub use entities::{Bucket, Entity, Lead, Metric, Team, Vault};
pub use errors::StoreError;
pub use state::{RootState, UiState};
