//! Inbound (driving) port of a window store.

use sync_types::Dispatch;

/// What happened to one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A middleware swallowed it; reducers never ran.
    Absorbed,
    /// Reducers ran and state changed.
    Applied,
    /// Reducers ran and state is unchanged (no-op or rejected payload).
    Unchanged,
}

/// Entry point for actions into one window.
pub trait DispatchApi: Send + Sync {
    fn dispatch(&self, dispatch: Dispatch) -> DispatchOutcome;
}
