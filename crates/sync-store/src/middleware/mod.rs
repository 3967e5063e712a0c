//! # Dispatch Middleware
//!
//! Every dispatch walks the chain in order before reaching the reducers. A
//! link either passes the dispatch on (possibly rewritten) or absorbs it.
//!
//! ```text
//! dispatch ──► Logging ──► ... ──► Broadcast ──► reducers
//!                                      │
//!                                      └── Absorbed (sent to relay)
//! ```

mod broadcast;

pub use broadcast::BroadcastMiddleware;

use sync_types::{Dispatch, WindowId};
use tracing::debug;

/// Verdict of one middleware link.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    /// Hand this dispatch to the next link.
    Continue(Dispatch),
    /// Stop here; reducers never see the action.
    Absorbed,
}

/// One link of the dispatch chain.
pub trait Middleware: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    fn handle(&self, dispatch: Dispatch) -> Flow;
}

/// Logs every dispatch at debug level and always continues.
#[derive(Debug, Clone)]
pub struct LoggingMiddleware {
    window: WindowId,
}

impl LoggingMiddleware {
    pub fn new(window: WindowId) -> Self {
        Self { window }
    }
}

impl Middleware for LoggingMiddleware {
    fn name(&self) -> &'static str {
        "logging"
    }

    fn handle(&self, dispatch: Dispatch) -> Flow {
        debug!(
            window_id = %self.window,
            action_type = %dispatch.action_type(),
            context = %dispatch.action.context(),
            intent = ?dispatch.intent,
            "Dispatch"
        );
        Flow::Continue(dispatch)
    }
}
