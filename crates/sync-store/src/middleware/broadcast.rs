//! Broadcast middleware: turns "replicate this" dispatches into wire
//! envelopes instead of applying them.
//!
//! | Allow-listed | Intent | Result |
//! |--------------|--------|--------|
//! | yes | `Replicate` | envelope sent, `Absorbed` |
//! | yes | `ApplyLocally` / none | `Continue` unchanged |
//! | no | any | `Continue` unchanged |
//!
//! A failed send never drops the mutation: the dispatch continues to the
//! reducers as a local-only action.

use serde_json::{json, Value};
use std::sync::Arc;
use sync_bus::RelayError;
use sync_telemetry::{metric_inc, ENVELOPES_SENT, SEND_FAILURES};
use sync_types::{Action, BroadcastIntent, Dispatch, WindowId, WireEnvelope};
use tracing::{debug, warn};

use super::{Flow, Middleware};
use crate::policy::{PayloadShape, ReplicationPolicy};
use crate::ports::{RelaySender, TimeSource};

pub struct BroadcastMiddleware {
    window: WindowId,
    policy: Arc<ReplicationPolicy>,
    sender: Arc<dyn RelaySender>,
    clock: Arc<dyn TimeSource>,
}

impl BroadcastMiddleware {
    pub fn new(
        window: WindowId,
        policy: Arc<ReplicationPolicy>,
        sender: Arc<dyn RelaySender>,
        clock: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            window,
            policy,
            sender,
            clock,
        }
    }

    /// Wire payload for an action: `{ data, context }` or the bare data.
    fn wire_payload(action: &Action, shape: PayloadShape) -> Value {
        match shape {
            PayloadShape::Contextual => json!({
                "data": action.data(),
                "context": action.context().as_str(),
            }),
            PayloadShape::Flat => action.data().clone(),
        }
    }

    fn forward(&self, action: &Action, shape: PayloadShape) -> Result<(), RelayError> {
        let envelope = WireEnvelope::new(
            action.action_type.clone(),
            Self::wire_payload(action, shape),
            self.clock.now(),
            self.window.clone(),
        );
        self.sender.send(envelope)
    }
}

impl Middleware for BroadcastMiddleware {
    fn name(&self) -> &'static str {
        "broadcast"
    }

    fn handle(&self, dispatch: Dispatch) -> Flow {
        if !dispatch.wants_replication() {
            return Flow::Continue(dispatch);
        }

        let Some(shape) = self.policy.shape_of(dispatch.action_type()) else {
            debug!(
                window_id = %self.window,
                action_type = %dispatch.action_type(),
                "Type not replicated, applying locally"
            );
            return Flow::Continue(dispatch);
        };

        let action_type = dispatch.action_type().as_str().to_string();
        match self.forward(&dispatch.action, shape) {
            Ok(()) => {
                metric_inc!(ENVELOPES_SENT, &[action_type.as_str()]);
                debug!(
                    window_id = %self.window,
                    action_type = %action_type,
                    context = %dispatch.action.context(),
                    "Dispatch absorbed and broadcast"
                );
                Flow::Absorbed
            }
            Err(e) => {
                metric_inc!(SEND_FAILURES, &[action_type.as_str()]);
                warn!(
                    window_id = %self.window,
                    action_type = %action_type,
                    error = %e,
                    "Broadcast failed, applying locally"
                );
                Flow::Continue(Dispatch::new(
                    dispatch.action,
                    Some(BroadcastIntent::ApplyLocally),
                ))
            }
        }
    }
}
