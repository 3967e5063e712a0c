//! # Inbound Reconstruction
//!
//! Turns envelopes received from the relay back into local actions.
//!
//! | Payload shape | Received payload | Reconstructed |
//! |---------------|------------------|---------------|
//! | contextual | object with `context` | `{ data: payload.data, context: payload.context }` |
//! | contextual | anything else | `{ data: payload, context: "personal" }` |
//! | flat | anything | `{ data: payload }` |
//!
//! The result is always dispatched with `ApplyLocally`, so it is applied
//! exactly once and never forwarded again.

use serde_json::Value;
use sync_bus::Subscription;
use sync_telemetry::{metric_inc, ENVELOPES_RECEIVED, RECONSTRUCTION_FAILURES};
use sync_types::{Action, ActionType, Context, Dispatch, WireEnvelope};
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;
use tracing::{debug, error, info, warn};

use crate::domain::StoreError;
use crate::policy::{PayloadShape, ReplicationPolicy};
use crate::ports::DispatchOutcome;
use crate::store::Store;

/// Why an inbound envelope was dropped.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ReconstructionError {
    /// The type is not on the allow-list; no peer may send it.
    #[error("Unexpected action type: {0}")]
    UnexpectedType(ActionType),

    /// `payload.context` is not a usable context string.
    #[error("Invalid context in payload: {0}")]
    InvalidContext(String),

    /// The raw message is not a wire envelope.
    #[error("Malformed envelope: {0}")]
    Malformed(String),
}

impl ReconstructionError {
    /// Metric label.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::UnexpectedType(_) => "unexpected_type",
            Self::InvalidContext(_) => "invalid_context",
            Self::Malformed(_) => "malformed",
        }
    }
}

/// Rebuild the local dispatch for one received envelope.
pub fn reconstruct(
    envelope: WireEnvelope,
    policy: &ReplicationPolicy,
) -> Result<Dispatch, ReconstructionError> {
    let shape = policy
        .shape_of(&envelope.action_type)
        .ok_or_else(|| ReconstructionError::UnexpectedType(envelope.action_type.clone()))?;

    let (data, context) = match shape {
        PayloadShape::Contextual => unwrap_contextual(envelope.payload)?,
        PayloadShape::Flat => (envelope.payload, Context::Personal),
    };

    Ok(Action::new(envelope.action_type, data, context).apply_locally())
}

fn unwrap_contextual(payload: Value) -> Result<(Value, Context), ReconstructionError> {
    let Value::Object(mut fields) = payload else {
        return Ok((payload, Context::Personal));
    };
    let Some(context) = fields.remove("context") else {
        return Ok((Value::Object(fields), Context::Personal));
    };

    let context = match &context {
        Value::String(raw) => Context::parse(raw)
            .map_err(|_| ReconstructionError::InvalidContext(raw.clone()))?,
        other => return Err(ReconstructionError::InvalidContext(other.to_string())),
    };
    let data = fields.remove("data").unwrap_or(Value::Null);
    Ok((data, context))
}

/// Single inbound listener of one window.
pub struct InboundListener;

impl InboundListener {
    /// Spawn the listener task for `store`, reading from `subscription`.
    ///
    /// Must run inside a tokio runtime. A store accepts one listener for its
    /// whole life; a second call returns [`StoreError::ListenerAlreadyArmed`]
    /// and leaves the first one running. The task ends when the relay shuts
    /// down.
    pub fn arm(store: &Store, subscription: Subscription) -> Result<JoinHandle<()>, StoreError> {
        if !store.claim_listener() {
            warn!(window_id = %store.window(), "Inbound listener already armed, ignoring");
            return Err(StoreError::ListenerAlreadyArmed(store.window().to_string()));
        }

        let store = store.clone();
        info!(window_id = %store.window(), "Inbound listener armed");

        let mut envelopes = subscription.into_stream();
        Ok(tokio::spawn(async move {
            while let Some(envelope) = envelopes.next().await {
                // Failures are logged and counted inside; keep listening.
                let _ = Self::handle_envelope(&store, envelope);
            }
            info!(window_id = %store.window(), "Relay closed, inbound listener stopped");
        }))
    }

    /// Reconstruct one envelope and dispatch it into `store`.
    pub fn handle_envelope(
        store: &Store,
        envelope: WireEnvelope,
    ) -> Result<DispatchOutcome, ReconstructionError> {
        let source = envelope.source_window.clone();
        let action_type = envelope.action_type.clone();

        let dispatch = match reconstruct(envelope, store.policy()) {
            Ok(dispatch) => dispatch,
            Err(e) => {
                report_failure(store, &e);
                return Err(e);
            }
        };

        metric_inc!(ENVELOPES_RECEIVED, &[action_type.as_str()]);
        debug!(
            window_id = %store.window(),
            source_window = %source,
            action_type = %action_type,
            "Applying remote action"
        );
        Ok(store.dispatch(dispatch))
    }

    /// Decode a JSON envelope and handle it.
    pub fn handle_raw(store: &Store, raw: &str) -> Result<DispatchOutcome, ReconstructionError> {
        match WireEnvelope::from_json(raw) {
            Ok(envelope) => Self::handle_envelope(store, envelope),
            Err(e) => {
                let e = ReconstructionError::Malformed(e.to_string());
                report_failure(store, &e);
                Err(e)
            }
        }
    }
}

fn report_failure(store: &Store, e: &ReconstructionError) {
    metric_inc!(RECONSTRUCTION_FAILURES, &[e.reason()]);
    error!(
        window_id = %store.window(),
        reason = e.reason(),
        error = %e,
        "Dropping inbound envelope"
    );
}
