//! Relay sender adapters.
//!
//! - [`RelayHandle`] sends straight into the in-memory hub.
//! - [`ChannelRelaySender`] encodes envelopes as JSON onto an unbounded
//!   channel, the way a renderer hands a message to the privileged process.
//!   [`spawn_forwarder`] drains that channel into the hub.
//! - [`RecordingRelaySender`] keeps envelopes for assertions.

use parking_lot::Mutex;
use sync_bus::{RelayError, RelayHandle};
use sync_types::WireEnvelope;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::ports::RelaySender;

impl RelaySender for RelayHandle {
    fn send(&self, envelope: WireEnvelope) -> Result<(), RelayError> {
        let delivered = RelayHandle::send(self, envelope)?;
        debug!(window_id = %self.window(), delivered, "Envelope handed to relay");
        Ok(())
    }
}

/// Relay sender across an asynchronous JSON hop.
///
/// Keeps a handle on the hub so a shut-down relay is reported before the
/// envelope is queued; once queued, the sender has given up the mutation.
#[derive(Clone)]
pub struct ChannelRelaySender {
    tx: mpsc::UnboundedSender<String>,
    hub: RelayHandle,
}

impl ChannelRelaySender {
    /// Sender plus the receiving end to hand to [`spawn_forwarder`] together
    /// with the same `hub` handle.
    pub fn channel(hub: RelayHandle) -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx, hub }, rx)
    }
}

impl RelaySender for ChannelRelaySender {
    fn send(&self, envelope: WireEnvelope) -> Result<(), RelayError> {
        if self.hub.is_closed() {
            return Err(RelayError::Closed);
        }
        let encoded = envelope
            .to_json()
            .map_err(|e| RelayError::Encoding(e.to_string()))?;
        self.tx
            .send(encoded)
            .map_err(|_| RelayError::Disconnected("forwarder stopped".into()))
    }
}

/// Drain JSON envelopes from `rx` into the hub through `handle`.
///
/// Undecodable messages are logged and skipped. The task ends when every
/// [`ChannelRelaySender`] is dropped or the hub is closed.
pub fn spawn_forwarder(mut rx: mpsc::UnboundedReceiver<String>, handle: RelayHandle) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(raw) = rx.recv().await {
            let envelope = match WireEnvelope::from_json(&raw) {
                Ok(envelope) => envelope,
                Err(e) => {
                    warn!(window_id = %handle.window(), error = %e, "Dropping undecodable outbound message");
                    continue;
                }
            };
            if let Err(e) = handle.send(envelope) {
                error!(window_id = %handle.window(), error = %e, "Relay rejected envelope, forwarder stopping");
                break;
            }
        }
        debug!(window_id = %handle.window(), "Forwarder finished");
    })
}

/// Relay sender that records envelopes instead of sending them.
#[derive(Debug, Default)]
pub struct RecordingRelaySender {
    sent: Mutex<Vec<WireEnvelope>>,
    fail_with: Mutex<Option<RelayError>>,
}

impl RecordingRelaySender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following send fail with `error`.
    pub fn fail_with(&self, error: RelayError) {
        *self.fail_with.lock() = Some(error);
    }

    /// Envelopes accepted so far.
    pub fn sent(&self) -> Vec<WireEnvelope> {
        self.sent.lock().clone()
    }

    pub fn take(&self) -> Vec<WireEnvelope> {
        std::mem::take(&mut *self.sent.lock())
    }
}

impl RelaySender for RecordingRelaySender {
    fn send(&self, envelope: WireEnvelope) -> Result<(), RelayError> {
        if let Some(error) = self.fail_with.lock().clone() {
            return Err(error);
        }
        self.sent.lock().push(envelope);
        Ok(())
    }
}
