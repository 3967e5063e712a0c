//! # Relay Subscriber
//!
//! The inbound side of a window connection.

use crate::publisher::{ConnectionId, DeliveryPolicy, Relayed, WindowRegistry};
use crate::RelayError;
use std::pin::Pin;
use std::task::{Context, Poll};
use sync_types::{WindowId, WireEnvelope};
use tokio::sync::{broadcast, watch};
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::{BroadcastStream, WatchStream};
use tokio_stream::Stream;
use tracing::{debug, warn};

/// Removes the window from the hub's registry when dropped.
pub(crate) struct Registration {
    windows: WindowRegistry,
    id: ConnectionId,
    window: WindowId,
}

impl Registration {
    pub(crate) fn new(windows: WindowRegistry, id: ConnectionId, window: WindowId) -> Self {
        Self {
            windows,
            id,
            window,
        }
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        if let Ok(mut windows) = self.windows.write() {
            windows.remove(&self.id);
        }
        debug!(window_id = %self.window, connection = self.id.0, "Window disconnected from relay");
    }
}

fn accepts(policy: DeliveryPolicy, own: ConnectionId, relayed: &Relayed) -> bool {
    match policy {
        DeliveryPolicy::ExcludeSender => relayed.origin != own,
        DeliveryPolicy::IncludeSender => true,
    }
}

/// A window's inbound envelope feed.
///
/// Ends when the relay shuts down. When dropped, the window is removed from
/// the relay.
pub struct Subscription {
    receiver: broadcast::Receiver<Relayed>,
    own: ConnectionId,
    policy: DeliveryPolicy,
    closed: watch::Receiver<bool>,
    registration: Registration,
}

impl Subscription {
    pub(crate) fn new(
        receiver: broadcast::Receiver<Relayed>,
        own: ConnectionId,
        policy: DeliveryPolicy,
        closed: watch::Receiver<bool>,
        registration: Registration,
    ) -> Self {
        Self {
            receiver,
            own,
            policy,
            closed,
            registration,
        }
    }

    /// Receive the next envelope meant for this window.
    ///
    /// # Returns
    ///
    /// - `Some(envelope)` - The next envelope from another window
    /// - `None` - The relay was shut down or dropped
    pub async fn recv(&mut self) -> Option<WireEnvelope> {
        loop {
            let result = tokio::select! {
                biased;
                _ = self.closed.wait_for(|closed| *closed) => return None,
                result = self.receiver.recv() => result,
            };
            let relayed = match result {
                Ok(r) => r,
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    report_lag(&self.registration.window, count);
                    continue;
                }
            };

            if accepts(self.policy, self.own, &relayed) {
                return Some(relayed.envelope);
            }
        }
    }

    /// Receive without waiting.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(envelope))` - An envelope was ready
    /// - `Ok(None)` - Nothing pending
    /// - `Err(RelayError::Closed)` - The relay was shut down or dropped
    pub fn try_recv(&mut self) -> Result<Option<WireEnvelope>, RelayError> {
        if *self.closed.borrow() {
            return Err(RelayError::Closed);
        }
        loop {
            let relayed = match self.receiver.try_recv() {
                Ok(r) => r,
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Closed) => return Err(RelayError::Closed),
                Err(broadcast::error::TryRecvError::Lagged(count)) => {
                    report_lag(&self.registration.window, count);
                    continue;
                }
            };

            if accepts(self.policy, self.own, &relayed) {
                return Ok(Some(relayed.envelope));
            }
        }
    }

    /// The window this subscription belongs to.
    #[must_use]
    pub fn window(&self) -> &WindowId {
        &self.registration.window
    }

    /// Convert into a [`Stream`] of envelopes.
    #[must_use]
    pub fn into_stream(self) -> EnvelopeStream {
        EnvelopeStream {
            inner: BroadcastStream::new(self.receiver),
            closed: WatchStream::new(self.closed),
            own: self.own,
            policy: self.policy,
            registration: self.registration,
        }
    }
}

/// A window fell behind the relay's buffer; the skipped envelopes are lost
/// for this window, so its replicated state may now diverge.
fn report_lag(window: &WindowId, count: u64) {
    warn!(
        window_id = %window,
        lagged = count,
        "Window lagged behind the relay, envelopes dropped"
    );
}

/// Stream wrapper for a subscription. Ends when the relay shuts down.
pub struct EnvelopeStream {
    inner: BroadcastStream<Relayed>,
    closed: WatchStream<bool>,
    own: ConnectionId,
    policy: DeliveryPolicy,
    registration: Registration,
}

impl EnvelopeStream {
    /// The window this stream belongs to.
    #[must_use]
    pub fn window(&self) -> &WindowId {
        &self.registration.window
    }
}

impl Stream for EnvelopeStream {
    type Item = WireEnvelope;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        // Drain shutdown updates first so a closed relay wins over queued envelopes.
        loop {
            match Pin::new(&mut self.closed).poll_next(cx) {
                Poll::Ready(Some(true)) => return Poll::Ready(None),
                Poll::Ready(Some(false)) => continue,
                Poll::Ready(None) | Poll::Pending => break,
            }
        }

        loop {
            match Pin::new(&mut self.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(relayed))) => {
                    if accepts(self.policy, self.own, &relayed) {
                        return Poll::Ready(Some(relayed.envelope));
                    }
                }
                Poll::Ready(Some(Err(BroadcastStreamRecvError::Lagged(count)))) => {
                    report_lag(&self.registration.window, count);
                }
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
