//! # Relay Publisher
//!
//! The hub side of the relay and the outbound handle each window sends with.

use crate::subscriber::{Registration, Subscription};
use crate::{RelayError, DEFAULT_CHANNEL_CAPACITY};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use sync_types::{WindowId, WireEnvelope};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

/// Internal identifier of one window connection. Distinct from [`WindowId`],
/// which is informational and may repeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub u64);

/// Who receives an envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeliveryPolicy {
    /// Every connected window except the one that sent it.
    #[default]
    ExcludeSender,
    /// Every connected window including the sender.
    IncludeSender,
}

impl DeliveryPolicy {
    /// Parse `exclude-sender` / `include-sender`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "exclude-sender" | "exclude" => Some(Self::ExcludeSender),
            "include-sender" | "include" => Some(Self::IncludeSender),
            _ => None,
        }
    }
}

/// An envelope tagged with the connection that produced it.
#[derive(Debug, Clone)]
pub(crate) struct Relayed {
    pub(crate) origin: ConnectionId,
    pub(crate) envelope: WireEnvelope,
}

/// State shared by the hub and every handle.
pub(crate) struct RelayShared {
    sender: broadcast::Sender<Relayed>,
    /// Flipped once by `shutdown`; every subscription watches it.
    closed: watch::Sender<bool>,
    envelopes_relayed: AtomicU64,
}

impl RelayShared {
    fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }
}

/// Connected windows, shared with every subscription so a drop can unregister
/// without keeping the channel sender alive.
pub(crate) type WindowRegistry = Arc<RwLock<HashMap<ConnectionId, WindowId>>>;

/// In-memory relay hub.
///
/// Uses `tokio::sync::broadcast` for fan-out. Suitable when every window
/// lives in one process or behind an IPC bridge that feeds this hub.
pub struct InMemoryRelay {
    shared: Arc<RelayShared>,
    windows: WindowRegistry,
    policy: DeliveryPolicy,
    next_connection: AtomicU64,
    capacity: usize,
}

impl InMemoryRelay {
    /// Create a relay with default capacity and sender exclusion.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DEFAULT_CHANNEL_CAPACITY, DeliveryPolicy::default())
    }

    /// Create a relay with the given capacity and delivery policy.
    ///
    /// A zero capacity is raised to one.
    #[must_use]
    pub fn with_config(capacity: usize, policy: DeliveryPolicy) -> Self {
        let capacity = capacity.max(1);
        let (sender, _) = broadcast::channel(capacity);
        let (closed, _) = watch::channel(false);
        Self {
            shared: Arc::new(RelayShared {
                sender,
                closed,
                envelopes_relayed: AtomicU64::new(0),
            }),
            windows: Arc::new(RwLock::new(HashMap::new())),
            policy,
            next_connection: AtomicU64::new(1),
            capacity,
        }
    }

    /// Connect a window. The returned connection is the window's only link
    /// to the relay; dropping its subscription disconnects the window.
    #[must_use]
    pub fn connect(&self, window: WindowId) -> RelayConnection {
        let id = ConnectionId(self.next_connection.fetch_add(1, Ordering::Relaxed));
        let receiver = self.shared.sender.subscribe();

        if let Ok(mut windows) = self.windows.write() {
            windows.insert(id, window.clone());
        }
        info!(window_id = %window, connection = id.0, "Window connected to relay");

        RelayConnection {
            handle: RelayHandle {
                id,
                window: window.clone(),
                shared: Arc::clone(&self.shared),
            },
            subscription: Subscription::new(
                receiver,
                id,
                self.policy,
                self.shared.closed.subscribe(),
                Registration::new(Arc::clone(&self.windows), id, window),
            ),
        }
    }

    /// Windows currently connected, in connection order.
    #[must_use]
    pub fn connected_windows(&self) -> Vec<WindowId> {
        let Ok(windows) = self.windows.read() else {
            return Vec::new();
        };
        let mut entries: Vec<_> = windows.iter().collect();
        entries.sort_by_key(|(id, _)| **id);
        entries.into_iter().map(|(_, w)| w.clone()).collect()
    }

    /// Number of live inbound subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.shared.sender.receiver_count()
    }

    /// Total envelopes accepted for fan-out.
    #[must_use]
    pub fn envelopes_relayed(&self) -> u64 {
        self.shared.envelopes_relayed.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn policy(&self) -> DeliveryPolicy {
        self.policy
    }

    /// Stop accepting envelopes and end every subscription.
    ///
    /// Subsequent sends fail with [`RelayError::Closed`]; `recv` returns
    /// `None` and streams end, dropping anything still queued.
    pub fn shutdown(&self) {
        self.shared.closed.send_replace(true);
        info!("Relay shut down");
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.shared.is_closed()
    }
}

impl Default for InMemoryRelay {
    fn default() -> Self {
        Self::new()
    }
}

/// A window's link to the relay.
pub struct RelayConnection {
    pub handle: RelayHandle,
    pub subscription: Subscription,
}

impl RelayConnection {
    #[must_use]
    pub fn split(self) -> (RelayHandle, Subscription) {
        (self.handle, self.subscription)
    }
}

/// Outbound side of a window connection. Cheap to clone.
#[derive(Clone)]
pub struct RelayHandle {
    id: ConnectionId,
    window: WindowId,
    shared: Arc<RelayShared>,
}

impl RelayHandle {
    /// Fire-and-forget fan-out.
    ///
    /// Returns the number of subscriptions the envelope was queued for
    /// (including the sender's own, which filters it out on receipt).
    /// Having no other windows open is not an error.
    pub fn send(&self, envelope: WireEnvelope) -> Result<usize, RelayError> {
        if self.shared.is_closed() {
            warn!(window_id = %self.window, action_type = %envelope.action_type, "Send on closed relay");
            return Err(RelayError::Closed);
        }

        let action_type = envelope.action_type.clone();
        self.shared.envelopes_relayed.fetch_add(1, Ordering::Relaxed);

        match self.shared.sender.send(Relayed {
            origin: self.id,
            envelope,
        }) {
            Ok(receivers) => {
                debug!(
                    window_id = %self.window,
                    action_type = %action_type,
                    receivers,
                    "Envelope relayed"
                );
                Ok(receivers)
            }
            Err(_) => {
                debug!(
                    window_id = %self.window,
                    action_type = %action_type,
                    "Envelope dropped (no windows listening)"
                );
                Ok(0)
            }
        }
    }

    /// Whether the hub was shut down. Senders that queue envelopes before
    /// they reach the hub check this first.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.shared.is_closed()
    }

    #[must_use]
    pub fn connection_id(&self) -> ConnectionId {
        self.id
    }

    #[must_use]
    pub fn window(&self) -> &WindowId {
        &self.window
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sync_types::ActionType;

    fn envelope(source: &str) -> WireEnvelope {
        WireEnvelope::new(
            ActionType::from_static("buckets/addBucket"),
            json!({"data": {"name": "Leads"}, "context": "personal"}),
            1,
            WindowId::new(source),
        )
    }

    #[test]
    fn test_send_alone_is_not_an_error() {
        let relay = InMemoryRelay::new();
        let (handle, sub) = relay.connect(WindowId::new("main")).split();
        drop(sub);

        assert_eq!(handle.send(envelope("main")), Ok(0));
        assert_eq!(relay.envelopes_relayed(), 1);
    }

    #[test]
    fn test_send_counts_subscriptions() {
        let relay = InMemoryRelay::new();
        let main = relay.connect(WindowId::new("main"));
        let _widget = relay.connect(WindowId::new("widget"));

        assert_eq!(main.handle.send(envelope("main")), Ok(2));
        assert_eq!(relay.subscriber_count(), 2);
    }

    #[test]
    fn test_connected_windows_tracks_drops() {
        let relay = InMemoryRelay::new();
        let main = relay.connect(WindowId::new("main"));
        let widget = relay.connect(WindowId::new("widget"));
        assert_eq!(
            relay.connected_windows(),
            vec![WindowId::new("main"), WindowId::new("widget")]
        );

        drop(widget);
        assert_eq!(relay.connected_windows(), vec![WindowId::new("main")]);
        drop(main);
        assert!(relay.connected_windows().is_empty());
    }

    #[test]
    fn test_shutdown_rejects_sends() {
        let relay = InMemoryRelay::new();
        let main = relay.connect(WindowId::new("main"));
        assert!(!main.handle.is_closed());
        relay.shutdown();

        assert!(relay.is_closed());
        assert!(main.handle.is_closed());
        assert_eq!(main.handle.send(envelope("main")), Err(RelayError::Closed));
    }

    #[test]
    fn test_zero_capacity_is_raised() {
        let relay = InMemoryRelay::with_config(0, DeliveryPolicy::IncludeSender);
        assert_eq!(relay.capacity(), 1);
        assert_eq!(relay.policy(), DeliveryPolicy::IncludeSender);
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!(
            DeliveryPolicy::parse("Exclude-Sender"),
            Some(DeliveryPolicy::ExcludeSender)
        );
        assert_eq!(
            DeliveryPolicy::parse("include"),
            Some(DeliveryPolicy::IncludeSender)
        );
        assert_eq!(DeliveryPolicy::parse("everyone"), None);
    }
}
