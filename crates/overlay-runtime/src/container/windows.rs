//! Per-window bootstrap.

use std::sync::Arc;
use sync_bus::{InMemoryRelay, RelayHandle};
use sync_store::adapters::{spawn_forwarder, ChannelRelaySender, InMemoryKeyValueStore};
use sync_store::{InboundListener, KeyValueStore, RelaySender, Store, StoreError, TimeSource};
use sync_types::WindowId;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::config::Transport;

/// A running window: its store plus the tasks that feed it.
pub struct WindowRuntime {
    store: Store,
    handle: RelayHandle,
    listener: JoinHandle<()>,
    forwarder: Option<JoinHandle<()>>,
}

impl WindowRuntime {
    #[must_use]
    pub fn store(&self) -> &Store {
        &self.store
    }

    #[must_use]
    pub fn window(&self) -> &WindowId {
        self.store.window()
    }

    /// Relay connection id of this window.
    #[must_use]
    pub fn connection(&self) -> sync_bus::ConnectionId {
        self.handle.connection_id()
    }

    /// Stop the inbound listener and the forwarder.
    pub fn close(self) {
        self.listener.abort();
        if let Some(forwarder) = self.forwarder {
            forwarder.abort();
        }
        info!(window_id = %self.store.window(), "Window closed");
    }
}

/// Connect `window` to the relay and arm its store.
///
/// Must run inside a tokio runtime.
pub fn bootstrap_window(
    relay: &InMemoryRelay,
    window: WindowId,
    transport: Transport,
    clock: Arc<dyn TimeSource>,
    kv: Arc<dyn KeyValueStore>,
) -> Result<WindowRuntime, StoreError> {
    let (handle, subscription) = relay.connect(window.clone()).split();

    let (sender, forwarder): (Arc<dyn RelaySender>, _) = match transport {
        Transport::Direct => (Arc::new(handle.clone()), None),
        Transport::Channel => {
            let (sender, rx) = ChannelRelaySender::channel(handle.clone());
            let forwarder = spawn_forwarder(rx, handle.clone());
            (Arc::new(sender), Some(forwarder))
        }
    };

    let store = Store::builder(window)
        .clock(clock)
        .relay(sender)
        .key_value_store(kv)
        .build();

    match store.restore_ui() {
        Ok(true) => info!(window_id = %store.window(), "Restored window-local UI state"),
        Ok(false) => {}
        Err(e) => warn!(window_id = %store.window(), error = %e, "Could not restore UI state"),
    }

    let listener = InboundListener::arm(&store, subscription)?;

    info!(
        window_id = %store.window(),
        connection = handle.connection_id().0,
        transport = ?transport,
        "Window bootstrapped"
    );

    Ok(WindowRuntime {
        store,
        handle,
        listener,
        forwarder,
    })
}

/// Fresh per-window key-value store.
pub(crate) fn window_kv() -> Arc<dyn KeyValueStore> {
    Arc::new(InMemoryKeyValueStore::new())
}
