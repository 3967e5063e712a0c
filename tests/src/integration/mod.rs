//! Cross-window integration tests.

pub mod convergence;
pub mod delivery;
pub mod runtime;

#[cfg(test)]
pub(crate) mod harness {
    use std::sync::Arc;
    use std::time::Duration;

    use sync_bus::{DeliveryPolicy, InMemoryRelay, RelayHandle};
    use sync_store::{InboundListener, ManualClock, Store};
    use sync_types::WindowId;
    use tokio::task::JoinHandle;
    use tokio::time::timeout;

    pub const NOW: u64 = 1_700_000_000_000;

    /// One window connected to the relay with its listener armed.
    pub struct TestWindow {
        pub store: Store,
        pub handle: RelayHandle,
        pub listener: JoinHandle<()>,
    }

    pub fn open(relay: &InMemoryRelay, id: &str, clock: Arc<ManualClock>) -> TestWindow {
        let (handle, subscription) = relay.connect(WindowId::from(id)).split();
        let store = Store::builder(id)
            .clock(clock)
            .relay(Arc::new(handle.clone()))
            .build();
        let listener = InboundListener::arm(&store, subscription).unwrap();
        TestWindow {
            store,
            handle,
            listener,
        }
    }

    pub fn relay() -> InMemoryRelay {
        InMemoryRelay::with_config(64, DeliveryPolicy::ExcludeSender)
    }

    pub fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(NOW))
    }

    /// Wait until `store` has applied at least `revision` state changes.
    pub async fn settle(store: &Store, revision: u64) {
        let mut revisions = store.subscribe();
        timeout(Duration::from_secs(2), async {
            while *revisions.borrow_and_update() < revision {
                revisions.changed().await.unwrap();
            }
        })
        .await
        .unwrap_or_else(|_| {
            panic!(
                "window {} stuck at revision {}, expected {}",
                store.window(),
                store.revision(),
                revision
            )
        });
    }

    /// Give in-flight envelopes a chance to land.
    pub async fn drain() {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}
