//! # Relay Delivery Semantics
//!
//! Ordering per source, sender exclusion, late joiners and relay failure.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::super::harness::{clock, drain, open, relay, settle, TestWindow};
    use sync_bus::{DeliveryPolicy, InMemoryRelay};
    use sync_store::actions::buckets;
    use sync_store::adapters::{spawn_forwarder, ChannelRelaySender};
    use sync_store::{DispatchOutcome, InboundListener, ManualClock, Store, StoreError};
    use sync_types::{Context, WindowId};

    // =========================================================================
    // ORDERING
    // =========================================================================

    #[tokio::test]
    async fn test_per_source_fifo_last_write_wins() {
        let relay = relay();
        let main = open(&relay, "main", clock());
        let widget = open(&relay, "widget", clock());

        main.store
            .dispatch(buckets::add_bucket(json!({"id": "b1", "name": "v0"}), "personal").replicate());
        for version in 1..=20 {
            main.store.dispatch(
                buckets::update_bucket(json!({"id": "b1", "name": format!("v{version}")}), "personal")
                    .replicate(),
            );
        }

        settle(&widget.store, 21).await;
        assert_eq!(widget.store.buckets(&Context::Personal).entities[0].name, "v20");
    }

    #[tokio::test]
    async fn test_two_sources_converge_on_third_window() {
        let relay = relay();
        let main = open(&relay, "main", clock());
        let widget = open(&relay, "widget", clock());
        let chat = open(&relay, "chat", clock());

        main.store
            .dispatch(buckets::add_bucket(json!({"id": "from-main"}), "personal").replicate());
        widget
            .store
            .dispatch(buckets::add_bucket(json!({"id": "from-widget"}), "personal").replicate());

        settle(&chat.store, 2).await;
        settle(&main.store, 1).await;
        settle(&widget.store, 1).await;

        let ids = |store: &Store| {
            let mut ids: Vec<_> = store
                .buckets(&Context::Personal)
                .entities
                .iter()
                .filter_map(|b| b.id.clone())
                .collect();
            ids.sort();
            ids
        };
        assert_eq!(ids(&chat.store), vec!["from-main", "from-widget"]);
        assert_eq!(ids(&main.store), vec!["from-widget"]);
        assert_eq!(ids(&widget.store), vec!["from-main"]);
    }

    // =========================================================================
    // SENDER EXCLUSION
    // =========================================================================

    #[tokio::test]
    async fn test_sender_never_hears_itself() {
        let relay = relay();
        let main = open(&relay, "main", clock());
        let widget = open(&relay, "widget", clock());

        main.store
            .dispatch(buckets::add_bucket(json!({"id": "b1"}), "personal").replicate());
        settle(&widget.store, 1).await;
        drain().await;

        assert_eq!(main.store.revision(), 0);
        assert_eq!(relay.envelopes_relayed(), 1);
    }

    #[tokio::test]
    async fn test_include_sender_echoes_back() {
        let relay = InMemoryRelay::with_config(64, DeliveryPolicy::IncludeSender);
        let main = open(&relay, "main", clock());

        main.store
            .dispatch(buckets::add_bucket(json!({"id": "b1"}), "personal").replicate());

        settle(&main.store, 1).await;
        assert_eq!(main.store.buckets(&Context::Personal).entities.len(), 1);
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    #[tokio::test]
    async fn test_late_window_misses_history() {
        let relay = relay();
        let main = open(&relay, "main", clock());
        let widget = open(&relay, "widget", clock());

        main.store
            .dispatch(buckets::add_bucket(json!({"id": "b1"}), "personal").replicate());
        settle(&widget.store, 1).await;

        let late = open(&relay, "late", clock());
        main.store
            .dispatch(buckets::add_bucket(json!({"id": "b2"}), "personal").replicate());
        settle(&late.store, 1).await;

        let late_ids: Vec<_> = late
            .store
            .buckets(&Context::Personal)
            .entities
            .iter()
            .filter_map(|b| b.id.clone())
            .collect();
        assert_eq!(late_ids, vec!["b2"]);
        assert_eq!(widget.store.buckets(&Context::Personal).entities.len(), 2);
    }

    #[tokio::test]
    async fn test_second_listener_is_refused() {
        let relay = relay();
        let main = open(&relay, "main", clock());
        let (_, spare) = relay.connect(WindowId::from("main")).split();

        let result = InboundListener::arm(&main.store, spare);
        assert!(matches!(result, Err(StoreError::ListenerAlreadyArmed(_))));
        assert!(!main.listener.is_finished());
    }

    #[tokio::test]
    async fn test_closed_relay_degrades_to_local_apply() {
        let relay = relay();
        let main = open(&relay, "main", clock());
        let widget = open(&relay, "widget", clock());
        relay.shutdown();

        let outcome = main
            .store
            .dispatch(buckets::add_bucket(json!({"id": "b1"}), "personal").replicate());

        assert_eq!(outcome, DispatchOutcome::Applied);
        assert_eq!(main.store.buckets(&Context::Personal).entities.len(), 1);
        drain().await;
        assert_eq!(widget.store.revision(), 0);
    }

    // =========================================================================
    // CHANNEL TRANSPORT
    // =========================================================================

    fn open_over_channel(relay: &InMemoryRelay, id: &str) -> TestWindow {
        let (handle, subscription) = relay.connect(WindowId::from(id)).split();
        let (sender, rx) = ChannelRelaySender::channel(handle.clone());
        spawn_forwarder(rx, handle.clone());
        let store = Store::builder(id)
            .clock(Arc::new(ManualClock::new(0)))
            .relay(Arc::new(sender))
            .build();
        let listener = InboundListener::arm(&store, subscription).unwrap();
        TestWindow {
            store,
            handle,
            listener,
        }
    }

    #[tokio::test]
    async fn test_closed_relay_degrades_to_local_apply_over_channel() {
        let relay = relay();
        let main = open_over_channel(&relay, "main");
        let widget = open(&relay, "widget", clock());
        relay.shutdown();

        let outcome = main
            .store
            .dispatch(buckets::add_bucket(json!({"id": "b1"}), "personal").replicate());

        assert_eq!(outcome, DispatchOutcome::Applied);
        assert_eq!(main.store.buckets(&Context::Personal).entities.len(), 1);
        drain().await;
        assert_eq!(widget.store.revision(), 0);
    }

    #[tokio::test]
    async fn test_channel_transport_matches_direct() {
        let relay = relay();
        let main = open_over_channel(&relay, "main");
        let widget = open(&relay, "widget", clock());

        main.store.dispatch(
            buckets::add_bucket(json!({"id": "b1", "name": "Piped"}), "team-3").replicate(),
        );
        main.store
            .dispatch(buckets::update_bucket(json!({"id": "b1", "color": "blue"}), "team-3").replicate());

        settle(&widget.store, 2).await;
        let bucket = widget.store.buckets(&Context::team("team-3")).entities[0].clone();
        assert_eq!(bucket.name, "Piped");
        assert_eq!(bucket.extra.get("color"), Some(&json!("blue")));
        assert_eq!(main.store.revision(), 0);
    }
}
