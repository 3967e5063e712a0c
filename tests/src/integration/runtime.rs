//! # Runtime Bootstrap
//!
//! The same flows driven through [`overlay_runtime::OverlayRuntime`].

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::super::harness::{settle, NOW};
    use overlay_runtime::{OverlayRuntime, RuntimeConfig, Transport};
    use sync_store::actions::{leads, ui};
    use sync_store::api::{begin_fetch, ingest_response, ApiResponse, Resource};
    use sync_store::ManualClock;
    use sync_types::{Context, WindowId};

    fn runtime(transport: Transport) -> OverlayRuntime {
        let config = RuntimeConfig {
            transport,
            ..RuntimeConfig::default()
        };
        let mut runtime = OverlayRuntime::new(config)
            .unwrap()
            .with_clock(Arc::new(ManualClock::new(NOW)));
        runtime.start().unwrap();
        runtime
    }

    #[tokio::test]
    async fn test_fetch_in_main_is_local_only() {
        let runtime = runtime(Transport::Direct);
        let main = runtime.store(&WindowId::from("main")).unwrap();
        let widget = runtime.store(&WindowId::from("widget")).unwrap();

        begin_fetch(&main, Resource::Leads, &Context::Personal);
        ingest_response(
            &main,
            Resource::Leads,
            &Context::Personal,
            &ApiResponse::new(200, json!({"data": [{"leadId": "l1", "leadName": "Ada"}]})),
        );

        let slice = main.leads(&Context::Personal);
        assert_eq!(slice.entities.len(), 1);
        assert_eq!(slice.last_fetched, Some(NOW));
        assert!(!slice.loading);
        assert_eq!(widget.revision(), 0);
        runtime.shutdown();
    }

    #[tokio::test]
    async fn test_edit_in_widget_replicates_to_main_over_channel() {
        let runtime = runtime(Transport::Channel);
        let main = runtime.store(&WindowId::from("main")).unwrap();
        let widget = runtime.store(&WindowId::from("widget")).unwrap();

        widget.dispatch(leads::add_lead(json!({"id": "l1", "name": "Ada"}), "personal").replicate());
        widget.dispatch(
            leads::update_lead_field("l1", "status", json!("won"), "personal").replicate(),
        );

        settle(&main, 2).await;
        let lead = main.leads(&Context::Personal).entities[0].clone();
        assert_eq!(lead.extra.get("status"), Some(&json!("won")));
        assert_eq!(widget.revision(), 0);
        runtime.shutdown();
    }

    #[tokio::test]
    async fn test_late_window_catches_up_by_fetching() {
        let mut runtime = runtime(Transport::Direct);
        let main = runtime.store(&WindowId::from("main")).unwrap();
        let widget = runtime.store(&WindowId::from("widget")).unwrap();

        main.dispatch(leads::add_lead(json!({"id": "l1"}), "personal").replicate());
        settle(&widget, 1).await;

        let chat = runtime.open_window(WindowId::from("chat")).unwrap();
        assert!(chat.leads(&Context::Personal).entities.is_empty());

        ingest_response(
            &chat,
            Resource::Leads,
            &Context::Personal,
            &ApiResponse::new(200, json!([{"id": "l1"}])),
        );
        assert_eq!(
            chat.leads(&Context::Personal).entities,
            widget.leads(&Context::Personal).entities
        );
        runtime.shutdown();
    }

    #[tokio::test]
    async fn test_windows_keep_their_own_ui() {
        let runtime = runtime(Transport::Direct);
        let main = runtime.store(&WindowId::from("main")).unwrap();
        let widget = runtime.store(&WindowId::from("widget")).unwrap();

        main.dispatch(ui::set_active_context(&Context::team("team-1")));
        widget.dispatch(ui::set_metric_visibility("m1", true));

        assert_eq!(main.snapshot().ui.active_context, Context::team("team-1"));
        assert_eq!(widget.snapshot().ui.active_context, Context::Personal);
        assert!(main.snapshot().ui.metric_visibility.is_empty());
        runtime.shutdown();
    }
}
