//! # Convergence Over The Relay
//!
//! Replicated dispatches leave the sender untouched and converge every other
//! window onto the same state.

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::super::harness::{clock, drain, open, relay, settle, NOW};
    use sync_store::actions::{buckets, leads, metrics, teams, ui};
    use sync_store::{DispatchOutcome, Entity};
    use sync_types::Context;

    // =========================================================================
    // FAN-OUT
    // =========================================================================

    #[tokio::test]
    async fn test_replicate_reaches_every_other_window() {
        let relay = relay();
        let main = open(&relay, "main", clock());
        let widget = open(&relay, "widget", clock());
        let chat = open(&relay, "chat", clock());

        let outcome = main.store.dispatch(
            buckets::add_bucket(json!({"bucketId": "b1", "bucketName": "Hot"}), "personal")
                .replicate(),
        );
        assert_eq!(outcome, DispatchOutcome::Absorbed);

        settle(&widget.store, 1).await;
        settle(&chat.store, 1).await;

        for store in [&widget.store, &chat.store] {
            let slice = store.buckets(&Context::Personal);
            assert_eq!(slice.entities.len(), 1);
            assert_eq!(slice.entities[0].id(), Some("b1"));
            assert_eq!(slice.entities[0].name, "Hot");
        }
        assert!(main.store.buckets(&Context::Personal).entities.is_empty());
        assert_eq!(main.store.revision(), 0);
    }

    #[tokio::test]
    async fn test_replicas_end_identical() {
        let relay = relay();
        let main = open(&relay, "main", clock());
        let widget = open(&relay, "widget", clock());
        let chat = open(&relay, "chat", clock());
        let team = Context::team("team-7");

        let script = vec![
            buckets::set_buckets(json!([{"id": "b1", "name": "A"}, {"id": "b2", "name": "B"}]), team.clone()),
            buckets::update_bucket(json!({"id": "b2", "name": "B2"}), team.clone()),
            buckets::remove_bucket(json!("b1"), team.clone()),
            leads::add_lead(json!({"id": "l1", "name": "Ada", "bucketId": "b2"}), team.clone()),
            leads::update_lead_field("l1", "phone", json!("555-0101"), team.clone()),
            teams::add_team(json!({"teamId": "team-7", "teamName": "Closers"})),
        ];
        let steps = script.len() as u64;
        for action in script {
            main.store.dispatch(action.replicate());
        }

        settle(&widget.store, steps).await;
        settle(&chat.store, steps).await;

        assert_eq!(widget.store.snapshot(), chat.store.snapshot());
        let buckets = widget.store.buckets(&team);
        assert_eq!(buckets.entities.len(), 1);
        assert_eq!(buckets.entities[0].name, "B2");
        assert_eq!(
            widget.store.leads(&team).entities[0].extra.get("phone"),
            Some(&json!("555-0101"))
        );
        assert_eq!(widget.store.teams().entities[0].name, "Closers");
    }

    #[tokio::test]
    async fn test_metrics_fetch_stamps_receiver_clock() {
        let relay = relay();
        let main_clock = clock();
        let widget_clock = clock();
        let main = open(&relay, "main", main_clock.clone());
        let widget = open(&relay, "widget", widget_clock.clone());
        widget_clock.advance(250);

        main.store.dispatch(
            metrics::set_metrics(
                json!([{"metricId": "m1", "fieldName": "Calls", "objectiveCount": "10"}]),
                "personal",
            )
            .replicate(),
        );
        settle(&widget.store, 1).await;

        let slice = widget.store.metrics(&Context::Personal);
        assert_eq!(slice.last_fetched, Some(NOW + 250));
        assert_eq!(slice.entities[0].objective_count, 10);
        assert_eq!(
            serde_json::to_value(&slice).unwrap(),
            json!({
                "entities": [{"id": "m1", "fieldName": "Calls", "objectiveCount": 10}],
                "loading": false,
                "error": null,
                "lastFetched": NOW + 250
            })
        );
    }

    // =========================================================================
    // WINDOW-LOCAL STATE
    // =========================================================================

    #[tokio::test]
    async fn test_ui_state_stays_local() {
        let relay = relay();
        let main = open(&relay, "main", clock());
        let widget = open(&relay, "widget", clock());

        let outcome = main
            .store
            .dispatch(ui::set_metric_visibility("m1", false).replicate());
        assert_eq!(outcome, DispatchOutcome::Applied);
        main.store
            .dispatch(buckets::set_loading(true, "personal").replicate());

        drain().await;
        assert_eq!(widget.store.revision(), 0);
        assert!(widget.store.snapshot().ui.metric_visibility.is_empty());
        assert_eq!(
            main.store.snapshot().ui.metric_visibility.get("m1"),
            Some(&false)
        );
    }

    #[tokio::test]
    async fn test_contexts_stay_isolated_across_windows() {
        let relay = relay();
        let main = open(&relay, "main", clock());
        let widget = open(&relay, "widget", clock());

        main.store
            .dispatch(buckets::add_bucket(json!({"id": "b1"}), "team-1").replicate());
        settle(&widget.store, 1).await;

        let snapshot = widget.store.snapshot_json();
        assert!(snapshot["buckets"].get("team-1").is_some());
        assert!(snapshot["buckets"].get("personal").is_none());
        assert!(widget.store.buckets(&Context::Personal).entities.is_empty());
    }
}
