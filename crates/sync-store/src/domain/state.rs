//! Root state of one window and its reducer.
//!
//! Reducers read `payload.data` and `payload.context` only. The broadcast
//! intent never reaches this module.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use sync_types::{Action, Context, Timestamp};

use super::collection::{ContextSlices, SliceState};
use super::entities::{Bucket, Entity, Lead, Metric, Team, Vault};
use super::errors::StoreError;
use super::normalize::identifier_of;
use crate::actions::{buckets, leads, metrics, teams, ui, vaults, CrudOp, CrudTypes};

/// Everything one window's store holds.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RootState {
    pub buckets: ContextSlices<Bucket>,
    pub leads: ContextSlices<Lead>,
    pub metrics: ContextSlices<Metric>,
    pub vaults: SliceState<Vault>,
    pub teams: SliceState<Team>,
    pub ui: UiState,
}

/// Window-local presentation state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UiState {
    pub active_context: Context,
    pub metric_visibility: BTreeMap<String, bool>,
}

impl RootState {
    /// Apply one action. Returns whether anything changed.
    ///
    /// Types of unknown slices are ignored. A known slice with an unknown
    /// operation is an error.
    pub fn reduce(&mut self, action: &Action, now: Timestamp) -> Result<bool, StoreError> {
        let action_type = action.action_type.as_str();
        match action.action_type.slice() {
            buckets::SLICE => reduce_contextual(&mut self.buckets, &buckets::TYPES, action, now),
            leads::SLICE if action_type == leads::UPDATE_LEAD_FIELD => {
                within_context(&mut self.leads, action.context(), |slice| {
                    update_lead_field(slice, action.data())
                })
            }
            leads::SLICE => reduce_contextual(&mut self.leads, &leads::TYPES, action, now),
            metrics::SLICE => reduce_contextual(&mut self.metrics, &metrics::TYPES, action, now),
            vaults::SLICE => reduce_flat(&mut self.vaults, &vaults::TYPES, action, now),
            teams::SLICE => reduce_flat(&mut self.teams, &teams::TYPES, action, now),
            ui::SLICE => self.ui.reduce(action),
            _ => Ok(false),
        }
    }
}

impl UiState {
    fn reduce(&mut self, action: &Action) -> Result<bool, StoreError> {
        let data = action.data();
        match action.action_type.as_str() {
            ui::SET_ACTIVE_CONTEXT => {
                let raw = data.as_str().ok_or_else(|| StoreError::InvalidData {
                    kind: "ui",
                    reason: "active context must be a string".into(),
                })?;
                let context = Context::parse(raw)?;
                let changed = self.active_context != context;
                self.active_context = context;
                Ok(changed)
            }
            ui::SET_METRIC_VISIBILITY => {
                let id = identifier_of(data, &["metricId", "id"]).ok_or(
                    StoreError::MissingIdentifier { kind: "metric" },
                )?;
                let visible = data.get("visible").and_then(Value::as_bool).unwrap_or(true);
                Ok(self.metric_visibility.insert(id, visible) != Some(visible))
            }
            ui::LOAD_METRIC_VISIBILITY => {
                let Value::Object(map) = data else {
                    return Err(StoreError::InvalidData {
                        kind: "ui",
                        reason: "visibility map must be an object".into(),
                    });
                };
                let loaded: BTreeMap<String, bool> = map
                    .iter()
                    .filter_map(|(id, visible)| visible.as_bool().map(|v| (id.clone(), v)))
                    .collect();
                let changed = self.metric_visibility != loaded;
                self.metric_visibility = loaded;
                Ok(changed)
            }
            _ => Err(StoreError::UnhandledAction(action.action_type.clone())),
        }
    }
}

fn apply_op<E: Entity>(
    slice: &mut SliceState<E>,
    op: CrudOp,
    data: &Value,
    now: Timestamp,
) -> Result<bool, StoreError> {
    match op {
        CrudOp::Set => slice.set(data, now),
        CrudOp::Add => slice.add(data),
        CrudOp::Update => slice.update(data),
        CrudOp::Remove => slice.remove(data),
        CrudOp::SetLoading => slice.set_loading(data),
        CrudOp::SetError => slice.set_error(data),
    }
}

fn reduce_contextual<E: Entity>(
    slices: &mut ContextSlices<E>,
    types: &CrudTypes,
    action: &Action,
    now: Timestamp,
) -> Result<bool, StoreError> {
    let op = types
        .op(action.action_type.as_str())
        .ok_or_else(|| StoreError::UnhandledAction(action.action_type.clone()))?;
    within_context(slices, action.context(), |slice| {
        apply_op(slice, op, action.data(), now)
    })
}

/// Run `apply` on the sub-tree of `context`, creating it on first reference.
///
/// Creation alone counts as a change. The context stays referenced even when
/// `apply` rejects the payload; every slice operation validates before it
/// mutates, so the sub-tree is then the canonical empty shape.
fn within_context<E: Entity>(
    slices: &mut ContextSlices<E>,
    context: &Context,
    apply: impl FnOnce(&mut SliceState<E>) -> Result<bool, StoreError>,
) -> Result<bool, StoreError> {
    let (slice, created) = slices.reference(context);
    let changed = apply(slice)?;
    Ok(changed || created)
}

fn reduce_flat<E: Entity>(
    slice: &mut SliceState<E>,
    types: &CrudTypes,
    action: &Action,
    now: Timestamp,
) -> Result<bool, StoreError> {
    let op = types
        .op(action.action_type.as_str())
        .ok_or_else(|| StoreError::UnhandledAction(action.action_type.clone()))?;
    apply_op(slice, op, action.data(), now)
}

fn update_lead_field(slice: &mut SliceState<Lead>, data: &Value) -> Result<bool, StoreError> {
    let id = identifier_of(data, Lead::ID_KEYS).ok_or(StoreError::MissingIdentifier {
        kind: Lead::KIND,
    })?;
    let field = data
        .get("field")
        .and_then(Value::as_str)
        .filter(|field| !field.is_empty())
        .ok_or_else(|| StoreError::InvalidData {
            kind: Lead::KIND,
            reason: "missing `field`".into(),
        })?;
    if Lead::ID_KEYS.contains(&field) {
        return Err(StoreError::InvalidData {
            kind: Lead::KIND,
            reason: "the id cannot be changed through a field update".into(),
        });
    }

    let mut patch = Map::new();
    patch.insert("id".into(), Value::String(id));
    patch.insert(
        field.to_string(),
        data.get("value").cloned().unwrap_or(Value::Null),
    );
    slice.update(&Value::Object(patch))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn personal() -> Context {
        Context::Personal
    }

    #[test]
    fn test_set_metrics_stamps_last_fetched() {
        let mut state = RootState::default();
        let action = metrics::set_metrics(
            json!([{"metricId": "m1", "fieldName": "Calls", "objectiveCount": 5}]),
            personal(),
        );
        assert!(state.reduce(&action, 42).unwrap());

        let slice = state.metrics.snapshot(&personal());
        assert_eq!(slice.last_fetched, Some(42));
        assert_eq!(
            serde_json::to_value(&slice.entities).unwrap(),
            json!([{"id": "m1", "fieldName": "Calls", "objectiveCount": 5}])
        );
    }

    #[test]
    fn test_update_on_missing_context_creates_empty_context() {
        let mut state = RootState::default();
        let team = Context::team("team-9");
        let action = buckets::update_bucket(json!({"id": "b1", "name": "x"}), team.clone());

        assert!(state.reduce(&action, 1).unwrap());
        assert_eq!(state.buckets.get(&team), Some(&SliceState::default()));

        // Referenced already: the missing id is a plain no-op now.
        let action = buckets::remove_bucket(json!("b1"), team.clone());
        assert!(!state.reduce(&action, 1).unwrap());
        assert_eq!(state.buckets.get(&team), Some(&SliceState::default()));
    }

    #[test]
    fn test_lead_field_on_missing_context_creates_empty_context() {
        let mut state = RootState::default();
        let team = Context::team("team-4");
        let action = leads::update_lead_field("l1", "phone", json!("555"), team.clone());

        assert!(state.reduce(&action, 1).unwrap());
        assert_eq!(state.leads.get(&team), Some(&SliceState::default()));
    }

    #[test]
    fn test_first_write_creates_context() {
        let mut state = RootState::default();
        let team = Context::team("team-1");
        state
            .reduce(&buckets::set_loading(true, team.clone()), 1)
            .unwrap();

        let slice = state.buckets.get(&team).unwrap();
        assert!(slice.loading);
        assert!(slice.entities.is_empty());
        assert_eq!(slice.last_fetched, None);
    }

    #[test]
    fn test_rejected_payload_leaves_empty_context() {
        let mut state = RootState::default();
        let result = state.reduce(&buckets::set_buckets(json!(17), "team-1"), 1);
        assert!(result.is_err());
        assert_eq!(
            state.buckets.get(&Context::team("team-1")),
            Some(&SliceState::default())
        );
    }

    #[test]
    fn test_update_lead_field() {
        let mut state = RootState::default();
        state
            .reduce(&leads::add_lead(json!({"leadId": "l1", "name": "Ana"}), personal()), 1)
            .unwrap();

        let action = leads::update_lead_field("l1", "phone", json!("555"), personal());
        assert!(state.reduce(&action, 2).unwrap());

        let leads = state.leads.entities(&personal());
        assert_eq!(leads[0].extra.get("phone"), Some(&json!("555")));
        assert_eq!(leads[0].name, "Ana");
    }

    #[test]
    fn test_update_lead_field_moves_bucket() {
        let mut state = RootState::default();
        state
            .reduce(
                &leads::add_lead(json!({"id": "l1", "bucket_id": "b1"}), personal()),
                1,
            )
            .unwrap();
        let action = leads::update_lead_field("l1", "bucketId", json!("b2"), personal());
        state.reduce(&action, 2).unwrap();

        let leads = state.leads.entities(&personal());
        assert_eq!(leads[0].bucket_id.as_deref(), Some("b2"));
    }

    #[test]
    fn test_flat_slices_ignore_context() {
        let mut state = RootState::default();
        let action = sync_types::Action::new(
            vaults::ADD_VAULT,
            json!({"vaultId": "v1", "name": "Main"}),
            Context::team("team-1"),
        );
        state.reduce(&action, 1).unwrap();
        assert_eq!(state.vaults.entities.len(), 1);
        assert_eq!(state.vaults.entities[0].id(), Some("v1"));
    }

    #[test]
    fn test_unknown_slice_is_ignored() {
        let mut state = RootState::default();
        let before = state.clone();
        let action = sync_types::Action::personal("chat/messageReceived", json!({"text": "hi"}));
        assert!(!state.reduce(&action, 1).unwrap());
        assert_eq!(state, before);
    }

    #[test]
    fn test_unknown_operation_of_known_slice_is_error() {
        let mut state = RootState::default();
        let action = sync_types::Action::personal("buckets/explode", json!(null));
        assert!(matches!(
            state.reduce(&action, 1),
            Err(StoreError::UnhandledAction(_))
        ));
    }

    #[test]
    fn test_ui_state() {
        let mut state = RootState::default();
        state
            .reduce(&ui::set_active_context(&Context::team("t1")), 1)
            .unwrap();
        assert_eq!(state.ui.active_context, Context::team("t1"));

        assert!(state.reduce(&ui::set_metric_visibility("m1", false), 1).unwrap());
        assert!(!state.reduce(&ui::set_metric_visibility("m1", false), 1).unwrap());
        assert_eq!(state.ui.metric_visibility.get("m1"), Some(&false));

        let loaded = BTreeMap::from([("m2".to_string(), true)]);
        state
            .reduce(&ui::load_metric_visibility(&loaded), 1)
            .unwrap();
        assert_eq!(state.ui.metric_visibility, loaded);
    }
}
