//! Window-local UI state. Never replicated.

use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use sync_types::{Action, Context};

pub const SLICE: &str = "ui";

pub const SET_ACTIVE_CONTEXT: &str = "ui/setActiveContext";
pub const SET_METRIC_VISIBILITY: &str = "ui/setMetricVisibility";
pub const LOAD_METRIC_VISIBILITY: &str = "ui/loadMetricVisibility";

/// Switch the context the window renders.
pub fn set_active_context(context: &Context) -> Action {
    Action::personal(SET_ACTIVE_CONTEXT, Value::String(context.as_str().to_string()))
}

/// Show or hide one metric in this window.
pub fn set_metric_visibility(metric_id: impl Into<String>, visible: bool) -> Action {
    Action::personal(
        SET_METRIC_VISIBILITY,
        json!({ "metricId": metric_id.into(), "visible": visible }),
    )
}

/// Replace the whole visibility map, e.g. after reading it back from disk.
pub fn load_metric_visibility(visibility: &BTreeMap<String, bool>) -> Action {
    let map: Map<String, Value> = visibility
        .iter()
        .map(|(id, visible)| (id.clone(), Value::Bool(*visible)))
        .collect();
    Action::personal(LOAD_METRIC_VISIBILITY, Value::Object(map))
}
