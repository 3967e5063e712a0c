//! Metric slice actions. Contextual.

use serde_json::Value;
use sync_types::{Action, Context};

use super::{with_generated_id, CrudTypes};
use crate::domain::{Entity, Metric};

pub const SLICE: &str = "metrics";

pub const SET_METRICS: &str = "metrics/setMetrics";
pub const ADD_METRIC: &str = "metrics/addMetric";
pub const UPDATE_METRIC: &str = "metrics/updateMetric";
pub const REMOVE_METRIC: &str = "metrics/removeMetric";
pub const SET_LOADING: &str = "metrics/setLoading";
pub const SET_ERROR: &str = "metrics/setError";

pub const TYPES: CrudTypes = CrudTypes {
    set: SET_METRICS,
    add: ADD_METRIC,
    update: UPDATE_METRIC,
    remove: REMOVE_METRIC,
    set_loading: SET_LOADING,
    set_error: SET_ERROR,
};

pub fn set_metrics(data: Value, context: impl Into<Context>) -> Action {
    Action::new(SET_METRICS, data, context.into())
}

pub fn add_metric(data: Value, context: impl Into<Context>) -> Action {
    Action::new(ADD_METRIC, with_generated_id(data, Metric::ID_KEYS), context.into())
}

pub fn update_metric(patch: Value, context: impl Into<Context>) -> Action {
    Action::new(UPDATE_METRIC, patch, context.into())
}

pub fn remove_metric(id: Value, context: impl Into<Context>) -> Action {
    Action::new(REMOVE_METRIC, id, context.into())
}

pub fn set_loading(loading: bool, context: impl Into<Context>) -> Action {
    Action::new(SET_LOADING, Value::Bool(loading), context.into())
}

pub fn set_error(message: Option<String>, context: impl Into<Context>) -> Action {
    Action::new(
        SET_ERROR,
        message.map_or(Value::Null, Value::String),
        context.into(),
    )
}
