//! Lead slice actions. Contextual.

use serde_json::{json, Value};
use sync_types::{Action, Context};

use super::{with_generated_id, CrudTypes};
use crate::domain::{Entity, Lead};

pub const SLICE: &str = "leads";

pub const SET_LEADS: &str = "leads/setLeads";
pub const ADD_LEAD: &str = "leads/addLead";
pub const UPDATE_LEAD: &str = "leads/updateLead";
pub const REMOVE_LEAD: &str = "leads/removeLead";
pub const UPDATE_LEAD_FIELD: &str = "leads/updateLeadField";
pub const SET_LOADING: &str = "leads/setLoading";
pub const SET_ERROR: &str = "leads/setError";

pub const TYPES: CrudTypes = CrudTypes {
    set: SET_LEADS,
    add: ADD_LEAD,
    update: UPDATE_LEAD,
    remove: REMOVE_LEAD,
    set_loading: SET_LOADING,
    set_error: SET_ERROR,
};

pub fn set_leads(data: Value, context: impl Into<Context>) -> Action {
    Action::new(SET_LEADS, data, context.into())
}

/// Add one lead. A UUID `id` is assigned when `data` carries none.
pub fn add_lead(data: Value, context: impl Into<Context>) -> Action {
    Action::new(ADD_LEAD, with_generated_id(data, Lead::ID_KEYS), context.into())
}

pub fn update_lead(patch: Value, context: impl Into<Context>) -> Action {
    Action::new(UPDATE_LEAD, patch, context.into())
}

pub fn remove_lead(id: Value, context: impl Into<Context>) -> Action {
    Action::new(REMOVE_LEAD, id, context.into())
}

/// Set a single field of one lead: `{ id, field, value }`.
pub fn update_lead_field(
    id: impl Into<String>,
    field: impl Into<String>,
    value: Value,
    context: impl Into<Context>,
) -> Action {
    Action::new(
        UPDATE_LEAD_FIELD,
        json!({ "id": id.into(), "field": field.into(), "value": value }),
        context.into(),
    )
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
