//! Team slice actions. Flat: no context, the payload is the data itself.

use serde_json::Value;
use sync_types::Action;

use super::{with_generated_id, CrudTypes};
use crate::domain::{Entity, Team};

pub const SLICE: &str = "teams";

pub const SET_TEAMS: &str = "teams/setTeams";
pub const ADD_TEAM: &str = "teams/addTeam";
pub const UPDATE_TEAM: &str = "teams/updateTeam";
pub const REMOVE_TEAM: &str = "teams/removeTeam";
pub const SET_LOADING: &str = "teams/setLoading";
pub const SET_ERROR: &str = "teams/setError";

pub const TYPES: CrudTypes = CrudTypes {
    set: SET_TEAMS,
    add: ADD_TEAM,
    update: UPDATE_TEAM,
    remove: REMOVE_TEAM,
    set_loading: SET_LOADING,
    set_error: SET_ERROR,
};

pub fn set_teams(data: Value) -> Action {
    Action::personal(SET_TEAMS, data)
}

pub fn add_team(data: Value) -> Action {
    Action::personal(ADD_TEAM, with_generated_id(data, Team::ID_KEYS))
}

pub fn update_team(patch: Value) -> Action {
    Action::personal(UPDATE_TEAM, patch)
}

pub fn remove_team(id: Value) -> Action {
    Action::personal(REMOVE_TEAM, id)
}

pub fn set_loading(loading: bool) -> Action {
    Action::personal(SET_LOADING, Value::Bool(loading))
}

pub fn set_error(message: Option<String>) -> Action {
    Action::personal(SET_ERROR, message.map_or(Value::Null, Value::String))
}
