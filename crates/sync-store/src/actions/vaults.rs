//! Vault slice actions. Flat: no context, the payload is the data itself.

use serde_json::Value;
use sync_types::Action;

use super::{with_generated_id, CrudTypes};
use crate::domain::{Entity, Vault};

pub const SLICE: &str = "vaults";

pub const SET_VAULTS: &str = "vaults/setVaults";
pub const ADD_VAULT: &str = "vaults/addVault";
pub const UPDATE_VAULT: &str = "vaults/updateVault";
pub const REMOVE_VAULT: &str = "vaults/removeVault";
pub const SET_LOADING: &str = "vaults/setLoading";
pub const SET_ERROR: &str = "vaults/setError";

pub const TYPES: CrudTypes = CrudTypes {
    set: SET_VAULTS,
    add: ADD_VAULT,
    update: UPDATE_VAULT,
    remove: REMOVE_VAULT,
    set_loading: SET_LOADING,
    set_error: SET_ERROR,
};

pub fn set_vaults(data: Value) -> Action {
    Action::personal(SET_VAULTS, data)
}

pub fn add_vault(data: Value) -> Action {
    Action::personal(ADD_VAULT, with_generated_id(data, Vault::ID_KEYS))
}

pub fn update_vault(patch: Value) -> Action {
    Action::personal(UPDATE_VAULT, patch)
}

pub fn remove_vault(id: Value) -> Action {
    Action::personal(REMOVE_VAULT, id)
}

pub fn set_loading(loading: bool) -> Action {
    Action::personal(SET_LOADING, Value::Bool(loading))
}

pub fn set_error(message: Option<String>) -> Action {
    Action::personal(SET_ERROR, message.map_or(Value::Null, Value::String))
}
