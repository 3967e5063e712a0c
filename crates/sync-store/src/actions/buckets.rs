//! Bucket slice actions. Contextual.

use serde_json::Value;
use sync_types::{Action, Context};

use super::{with_generated_id, CrudTypes};
use crate::domain::{Bucket, Entity};

pub const SLICE: &str = "buckets";

pub const SET_BUCKETS: &str = "buckets/setBuckets";
pub const ADD_BUCKET: &str = "buckets/addBucket";
pub const UPDATE_BUCKET: &str = "buckets/updateBucket";
pub const REMOVE_BUCKET: &str = "buckets/removeBucket";
pub const SET_LOADING: &str = "buckets/setLoading";
pub const SET_ERROR: &str = "buckets/setError";

pub const TYPES: CrudTypes = CrudTypes {
    set: SET_BUCKETS,
    add: ADD_BUCKET,
    update: UPDATE_BUCKET,
    remove: REMOVE_BUCKET,
    set_loading: SET_LOADING,
    set_error: SET_ERROR,
};

/// Replace the buckets of `context` with `data` (an array).
pub fn set_buckets(data: Value, context: impl Into<Context>) -> Action {
    Action::new(SET_BUCKETS, data, context.into())
}

/// Add one bucket. A UUID `id` is assigned when `data` carries none.
pub fn add_bucket(data: Value, context: impl Into<Context>) -> Action {
    Action::new(ADD_BUCKET, with_generated_id(data, Bucket::ID_KEYS), context.into())
}

pub fn update_bucket(patch: Value, context: impl Into<Context>) -> Action {
    Action::new(UPDATE_BUCKET, patch, context.into())
}

/// Remove by id, or by an object carrying the id.
pub fn remove_bucket(id: Value, context: impl Into<Context>) -> Action {
    Action::new(REMOVE_BUCKET, id, context.into())
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
