//! # Action Creators
//!
//! One module per slice. Creators take `(data, context)` and return a plain
//! [`Action`](sync_types::Action); callers choose the intent with
//! `.replicate()` or `.apply_locally()`.
//!
//! ```rust,ignore
//! use sync_store::actions::buckets;
//!
//! store.dispatch(buckets::add_bucket(json!({"name": "Leads"}), "personal").replicate());
//! ```

pub mod buckets;
pub mod leads;
pub mod metrics;
pub mod teams;
pub mod ui;
pub mod vaults;

use serde_json::Value;

use crate::domain::normalize::identifier_of;

/// Reducer operation on one entity collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrudOp {
    Set,
    Add,
    Update,
    Remove,
    SetLoading,
    SetError,
}

/// Type strings of one slice's collection operations.
#[derive(Debug, Clone, Copy)]
pub struct CrudTypes {
    pub set: &'static str,
    pub add: &'static str,
    pub update: &'static str,
    pub remove: &'static str,
    pub set_loading: &'static str,
    pub set_error: &'static str,
}

impl CrudTypes {
    /// Map a type string to its operation.
    #[must_use]
    pub fn op(&self, action_type: &str) -> Option<CrudOp> {
        let op = match action_type {
            t if t == self.set => CrudOp::Set,
            t if t == self.add => CrudOp::Add,
            t if t == self.update => CrudOp::Update,
            t if t == self.remove => CrudOp::Remove,
            t if t == self.set_loading => CrudOp::SetLoading,
            t if t == self.set_error => CrudOp::SetError,
            _ => return None,
        };
        Some(op)
    }

    /// The four mutations that must look the same in every window.
    #[must_use]
    pub const fn mutations(&self) -> [&'static str; 4] {
        [self.set, self.add, self.update, self.remove]
    }
}

/// Give an object without any recognized id key a fresh UUID `id`.
///
/// Every window then stores the same id for the entity.
pub(crate) fn with_generated_id(data: Value, id_keys: &[&str]) -> Value {
    if identifier_of(&data, id_keys).is_some() {
        return data;
    }
    let Value::Object(mut fields) = data else {
        return data;
    };
    for key in id_keys {
        fields.remove(*key);
    }
    fields.insert(
        "id".to_string(),
        Value::String(uuid::Uuid::new_v4().to_string()),
    );
    Value::Object(fields)
}
