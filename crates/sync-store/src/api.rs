//! Remote API response ingestion.
//!
//! HTTP clients live outside this crate. They hand over a normalized
//! [`ApiResponse`], which is applied to the local window only. Fetch results
//! are never broadcast: every window fetches for itself.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sync_types::{Action, Context};
use tracing::debug;

use crate::actions::{buckets, leads, metrics, teams, vaults, CrudTypes};
use crate::ports::{DispatchApi, DispatchOutcome};

/// Shape every remote API call resolves to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status_code: u16,
    #[serde(default)]
    pub content: Value,
}

impl ApiResponse {
    pub fn new(status_code: u16, content: Value) -> Self {
        Self {
            status_code,
            content,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// Entity list carried by a successful response.
    ///
    /// Accepts a bare array, or an object whose `data` or `items` field is an
    /// array. Any other object is taken as a single entity.
    #[must_use]
    pub fn entities(&self) -> Value {
        match &self.content {
            Value::Object(fields) => ["data", "items"]
                .iter()
                .find_map(|key| fields.get(*key).filter(|v| v.is_array()))
                .cloned()
                .unwrap_or_else(|| self.content.clone()),
            other => other.clone(),
        }
    }

    /// Human-readable failure message.
    #[must_use]
    pub fn error_message(&self) -> String {
        let from_content = match &self.content {
            Value::String(message) if !message.is_empty() => Some(message.clone()),
            Value::Object(fields) => ["message", "error", "detail"]
                .iter()
                .find_map(|key| fields.get(*key).and_then(Value::as_str))
                .map(str::to_string),
            _ => None,
        };
        from_content.unwrap_or_else(|| format!("Request failed with status {}", self.status_code))
    }
}

/// Remote resource a response belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Buckets,
    Leads,
    Metrics,
    Vaults,
    Teams,
}

impl Resource {
    fn types(self) -> CrudTypes {
        match self {
            Self::Buckets => buckets::TYPES,
            Self::Leads => leads::TYPES,
            Self::Metrics => metrics::TYPES,
            Self::Vaults => vaults::TYPES,
            Self::Teams => teams::TYPES,
        }
    }

    /// Whether state for this resource is kept per context.
    #[must_use]
    pub fn is_contextual(self) -> bool {
        matches!(self, Self::Buckets | Self::Leads | Self::Metrics)
    }

    fn scope(self, context: &Context) -> Context {
        if self.is_contextual() {
            context.clone()
        } else {
            Context::Personal
        }
    }
}

/// Mark a fetch as started for `resource` in `context`.
pub fn begin_fetch<D: DispatchApi + ?Sized>(
    target: &D,
    resource: Resource,
    context: &Context,
) -> DispatchOutcome {
    let action = Action::new(
        resource.types().set_loading,
        Value::Bool(true),
        resource.scope(context),
    );
    target.dispatch(action.apply_locally())
}

/// Apply a fetch result locally.
///
/// Success replaces the collection (`set`), failure records the error
/// message (`setError`). Both end the loading state.
pub fn ingest_response<D: DispatchApi + ?Sized>(
    target: &D,
    resource: Resource,
    context: &Context,
    response: &ApiResponse,
) -> DispatchOutcome {
    let types = resource.types();
    let action = if response.is_success() {
        Action::new(types.set, response.entities(), resource.scope(context))
    } else {
        Action::new(
            types.set_error,
            Value::String(response.error_message()),
            resource.scope(context),
        )
    };

    debug!(
        resource = ?resource,
        context = %context,
        status_code = response.status_code,
        action_type = %action.action_type,
        "Ingesting API response"
    );
    target.dispatch(action.apply_locally())
}
