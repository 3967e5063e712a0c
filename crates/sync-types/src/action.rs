//! # Actions and Dispatches
//!
//! ## Layers
//!
//! ```text
//! Dispatch { action, intent }      <- middleware only
//!     └── Action { type, payload } <- reducers only
//!             └── ActionPayload { data, context }
//! ```
//!
//! The broadcast flag from the JSON world is tri-state. It maps onto
//! `Dispatch::intent` as follows:
//!
//! | JSON `broadcast` | `intent` |
//! |------------------|----------|
//! | `true` | `Some(BroadcastIntent::Replicate)` |
//! | `false` | `Some(BroadcastIntent::ApplyLocally)` |
//! | absent | `None` |

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::fmt;

use crate::context::Context;
use crate::errors::SyncError;

/// Stable identifier of a mutation kind, e.g. `"buckets/setBuckets"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionType(Cow<'static, str>);

impl ActionType {
    /// Type from a string known at compile time.
    #[must_use]
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Slice prefix before the first `/`, or the whole name if there is none.
    #[must_use]
    pub fn slice(&self) -> &str {
        self.0.split('/').next().unwrap_or_default()
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for ActionType {
    fn from(name: &'static str) -> Self {
        Self::from_static(name)
    }
}

impl From<String> for ActionType {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for ActionType {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for ActionType {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

/// Domain payload of an action. Contains no broadcast flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionPayload {
    /// Domain value; opaque to the protocol.
    pub data: Value,
    /// Target sub-tree. Ignored by flat slices.
    #[serde(default)]
    pub context: Context,
}

impl ActionPayload {
    pub fn new(data: Value, context: Context) -> Self {
        Self { data, context }
    }
}

/// The "apply locally" layer: everything a reducer needs and nothing more.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub action_type: ActionType,
    pub payload: ActionPayload,
}

impl Action {
    pub fn new(action_type: impl Into<ActionType>, data: Value, context: Context) -> Self {
        Self {
            action_type: action_type.into(),
            payload: ActionPayload::new(data, context),
        }
    }

    /// Action in the personal context.
    pub fn personal(action_type: impl Into<ActionType>, data: Value) -> Self {
        Self::new(action_type, data, Context::Personal)
    }

    /// Wrap with the intent to replicate to other windows.
    #[must_use]
    pub fn replicate(self) -> Dispatch {
        Dispatch::new(self, Some(BroadcastIntent::Replicate))
    }

    /// Wrap with the intent to apply in this window only.
    #[must_use]
    pub fn apply_locally(self) -> Dispatch {
        Dispatch::new(self, Some(BroadcastIntent::ApplyLocally))
    }

    #[must_use]
    pub fn context(&self) -> &Context {
        &self.payload.context
    }

    #[must_use]
    pub fn data(&self) -> &Value {
        &self.payload.data
    }
}

/// What the dispatcher wants done with an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BroadcastIntent {
    /// Send outward through the relay; do not apply locally.
    Replicate,
    /// Apply in this window now.
    ApplyLocally,
}

impl From<bool> for BroadcastIntent {
    fn from(broadcast: bool) -> Self {
        if broadcast {
            Self::Replicate
        } else {
            Self::ApplyLocally
        }
    }
}

impl From<BroadcastIntent> for bool {
    fn from(intent: BroadcastIntent) -> Self {
        matches!(intent, BroadcastIntent::Replicate)
    }
}

/// An action plus its optional broadcast intent, as handed to `dispatch`.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    pub action: Action,
    /// `None` means the action is not a replicated action.
    pub intent: Option<BroadcastIntent>,
}

impl Dispatch {
    pub fn new(action: Action, intent: Option<BroadcastIntent>) -> Self {
        Self { action, intent }
    }

    #[must_use]
    pub fn wants_replication(&self) -> bool {
        self.intent == Some(BroadcastIntent::Replicate)
    }

    #[must_use]
    pub fn action_type(&self) -> &ActionType {
        &self.action.action_type
    }

    /// Parse a JSON action of shape `{ type, payload }`.
    ///
    /// When `payload` is an object holding a `data` key it is read as
    /// `{ data, context?, broadcast? }`. Any other payload is taken whole as
    /// the data with the personal context and no intent.
    pub fn from_json_value(value: Value) -> Result<Self, SyncError> {
        let Value::Object(mut object) = value else {
            return Err(SyncError::MalformedAction("action is not an object".into()));
        };

        let action_type = match object.remove("type") {
            Some(Value::String(name)) if !name.is_empty() => ActionType::new(name),
            _ => return Err(SyncError::MalformedAction("missing string `type`".into())),
        };

        let payload = object.remove("payload").unwrap_or(Value::Null);
        let (payload, intent) = split_payload(payload)?;

        Ok(Self::new(
            Action {
                action_type,
                payload,
            },
            intent,
        ))
    }

    /// Render as a JSON action, writing the tri-state flag back into the payload.
    #[must_use]
    pub fn to_json_value(&self) -> Value {
        let mut payload = Map::new();
        payload.insert("data".into(), self.action.payload.data.clone());
        payload.insert(
            "context".into(),
            Value::String(self.action.payload.context.as_str().to_string()),
        );
        if let Some(intent) = self.intent {
            payload.insert("broadcast".into(), Value::Bool(intent.into()));
        }

        let mut object = Map::new();
        object.insert(
            "type".into(),
            Value::String(self.action.action_type.as_str().to_string()),
        );
        object.insert("payload".into(), Value::Object(payload));
        Value::Object(object)
    }
}

impl From<Action> for Dispatch {
    fn from(action: Action) -> Self {
        Self::new(action, None)
    }
}

fn split_payload(payload: Value) -> Result<(ActionPayload, Option<BroadcastIntent>), SyncError> {
    let mut object = match payload {
        Value::Object(object) if object.contains_key("data") => object,
        other => return Ok((ActionPayload::new(other, Context::Personal), None)),
    };

    let data = object.remove("data").unwrap_or(Value::Null);
    let context = match object.remove("context") {
        None | Some(Value::Null) => Context::Personal,
        Some(Value::String(raw)) => Context::parse(&raw)?,
        Some(other) => return Err(SyncError::InvalidContext(other.to_string())),
    };
    let intent = match object.remove("broadcast") {
        None | Some(Value::Null) => None,
        Some(Value::Bool(flag)) => Some(BroadcastIntent::from(flag)),
        Some(other) => {
            return Err(SyncError::MalformedAction(format!(
                "`broadcast` must be a boolean, got {other}"
            )))
        }
    };

    Ok((ActionPayload::new(data, context), intent))
}
