//! Entity collections and context-scoped sub-trees.
//!
//! ## Invariants
//!
//! | Rule | Enforcement |
//! |------|-------------|
//! | Add is idempotent by normalized id | `SliceState::add` |
//! | Update/remove of a missing id is a no-op | `SliceState::update`, `SliceState::remove` |
//! | Contexts are isolated | `ContextSlices` keys one `SliceState` per context |
//! | Contexts are created on first reference, read or write | `ContextSlices::reference` |
//! | Unreferenced contexts read as the canonical empty shape | `ContextSlices::snapshot`, `ContextSlices::entities` |

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use sync_types::{Context, Timestamp};

use super::entities::Entity;
use super::errors::StoreError;
use super::normalize::{identifier_of, into_fields};

/// One collection with its fetch status.
///
/// The canonical empty shape is
/// `{ entities: [], loading: false, error: null, lastFetched: null }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SliceState<E> {
    pub entities: Vec<E>,
    pub loading: bool,
    pub error: Option<String>,
    pub last_fetched: Option<Timestamp>,
}

impl<E> Default for SliceState<E> {
    fn default() -> Self {
        Self {
            entities: Vec::new(),
            loading: false,
            error: None,
            last_fetched: None,
        }
    }
}

impl<E: Entity> SliceState<E> {
    /// Replace all entities.
    ///
    /// Accepts an array of raw entities, a single object, or `null` (clears).
    /// Clears `loading` and `error` and stamps `last_fetched`.
    pub fn set(&mut self, data: &Value, now: Timestamp) -> Result<bool, StoreError> {
        let entities = match data {
            Value::Array(items) => items.iter().cloned().map(E::normalize).collect(),
            Value::Object(_) => vec![E::normalize(data.clone())],
            Value::Null => Vec::new(),
            other => {
                return Err(StoreError::InvalidData {
                    kind: E::KIND,
                    reason: format!("expected an array, got {other}"),
                })
            }
        };

        self.entities = entities;
        self.loading = false;
        self.error = None;
        self.last_fetched = Some(now);
        Ok(true)
    }

    /// Append one entity unless its normalized id is already present.
    ///
    /// Entities without an id are always appended.
    pub fn add(&mut self, data: &Value) -> Result<bool, StoreError> {
        if !data.is_object() {
            return Err(StoreError::InvalidData {
                kind: E::KIND,
                reason: "expected an object".into(),
            });
        }

        let entity = E::normalize(data.clone());
        if let Some(id) = entity.id() {
            if self.find(id).is_some() {
                return Ok(false);
            }
        }
        self.entities.push(entity);
        Ok(true)
    }

    /// Shallow-merge a patch into the entity it identifies.
    pub fn update(&mut self, data: &Value) -> Result<bool, StoreError> {
        if !data.is_object() {
            return Err(StoreError::InvalidData {
                kind: E::KIND,
                reason: "expected an object".into(),
            });
        }
        let Some(id) = identifier_of(data, E::ID_KEYS) else {
            return Err(StoreError::MissingIdentifier { kind: E::KIND });
        };

        let Some(slot) = self.entities.iter_mut().find(|e| e.id() == Some(id.as_str())) else {
            return Ok(false);
        };
        let updated = slot.merged(into_fields(data.clone()));
        if *slot == updated {
            return Ok(false);
        }
        *slot = updated;
        Ok(true)
    }

    /// Remove the entity with the given id.
    ///
    /// `data` is the id itself or an object carrying it.
    pub fn remove(&mut self, data: &Value) -> Result<bool, StoreError> {
        let Some(id) = identifier_of(data, E::ID_KEYS) else {
            return Err(StoreError::MissingIdentifier { kind: E::KIND });
        };
        let before = self.entities.len();
        self.entities.retain(|e| e.id() != Some(id.as_str()));
        Ok(self.entities.len() != before)
    }

    pub fn set_loading(&mut self, data: &Value) -> Result<bool, StoreError> {
        let Some(loading) = data.as_bool() else {
            return Err(StoreError::InvalidData {
                kind: E::KIND,
                reason: "loading flag must be a boolean".into(),
            });
        };
        let changed = self.loading != loading;
        self.loading = loading;
        Ok(changed)
    }

    /// Record an error message (`null` clears it). Always ends loading.
    pub fn set_error(&mut self, data: &Value) -> Result<bool, StoreError> {
        let error = match data {
            Value::Null => None,
            Value::String(message) => Some(message.clone()),
            other => Some(other.to_string()),
        };
        let changed = self.error != error || self.loading;
        self.error = error;
        self.loading = false;
        Ok(changed)
    }

    #[must_use]
    pub fn find(&self, id: &str) -> Option<&E> {
        self.entities.iter().find(|e| e.id() == Some(id))
    }
}

/// Per-context sub-trees of one slice.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ContextSlices<E> {
    contexts: BTreeMap<Context, SliceState<E>>,
}

impl<E> Default for ContextSlices<E> {
    fn default() -> Self {
        Self {
            contexts: BTreeMap::new(),
        }
    }
}

impl<E: Entity> ContextSlices<E> {
    /// Sub-tree of `context`, created with the canonical empty shape on first
    /// reference. The flag is `true` when this call created it.
    pub fn reference(&mut self, context: &Context) -> (&mut SliceState<E>, bool) {
        let created = !self.contexts.contains_key(context);
        (self.contexts.entry(context.clone()).or_default(), created)
    }

    #[must_use]
    pub fn get(&self, context: &Context) -> Option<&SliceState<E>> {
        self.contexts.get(context)
    }

    /// Entities of a context; empty for an unreferenced one.
    #[must_use]
    pub fn entities(&self, context: &Context) -> &[E] {
        self.contexts
            .get(context)
            .map(|slice| slice.entities.as_slice())
            .unwrap_or_default()
    }

    /// Owned view of a context, the canonical empty shape when unreferenced.
    #[must_use]
    pub fn snapshot(&self, context: &Context) -> SliceState<E> {
        self.contexts.get(context).cloned().unwrap_or_default()
    }

    #[must_use]
    pub fn contains(&self, context: &Context) -> bool {
        self.contexts.contains_key(context)
    }

    /// Contexts referenced so far.
    pub fn contexts(&self) -> impl Iterator<Item = &Context> {
        self.contexts.keys()
    }
}
