//! Key-value store adapters.

use parking_lot::RwLock;
use std::collections::HashMap;

use crate::domain::StoreError;
use crate::ports::KeyValueStore;

/// Process-local key-value store, one per window.
#[derive(Debug, Default)]
pub struct InMemoryKeyValueStore {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl KeyValueStore for InMemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.write().insert(key.to_string(), value);
        Ok(())
    }
}

/// Key-value store that fails every call.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableKeyValueStore;

impl KeyValueStore for UnavailableKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Persistence(format!("cannot read {key}")))
    }

    fn set(&self, key: &str, _value: String) -> Result<(), StoreError> {
        Err(StoreError::Persistence(format!("cannot write {key}")))
    }
}
