//! The flat key-value device store the review cache is persisted into.
//!
//! Only two operations are consumed: [`KeyValueStore::get`] and
//! [`KeyValueStore::set`]. Values are UTF-8 strings (serialized JSON).

use std::collections::HashMap;
use std::sync::Mutex;

use crate::app_response::AppResponse;

pub trait KeyValueStore {
    /// Returns the stored value, or `None` when the key has never been written.
    fn get(&self, key: &str) -> Result<Option<String>, AppResponse>;

    /// Replaces the value stored under `key`.
    fn set(&self, key: &str, value: &str) -> Result<(), AppResponse>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get(&self, key: &str) -> Result<Option<String>, AppResponse> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppResponse> {
        (**self).set(key, value)
    }
}

/// Process-local store. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppResponse> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| AppResponse::StorageFailure("Memory store lock poisoned".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppResponse> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| AppResponse::StorageFailure("Memory store lock poisoned".to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
