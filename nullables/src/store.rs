//! Nullable snapshot store.

use stakegov_store::{StateStore, StoreError};
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory [`StateStore`]. Thread-safe so it can be shared across test threads.
#[derive(Default)]
pub struct NullStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
    writes: Mutex<u64>,
}

impl NullStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of successful `put_state` calls so far.
    pub fn write_count(&self) -> u64 {
        self.writes.lock().map(|w| *w).unwrap_or(0)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries
            .lock()
            .map(|e| e.contains_key(key))
            .unwrap_or(false)
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Backend("null store lock poisoned".to_string())
}

impl StateStore for NullStore {
    fn put_state(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.entries
            .lock()
            .map_err(poisoned)?
            .insert(key.to_string(), value.to_vec());
        *self.writes.lock().map_err(poisoned)? += 1;
        Ok(())
    }

    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.entries.lock().map_err(poisoned)?.get(key).cloned())
    }

    fn delete_state(&self, key: &str) -> Result<(), StoreError> {
        self.entries.lock().map_err(poisoned)?.remove(key);
        Ok(())
    }
}
