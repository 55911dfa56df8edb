//! In-memory session storage.
//!
//! Suitable for tests and for clients that do not need a session to
//! outlive the process.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::AuthError;

use super::store::SessionStore;

/// In-memory key-value storage.
///
/// Stores values in a `HashMap` protected by a `RwLock`. Clones share
/// the same map, so a clone handed to a [`SessionManager`](super::SessionManager)
/// can be inspected from a test.
#[derive(Clone, Default)]
pub struct MemorySessionStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of keys currently stored.
    pub fn len(&self) -> usize {
        self.entries.read().map(|guard| guard.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries
            .read()
            .map(|guard| guard.contains_key(key))
            .unwrap_or(false)
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Result<Option<String>, AuthError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| AuthError::StorageError("Lock poisoned".to_owned()))?;

        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AuthError> {
        self.entries
            .write()
            .map_err(|_| AuthError::StorageError("Lock poisoned".to_owned()))?
            .insert(key.to_owned(), value.to_owned());

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), AuthError> {
        self.entries
            .write()
            .map_err(|_| AuthError::StorageError("Lock poisoned".to_owned()))?
            .remove(key);

        Ok(())
    }
}
