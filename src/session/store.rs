//! Session store trait.

use crate::AuthError;

/// Key-value storage the session manager persists into.
///
/// Mirrors the semantics of browser local storage: string keys, string
/// values, synchronous access. Implementations provide different backends:
/// - [`MemorySessionStore`](super::MemorySessionStore): in-process storage for tests and short-lived clients
/// - [`FileSessionStore`](super::FileSessionStore): one file per key in a directory
pub trait SessionStore: Send + Sync {
    /// Returns the stored value, or `None` if the key is absent.
    fn get(&self, key: &str) -> Result<Option<String>, AuthError>;

    /// Stores a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<(), AuthError>;

    /// Removes a key. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), AuthError>;
}

impl<T: SessionStore + ?Sized> SessionStore for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, AuthError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AuthError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), AuthError> {
        (**self).remove(key)
    }
}
