//! File-based session storage.
//!
//! Stores each key as a file in a directory, so a session survives
//! restarts of a desktop or command-line client.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::AuthError;

use super::store::SessionStore;

/// File-based key-value storage.
///
/// Each key is stored as a file named `{key}.value` in the configured
/// directory. Writes go to a temporary file first and are renamed into
/// place, so a crash mid-write never leaves a truncated record behind.
///
/// # Example
///
/// ```rust,ignore
/// use autodig_session::FileSessionStore;
///
/// let store = FileSessionStore::new(dirs::data_dir().unwrap().join("autodig"))?;
/// ```
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    directory: PathBuf,
}

impl FileSessionStore {
    /// Creates a new file store, creating the directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new(directory: impl Into<PathBuf>) -> Result<Self, AuthError> {
        let dir = directory.into();
        std::fs::create_dir_all(&dir).map_err(|e| {
            AuthError::StorageError(format!("Failed to create session directory: {e}"))
        })?;
        Ok(Self { directory: dir })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Returns the path for a key, or `None` if the key could escape the directory.
    fn key_path(&self, key: &str) -> Option<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        valid.then(|| self.directory.join(format!("{key}.value")))
    }

    fn checked_path(&self, key: &str) -> Result<PathBuf, AuthError> {
        self.key_path(key).ok_or_else(|| {
            log::warn!(target: "autodig_session::store", "msg=\"rejected storage key\" key=\"{}\"", key);
            AuthError::StorageError(format!("Invalid storage key: {key:?}"))
        })
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> Result<Option<String>, AuthError> {
        // an unusable key can never have been written
        let Some(path) = self.key_path(key) else {
            return Ok(None);
        };

        match std::fs::read(&path) {
            // invalid UTF-8 fails to parse upstream and gets purged there
            Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AuthError::StorageError(format!(
                "Failed to read session file: {e}"
            ))),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AuthError> {
        let path = self.checked_path(key)?;
        let tmp = path.with_extension("value.tmp");

        std::fs::write(&tmp, value)
            .map_err(|e| AuthError::StorageError(format!("Failed to write session file: {e}")))?;
        std::fs::rename(&tmp, &path).map_err(|e| {
            let _ = std::fs::remove_file(&tmp);
            AuthError::StorageError(format!("Failed to replace session file: {e}"))
        })?;

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), AuthError> {
        let Some(path) = self.key_path(key) else {
            return Ok(());
        };

        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AuthError::StorageError(format!(
                "Failed to delete session file: {e}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path()).unwrap();

        store.set("autodig_session", r#"{"token":"t"}"#).unwrap();
        assert_eq!(
            store.get("autodig_session").unwrap().as_deref(),
            Some(r#"{"token":"t"}"#)
        );
        assert!(dir.path().join("autodig_session.value").exists());
    }

    #[test]
    fn test_get_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path()).unwrap();

        assert!(store.get("token").unwrap().is_none());
    }

    #[test]
    fn test_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();

        FileSessionStore::new(dir.path())
            .unwrap()
            .set("user", r#"{"id":"1","email":"a@b.com"}"#)
            .unwrap();

        let reopened = FileSessionStore::new(dir.path()).unwrap();
        assert!(reopened.get("user").unwrap().is_some());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path()).unwrap();

        store.set("token", "abc").unwrap();
        store.remove("token").unwrap();
        store.remove("token").unwrap();

        assert!(store.get("token").unwrap().is_none());
        assert!(!dir.path().join("token.value").exists());
    }

    #[test]
    fn test_no_temp_file_left_after_write() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path()).unwrap();

        store.set("token", "abc").unwrap();
        store.set("token", "def").unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["token.value".to_owned()]);
    }

    #[test]
    fn test_path_traversal_prevention() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path()).unwrap();

        assert!(store.set("../escape", "x").is_err());
        assert!(store.set("nested/key", "x").is_err());
        assert!(store.set("", "x").is_err());

        assert!(store.get("../etc/passwd").unwrap().is_none());
        assert!(store.remove("../etc/passwd").is_ok());
    }

    #[test]
    fn test_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");

        let store = FileSessionStore::new(&nested).unwrap();
        assert!(nested.is_dir());
        assert_eq!(store.directory(), nested.as_path());
    }
}
