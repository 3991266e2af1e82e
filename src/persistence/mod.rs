//! Key-value persistence
//!
//! The list core only needs `load`/`save` of whole snapshots under a key:
//! - `LocalStorageStore` on the web (origin scoped, survives reloads)
//! - `FileStore` on native (one JSON file per key)
//! - `MemoryStore` for tests and ephemeral sessions

#[cfg(not(target_arch = "wasm32"))]
pub mod file;
#[cfg(target_arch = "wasm32")]
pub mod local_storage;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStore;
#[cfg(target_arch = "wasm32")]
pub use local_storage::LocalStorageStore;

use std::collections::HashMap;
use std::path::PathBuf;

use thiserror::Error;

/// Storage failures. The list controller logs these and carries on.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No backing store (no window, storage disabled by the user agent)
    #[error("storage unavailable")]
    Unavailable,

    /// The store refused the operation (quota exceeded, security error)
    #[error("storage rejected the operation: {0}")]
    Rejected(String),

    #[error("I/O error on {path}: {error}")]
    Io {
        path: PathBuf,
        error: std::io::Error,
    },

    #[error("failed to encode value: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Keys every backend accepts: non-empty ASCII alphanumerics, `_` and `-`
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Durable string store keyed by name
pub trait PersistentStore {
    /// Read the value under `key`, `Ok(None)` if nothing is stored
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Overwrite the value under `key`
    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete the value under `key`; deleting a missing key is not an error
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

impl<S: PersistentStore + ?Sized> PersistentStore for Box<S> {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).load(key)
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).save(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// In-memory store. Can be switched into failing modes to simulate a full
/// or disabled backend.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    fail_reads: bool,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with one entry
    pub fn with_entry(key: &str, value: &str) -> Self {
        let mut store = Self::new();
        store.entries.insert(key.to_string(), value.to_string());
        store
    }

    /// Make every subsequent `load` fail with `Unavailable`
    pub fn set_fail_reads(&mut self, fail: bool) {
        self.fail_reads = fail;
    }

    /// Make every subsequent `save`/`remove` fail with `Rejected`
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Raw access for inspection
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl PersistentStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.fail_reads {
            return Err(StorageError::Unavailable);
        }
        Ok(self.entries.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::Rejected("quota exceeded".to_string()));
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::Rejected("quota exceeded".to_string()));
        }
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        assert_eq!(store.load("todos").unwrap(), None);

        store.save("todos", "[]").unwrap();
        assert_eq!(store.load("todos").unwrap().as_deref(), Some("[]"));

        store.save("todos", "[1]").unwrap();
        assert_eq!(store.get("todos"), Some("[1]"));

        store.remove("todos").unwrap();
        store.remove("todos").unwrap();
        assert_eq!(store.load("todos").unwrap(), None);
    }

    #[test]
    fn test_memory_store_failing_writes() {
        let mut store = MemoryStore::with_entry("todos", "[]");
        store.set_fail_writes(true);

        assert!(matches!(
            store.save("todos", "[1]"),
            Err(StorageError::Rejected(_))
        ));
        // Previous value survives
        assert_eq!(store.get("todos"), Some("[]"));
    }

    #[test]
    fn test_memory_store_failing_reads() {
        let mut store = MemoryStore::with_entry("todos", "[]");
        store.set_fail_reads(true);
        assert!(matches!(store.load("todos"), Err(StorageError::Unavailable)));

        store.set_fail_reads(false);
        assert_eq!(store.load("todos").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_valid_keys() {
        assert!(is_valid_key("todos"));
        assert!(is_valid_key("tick_list-2"));
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("my list"));
        assert!(!is_valid_key("../escape"));
    }

    #[test]
    fn test_encode_errors_convert() {
        use std::collections::BTreeMap;

        fn encode(value: &impl serde::Serialize) -> Result<String, StorageError> {
            Ok(serde_json::to_string(value)?)
        }

        // JSON object keys must be strings
        let mut map = BTreeMap::new();
        map.insert((1, 2), 3);
        assert!(matches!(encode(&map), Err(StorageError::Encode(_))));
        assert_eq!(encode(&[1, 2]).unwrap(), "[1,2]");
    }

    #[test]
    fn test_boxed_store_delegates() {
        let mut store: Box<dyn PersistentStore> = Box::new(MemoryStore::new());
        store.save("k", "v").unwrap();
        assert_eq!(store.load("k").unwrap().as_deref(), Some("v"));
    }
}
