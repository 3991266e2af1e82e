//! Browser LocalStorage adapter

use wasm_bindgen::JsValue;
use web_sys::Storage;

use super::{PersistentStore, StorageError};

/// `window.localStorage`, resolved lazily on every call so a page that
/// disables storage mid-session degrades instead of panicking
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorageStore;

impl LocalStorageStore {
    pub fn new() -> Self {
        Self
    }

    /// Whether the browser exposes LocalStorage at all
    pub fn is_available() -> bool {
        storage().is_ok()
    }
}

fn storage() -> Result<Storage, StorageError> {
    web_sys::window()
        .and_then(|w| w.local_storage().ok())
        .flatten()
        .ok_or(StorageError::Unavailable)
}

fn rejected(err: JsValue) -> StorageError {
    StorageError::Rejected(err.as_string().unwrap_or_else(|| format!("{:?}", err)))
}

impl PersistentStore for LocalStorageStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        storage()?.get_item(key).map_err(rejected)
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        storage()?.set_item(key, value).map_err(rejected)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        storage()?.remove_item(key).map_err(rejected)
    }
}
