//! `localStorage` persistence. Documents are stored verbatim under their keys.

use gloo::console;
use gloo::storage::{LocalStorage, Storage};
use inkwell_access::{KeyValueStore, StorageError};

/// Key/value store backed by the page's `localStorage`.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserStore;

fn unavailable(operation: &str, key: &str, err: &wasm_bindgen::JsValue) -> StorageError {
    console::warn!("localStorage", operation, key, err.clone());
    StorageError::Unavailable {
        key: key.to_string(),
        detail: format!("{operation} failed: {err:?}"),
    }
}

impl KeyValueStore for BrowserStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        LocalStorage::raw()
            .get_item(key)
            .map_err(|err| unavailable("read", key, &err))
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        LocalStorage::raw()
            .set_item(key, value)
            .map_err(|err| unavailable("write", key, &err))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        LocalStorage::raw()
            .remove_item(key)
            .map_err(|err| unavailable("remove", key, &err))
    }
}
