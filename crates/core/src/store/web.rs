use gloo::storage::{LocalStorage as BrowserStorage, Storage};

use super::KeyValueStore;
use crate::error::{StorageError, StorageResult};

/// Browser `localStorage`, shared by every tab of the origin
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        BrowserStorage::raw()
            .get_item(key)
            .map_err(|e| StorageError::unavailable(format!("{e:?}")))
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        BrowserStorage::raw()
            .set_item(key, value)
            .map_err(|e| StorageError::unavailable(format!("{e:?}")))
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        BrowserStorage::delete(key);
        Ok(())
    }
}
