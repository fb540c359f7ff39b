use web_sys::Storage;

use super::{SaveStorage, StorageError};

/// Browser `localStorage` for the current origin.
pub struct LocalStorage {
    inner: Storage,
}

impl LocalStorage {
    pub fn from_window() -> Result<Self, StorageError> {
        let window = web_sys::window().ok_or_else(|| StorageError::Unavailable {
            message: "no global window".to_string(),
        })?;
        let inner = window
            .local_storage()
            .map_err(|error| StorageError::Unavailable {
                message: format!("localStorage access denied: {error:?}"),
            })?
            .ok_or_else(|| StorageError::Unavailable {
                message: "localStorage disabled".to_string(),
            })?;
        Ok(Self { inner })
    }
}

impl SaveStorage for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner
            .get_item(key)
            .map_err(|error| StorageError::Unavailable {
                message: format!("localStorage.getItem({key}) failed: {error:?}"),
            })
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        // setItem only throws for QuotaExceededError or a disabled store.
        self.inner
            .set_item(key, value)
            .map_err(|_| StorageError::QuotaExceeded {
                key: key.to_string(),
            })
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.inner
            .remove_item(key)
            .map_err(|error| StorageError::Unavailable {
                message: format!("localStorage.removeItem({key}) failed: {error:?}"),
            })
    }
}
