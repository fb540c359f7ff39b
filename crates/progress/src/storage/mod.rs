//! Key-value persistence backends for the save record.
//!
//! The store only ever needs three operations on string values, mirroring the
//! browser `localStorage` surface, so every backend implements [`SaveStorage`].

mod file;
mod memory;
#[cfg(feature = "web")]
mod web;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub use file::FileStorage;
pub use memory::MemoryStorage;
#[cfg(feature = "web")]
pub use web::LocalStorage;

pub trait SaveStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    /// Removing a key that does not exist succeeds.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

impl<T: SaveStorage + ?Sized> SaveStorage for Box<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage key '{key}' is not a plain identifier")]
    InvalidKey { key: String },
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to remove {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("storage quota exceeded while writing key '{key}'")]
    QuotaExceeded { key: String },
    #[error("failed to encode save record: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("storage unavailable: {message}")]
    Unavailable { message: String },
}
