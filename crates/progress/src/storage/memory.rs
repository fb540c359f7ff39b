use std::collections::BTreeMap;

use super::{SaveStorage, StorageError};

/// In-process storage. Used by tests and by sessions that run without a save directory.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    entries: BTreeMap<String, String>,
    fail_reads: bool,
    fail_writes: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Every subsequent `set`/`remove` fails as if the quota were exhausted.
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    pub fn set_fail_reads(&mut self, fail: bool) {
        self.fail_reads = fail;
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SaveStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.fail_reads {
            return Err(StorageError::Unavailable {
                message: "memory storage reads disabled".to_string(),
            });
        }
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::QuotaExceeded {
                key: key.to_string(),
            });
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::Unavailable {
                message: "memory storage writes disabled".to_string(),
            });
        }
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_write_leaves_previous_value() {
        let mut storage = MemoryStorage::new().with_entry("k", "old");
        storage.set_fail_writes(true);

        let error = storage.set("k", "new").expect_err("write should fail");

        assert!(matches!(error, StorageError::QuotaExceeded { ref key } if key == "k"));
        assert_eq!(storage.get("k").expect("read").as_deref(), Some("old"));
    }

    #[test]
    fn removing_missing_key_is_ok() {
        let mut storage = MemoryStorage::new();
        storage.remove("absent").expect("remove");
        assert!(storage.is_empty());
    }
}
