//! Key-value persistence boundary.
//!
//! Everything the application persists (tokens, admin records, leads,
//! resources) goes through the [`KeyValueStore`] trait as plain strings.
//! This mirrors the browser-local storage collaborator the demo was built
//! against: synchronous get/set/remove by key, last-write-wins, no
//! transactional isolation.

use std::collections::HashMap;
use std::sync::RwLock;

use thiserror::Error;

/// Errors produced by the key-value layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backend failed in a way the caller cannot recover from.
    #[error("storage backend error: {0}")]
    Backend(String),
    /// A write would exceed the configured capacity. The store is left
    /// unchanged; no partial write occurs.
    #[error("storage quota exceeded: write of {needed} bytes over {capacity}-byte capacity")]
    QuotaExceeded { needed: usize, capacity: usize },
}

impl StoreError {
    pub(crate) fn backend(msg: impl Into<String>) -> Self {
        StoreError::Backend(msg.into())
    }
}

/// Trait for a string key-value storage backend.
/// This allows for different storage implementations (e.g., in-memory, a
/// real browser-storage bridge).
pub trait KeyValueStore: Send + Sync {
    /// Retrieve a value by key.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    /// Insert or replace a value.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    /// Delete a key. Deleting an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// An in-memory store using a `RwLock` around a `HashMap`.
///
/// An optional byte capacity approximates the quota a browser profile
/// imposes on local storage; writes that would exceed it fail with
/// [`StoreError::QuotaExceeded`] and leave the map untouched.
pub struct MemoryStore {
    records: RwLock<HashMap<String, String>>,
    capacity_bytes: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            capacity_bytes: None,
        }
    }

    /// A store that rejects writes once the total stored bytes (keys plus
    /// values) would exceed `capacity_bytes`.
    pub fn with_capacity_bytes(capacity_bytes: usize) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            capacity_bytes: Some(capacity_bytes),
        }
    }

    fn stored_bytes(records: &HashMap<String, String>) -> usize {
        records.iter().map(|(k, v)| k.len() + v.len()).sum()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let guard = self
            .records
            .read()
            .map_err(|_| StoreError::backend("poisoned lock"))?;
        Ok(guard.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        // The write lock is held across the quota check and the insert so
        // the two cannot interleave with another writer.
        let mut guard = self
            .records
            .write()
            .map_err(|_| StoreError::backend("poisoned lock"))?;
        if let Some(capacity) = self.capacity_bytes {
            let existing = guard.get(key).map(|v| key.len() + v.len()).unwrap_or(0);
            let needed = Self::stored_bytes(&guard) - existing + key.len() + value.len();
            if needed > capacity {
                return Err(StoreError::QuotaExceeded { needed, capacity });
            }
        }
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.records
            .write()
            .map_err(|_| StoreError::backend("poisoned lock"))?
            .remove(key);
        Ok(())
    }
}
