use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// The well-known keys the app persists under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StorageKey {
    UserPreferences,
    PracticeHistory,
    CustomPrompts,
    StreakData,
}

impl StorageKey {
    pub const ALL: [StorageKey; 4] = [
        StorageKey::UserPreferences,
        StorageKey::PracticeHistory,
        StorageKey::CustomPrompts,
        StorageKey::StreakData,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StorageKey::UserPreferences => "user_preferences",
            StorageKey::PracticeHistory => "practice_history",
            StorageKey::CustomPrompts => "custom_prompts",
            StorageKey::StreakData => "streak_data",
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Durable string key-value store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch the raw value stored under `key`.
    ///
    /// Returns `Ok(None)` when nothing has been stored yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get(&self, key: StorageKey) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be stored.
    async fn set(&self, key: StorageKey, value: String) -> Result<(), StorageError>;

    /// Delete the value under `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn remove(&self, key: StorageKey) -> Result<(), StorageError>;
}

/// Simple in-memory store for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    values: Arc<Mutex<HashMap<StorageKey, String>>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Number of keys currently stored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn len(&self) -> Result<usize, StorageError> {
        let guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.len())
    }

    /// Whether nothing has been stored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.len()? == 0)
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: StorageKey) -> Result<Option<String>, StorageError> {
        let guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&key).cloned())
    }

    async fn set(&self, key: StorageKey, value: String) -> Result<(), StorageError> {
        let mut guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key, value);
        Ok(())
    }

    async fn remove(&self, key: StorageKey) -> Result<(), StorageError> {
        let mut guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(&key);
        Ok(())
    }
}

/// Holds the store behind a trait object for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub kv: Arc<dyn KeyValueStore>,
}

impl Storage {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        let kv: Arc<dyn KeyValueStore> = Arc::new(InMemoryStore::new());
        Self { kv }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn round_trips_values_per_key() {
        let store = InMemoryStore::new();
        assert!(store.get(StorageKey::StreakData).await.unwrap().is_none());

        store
            .set(StorageKey::StreakData, "{}".to_string())
            .await
            .unwrap();
        store
            .set(StorageKey::CustomPrompts, "[]".to_string())
            .await
            .unwrap();

        assert_eq!(
            store.get(StorageKey::StreakData).await.unwrap().as_deref(),
            Some("{}")
        );
        assert_eq!(store.len().unwrap(), 2);
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let store = InMemoryStore::new();
        store
            .set(StorageKey::PracticeHistory, "[]".to_string())
            .await
            .unwrap();
        store.remove(StorageKey::PracticeHistory).await.unwrap();
        store.remove(StorageKey::PracticeHistory).await.unwrap();
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn keys_use_snake_case_names() {
        let names: Vec<_> = StorageKey::ALL.iter().map(|k| k.as_str()).collect();
        assert_eq!(
            names,
            ["user_preferences", "practice_history", "custom_prompts", "streak_data"]
        );
    }
}
