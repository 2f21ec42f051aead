//! Typed JSON access on top of a [`KeyValueStore`].

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::repository::{KeyValueStore, StorageError, StorageKey};

/// Read and decode the value under `key`.
///
/// Returns `Ok(None)` when the key has never been written.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if the stored text is not valid JSON
/// for `T`, or any error from the backend read.
pub async fn read_json<T>(store: &dyn KeyValueStore, key: StorageKey) -> Result<Option<T>, StorageError>
where
    T: DeserializeOwned,
{
    let Some(raw) = store.get(key).await? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|err| StorageError::Serialization(format!("{key}: {err}")))
}

/// Encode `value` as JSON text.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if `value` cannot be encoded.
pub fn encode<T>(key: StorageKey, value: &T) -> Result<String, StorageError>
where
    T: Serialize + ?Sized,
{
    serde_json::to_string(value).map_err(|err| StorageError::Serialization(format!("{key}: {err}")))
}

/// Encode `value` and store it under `key`.
///
/// # Errors
///
/// Returns `StorageError` if encoding or the backend write fails.
pub async fn write_json<T>(store: &dyn KeyValueStore, key: StorageKey, value: &T) -> Result<(), StorageError>
where
    T: Serialize + ?Sized + Sync,
{
    let raw = encode(key, value)?;
    store.set(key, raw).await
}
