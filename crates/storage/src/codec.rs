// storage/src/codec.rs

use crate::{KvStore, StorageError, StorageResult};
use serde::{de::DeserializeOwned, Serialize};

/// Read and decode a JSON record
pub fn get_json<T, S>(store: &S, key: &str) -> StorageResult<Option<T>>
where
    T: DeserializeOwned,
    S: KvStore + ?Sized,
{
    match store.get(key.as_bytes())? {
        Some(bytes) => {
            let value = serde_json::from_slice(&bytes)
                .map_err(|e| StorageError::Corruption(format!("{}: {}", key, e)))?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

/// Encode a record as JSON and write it
pub fn set_json<T, S>(store: &mut S, key: &str, value: &T) -> StorageResult<()>
where
    T: Serialize,
    S: KvStore + ?Sized,
{
    let bytes = serde_json::to_vec(value)
        .map_err(|e| StorageError::SerializationError(e.to_string()))?;
    store.set(key.as_bytes(), &bytes)
}
