// storage/src/batch.rs

use crate::{StorageError, StorageResult};
use serde::Serialize;

/// A single buffered write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOp {
    Set { key: Vec<u8>, value: Vec<u8> },
    Delete { key: Vec<u8> },
}

/// Ordered group of writes.
///
/// Callers encode every value up front, so a serialization failure leaves the
/// store untouched.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    ops: Vec<BatchOp>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl AsRef<[u8]>, value: impl Into<Vec<u8>>) {
        self.ops.push(BatchOp::Set {
            key: key.as_ref().to_vec(),
            value: value.into(),
        });
    }

    /// Encode `value` as JSON and queue it under `key`
    pub fn set_json<T: Serialize>(&mut self, key: &str, value: &T) -> StorageResult<()> {
        let bytes = serde_json::to_vec(value)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        self.set(key, bytes);
        Ok(())
    }

    pub fn delete(&mut self, key: impl AsRef<[u8]>) {
        self.ops.push(BatchOp::Delete {
            key: key.as_ref().to_vec(),
        });
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn ops(&self) -> &[BatchOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<BatchOp> {
        self.ops
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{KvStore, MemoryStore};

    #[test]
    fn test_batch_applies_in_order() {
        let mut store = MemoryStore::new();
        store.set(b"stale", b"1").unwrap();

        let mut batch = Batch::new();
        batch.set("a", b"first".to_vec());
        batch.set("a", b"second".to_vec());
        batch.delete("stale");
        assert_eq!(batch.len(), 3);

        store.write_batch(batch).unwrap();

        assert_eq!(store.get(b"a").unwrap(), Some(b"second".to_vec()));
        assert_eq!(store.get(b"stale").unwrap(), None);
    }

    #[test]
    fn test_batch_json() {
        let mut batch = Batch::new();
        batch.set_json("k", &vec![1u64, 2, 3]).unwrap();

        match &batch.ops()[0] {
            BatchOp::Set { key, value } => {
                assert_eq!(key, b"k");
                assert_eq!(value, b"[1,2,3]");
            }
            other => panic!("unexpected op {:?}", other),
        }
    }
}
