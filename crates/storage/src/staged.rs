// storage/src/staged.rs

use crate::{Batch, KvStore, StorageResult};
use std::collections::BTreeMap;

/// Write buffer over another store.
///
/// Reads see buffered writes first. Nothing reaches the underlying store
/// until [`StagedStore::commit`], which applies every buffered write as one
/// batch; dropping the buffer discards them.
pub struct StagedStore<'a, S: KvStore + ?Sized> {
    base: &'a mut S,
    // None marks a buffered delete
    pending: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
}

impl<'a, S: KvStore + ?Sized> StagedStore<'a, S> {
    pub fn new(base: &'a mut S) -> Self {
        Self {
            base,
            pending: BTreeMap::new(),
        }
    }

    /// Number of buffered writes
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn commit(self) -> StorageResult<()> {
        let mut batch = Batch::new();
        for (key, value) in self.pending {
            match value {
                Some(value) => batch.set(key, value),
                None => batch.delete(key),
            }
        }

        if batch.is_empty() {
            return Ok(());
        }
        self.base.write_batch(batch)
    }
}

impl<S: KvStore + ?Sized> KvStore for StagedStore<'_, S> {
    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        match self.pending.get(key) {
            Some(value) => Ok(value.clone()),
            None => self.base.get(key),
        }
    }

    fn set(&mut self, key: &[u8], value: &[u8]) -> StorageResult<()> {
        self.pending.insert(key.to_vec(), Some(value.to_vec()));
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> StorageResult<()> {
        self.pending.insert(key.to_vec(), None);
        Ok(())
    }
}
