// storage/src/lib.rs

//! Persisted key-value store capability
//!
//! State-transition modules never own their storage. They receive a
//! [`KvStore`] and read or write typed records through it:
//! - [`MemoryStore`] for tests and simulation
//! - [`Database`] backed by RocksDB (feature `rocksdb`)
//! - [`Batch`] to apply a group of writes together
//! - [`StagedStore`] to buffer a block's writes until it succeeds

pub mod batch;
pub mod codec;
#[cfg(feature = "rocksdb")]
pub mod db;
pub mod memory;
pub mod staged;

pub use batch::{Batch, BatchOp};
pub use codec::{get_json, set_json};
#[cfg(feature = "rocksdb")]
pub use db::{Database, DatabaseConfig};
pub use memory::MemoryStore;
pub use staged::StagedStore;

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Corruption detected: {0}")]
    Corruption(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Synchronous byte-keyed store.
///
/// Only one block executes at a time, so implementations need no internal
/// locking.
pub trait KvStore {
    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>>;

    fn set(&mut self, key: &[u8], value: &[u8]) -> StorageResult<()>;

    fn delete(&mut self, key: &[u8]) -> StorageResult<()>;

    /// Apply every operation of `batch`, in order
    fn write_batch(&mut self, batch: Batch) -> StorageResult<()> {
        for op in batch.into_ops() {
            match op {
                BatchOp::Set { key, value } => self.set(&key, &value)?,
                BatchOp::Delete { key } => self.delete(&key)?,
            }
        }
        Ok(())
    }
}

impl<T: KvStore + ?Sized> KvStore for Box<T> {
    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &[u8], value: &[u8]) -> StorageResult<()> {
        (**self).set(key, value)
    }

    fn delete(&mut self, key: &[u8]) -> StorageResult<()> {
        (**self).delete(key)
    }

    fn write_batch(&mut self, batch: Batch) -> StorageResult<()> {
        (**self).write_batch(batch)
    }
}
