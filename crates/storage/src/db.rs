// storage/src/db.rs

use crate::{Batch, BatchOp, KvStore, StorageError, StorageResult};
use rocksdb::{Options, WriteBatch, DB};
use std::sync::Arc;

/// Column family holding module state
const STATE_CF: &str = "state";

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub path: String,
    pub create_if_missing: bool,
    pub max_open_files: i32,
    pub write_buffer_size: usize,
    pub max_write_buffer_number: i32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "./data/db".to_string(),
            create_if_missing: true,
            max_open_files: 1024,
            write_buffer_size: 64 * 1024 * 1024, // 64 MB
            max_write_buffer_number: 3,
        }
    }
}

/// RocksDB-backed module state
pub struct Database {
    db: Arc<DB>,
    config: DatabaseConfig,
}

impl Database {
    /// Open or create database
    pub fn open(config: DatabaseConfig) -> StorageResult<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(config.create_if_missing);
        opts.create_missing_column_families(true);
        opts.set_max_open_files(config.max_open_files);
        opts.set_write_buffer_size(config.write_buffer_size);
        opts.set_max_write_buffer_number(config.max_write_buffer_number);
        opts.increase_parallelism(num_cpus::get() as i32);

        let db = DB::open_cf(&opts, &config.path, [STATE_CF])
            .map_err(|e| StorageError::DatabaseError(e.to_string()))?;

        tracing::info!("Database opened at {}", config.path);

        Ok(Self {
            db: Arc::new(db),
            config,
        })
    }

    pub fn path(&self) -> &str {
        &self.config.path
    }

    /// Compact database
    pub fn compact(&self) -> StorageResult<()> {
        tracing::info!("Compacting database...");
        let cf = self.cf()?;
        self.db.compact_range_cf(cf, None::<&[u8]>, None::<&[u8]>);
        tracing::info!("Database compaction complete");
        Ok(())
    }

    fn cf(&self) -> StorageResult<&rocksdb::ColumnFamily> {
        self.db
            .cf_handle(STATE_CF)
            .ok_or_else(|| StorageError::DatabaseError(format!("{} CF not found", STATE_CF)))
    }
}

impl KvStore for Database {
    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        let cf = self.cf()?;
        self.db
            .get_cf(cf, key)
            .map_err(|e| StorageError::DatabaseError(e.to_string()))
    }

    fn set(&mut self, key: &[u8], value: &[u8]) -> StorageResult<()> {
        let cf = self.cf()?;
        self.db
            .put_cf(cf, key, value)
            .map_err(|e| StorageError::DatabaseError(e.to_string()))
    }

    fn delete(&mut self, key: &[u8]) -> StorageResult<()> {
        let cf = self.cf()?;
        self.db
            .delete_cf(cf, key)
            .map_err(|e| StorageError::DatabaseError(e.to_string()))
    }

    /// Single RocksDB write batch, so either every op lands or none does
    fn write_batch(&mut self, batch: Batch) -> StorageResult<()> {
        let cf = self.cf()?;
        let mut wb = WriteBatch::default();

        for op in batch.into_ops() {
            match op {
                BatchOp::Set { key, value } => wb.put_cf(cf, key, value),
                BatchOp::Delete { key } => wb.delete_cf(cf, key),
            }
        }

        self.db
            .write(wb)
            .map_err(|e| StorageError::DatabaseError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_db() -> (Database, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config = DatabaseConfig {
            path: temp_dir.path().to_str().unwrap().to_string(),
            ..Default::default()
        };
        let db = Database::open(config).unwrap();
        (db, temp_dir)
    }

    #[test]
    fn test_get_set_delete() {
        let (mut db, _temp) = create_test_db();

        db.set(b"current_cycle", b"{}").unwrap();
        assert_eq!(db.get(b"current_cycle").unwrap(), Some(b"{}".to_vec()));

        db.delete(b"current_cycle").unwrap();
        assert_eq!(db.get(b"current_cycle").unwrap(), None);
    }

    #[test]
    fn test_write_batch() {
        let (mut db, _temp) = create_test_db();
        db.set(b"old", b"1").unwrap();

        let mut batch = Batch::new();
        batch.set("new", b"2".to_vec());
        batch.delete("old");
        db.write_batch(batch).unwrap();

        assert_eq!(db.get(b"new").unwrap(), Some(b"2".to_vec()));
        assert_eq!(db.get(b"old").unwrap(), None);
    }

    #[test]
    fn test_reopen_persists() {
        let temp_dir = TempDir::new().unwrap();
        let config = DatabaseConfig {
            path: temp_dir.path().to_str().unwrap().to_string(),
            ..Default::default()
        };

        {
            let mut db = Database::open(config.clone()).unwrap();
            db.set(b"minter_state", b"x").unwrap();
        }

        let db = Database::open(config).unwrap();
        assert_eq!(db.get(b"minter_state").unwrap(), Some(b"x".to_vec()));
        db.compact().unwrap();
    }
}
