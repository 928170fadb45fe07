//! RocksDB-backed column store. One `ColumnFamily` per logical column in
//! [`crate::columns`], opened with Snappy compression and a bloom filter.
//! The finalizer's multi-column commit goes through
//! [`ColumnStore::write_batch`], RocksDB's single atomic `WriteBatch`.

use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use rocksdb::{ColumnFamilyDescriptor, Options, WriteBatch, DB};

use crate::columns::ALL_COLUMN_FAMILIES;
use crate::error::{StorageError, StorageResult};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct StorageConfig {
    pub path: String,
    pub block_cache_bytes: usize,
    pub write_buffer_bytes: usize,
    pub sync_writes: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: "./data/consensus".to_string(),
            block_cache_bytes: 256 * 1024 * 1024,
            write_buffer_bytes: 64 * 1024 * 1024,
            sync_writes: true,
        }
    }
}

impl StorageConfig {
    pub fn for_testing(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            block_cache_bytes: 8 * 1024 * 1024,
            write_buffer_bytes: 4 * 1024 * 1024,
            sync_writes: false,
        }
    }
}

pub struct ColumnStore {
    db: Arc<RwLock<DB>>,
    config: StorageConfig,
}

/// One write operation against one named column, used to build a batch
/// spanning several columns atomically.
pub enum BatchOp<'a> {
    Put { column: &'static str, key: &'a [u8], value: Vec<u8> },
    Delete { column: &'static str, key: &'a [u8] },
}

impl ColumnStore {
    pub fn open(config: StorageConfig) -> StorageResult<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);
        opts.set_write_buffer_size(config.write_buffer_bytes);
        opts.set_compression_type(rocksdb::DBCompressionType::Snappy);

        let mut block_opts = rocksdb::BlockBasedOptions::default();
        block_opts.set_bloom_filter(10.0, false);
        block_opts.set_block_cache(&rocksdb::Cache::new_lru_cache(config.block_cache_bytes));
        opts.set_block_based_table_factory(&block_opts);

        let cf_descriptors: Vec<ColumnFamilyDescriptor> = ALL_COLUMN_FAMILIES
            .iter()
            .map(|name| {
                let mut cf_opts = Options::default();
                cf_opts.set_compression_type(rocksdb::DBCompressionType::Snappy);
                ColumnFamilyDescriptor::new(*name, cf_opts)
            })
            .collect();

        let db = DB::open_cf_descriptors(&opts, &config.path, cf_descriptors)
            .map_err(|e| StorageError::Io(e.to_string()))?;

        Ok(Self { db: Arc::new(RwLock::new(db)), config })
    }

    pub fn open_ephemeral(path: impl AsRef<Path>) -> StorageResult<Self> {
        Self::open(StorageConfig::for_testing(path.as_ref().to_string_lossy().to_string()))
    }

    fn cf_handle<'a>(db: &'a DB, column: &'static str) -> StorageResult<&'a rocksdb::ColumnFamily> {
        db.cf_handle(column).ok_or(StorageError::UnknownColumn(column))
    }

    pub fn get(&self, column: &'static str, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        let db = self.db.read();
        let cf = Self::cf_handle(&db, column)?;
        db.get_cf(cf, key).map_err(|e| StorageError::Io(e.to_string()))
    }

    pub fn put(&self, column: &'static str, key: &[u8], value: &[u8]) -> StorageResult<()> {
        let db = self.db.write();
        let cf = Self::cf_handle(&db, column)?;
        let mut write_opts = rocksdb::WriteOptions::default();
        write_opts.set_sync(self.config.sync_writes);
        db.put_cf_opt(cf, key, value, &write_opts).map_err(|e| StorageError::Io(e.to_string()))
    }

    pub fn prefix_scan(
        &self,
        column: &'static str,
        prefix: &[u8],
    ) -> StorageResult<Vec<(Vec<u8>, Vec<u8>)>> {
        let db = self.db.read();
        let cf = Self::cf_handle(&db, column)?;
        let mut out = Vec::new();
        let iter = db.iterator_cf(cf, rocksdb::IteratorMode::From(prefix, rocksdb::Direction::Forward));
        for item in iter {
            let (key, value) = item.map_err(|e| StorageError::Io(e.to_string()))?;
            if !key.starts_with(prefix) {
                break;
            }
            out.push((key.to_vec(), value.to_vec()));
        }
        Ok(out)
    }

    /// Apply every operation as one atomic `WriteBatch`. Crashing mid-apply
    /// reverts to the prior state on restart — the property the finalizer's
    /// step relies on.
    pub fn write_batch(&self, ops: Vec<BatchOp<'_>>) -> StorageResult<()> {
        let db = self.db.write();
        let mut batch = WriteBatch::default();
        for op in ops {
            match op {
                BatchOp::Put { column, key, value } => {
                    let cf = Self::cf_handle(&db, column)?;
                    batch.put_cf(cf, key, value);
                }
                BatchOp::Delete { column, key } => {
                    let cf = Self::cf_handle(&db, column)?;
                    batch.delete_cf(cf, key);
                }
            }
        }
        let mut write_opts = rocksdb::WriteOptions::default();
        write_opts.set_sync(self.config.sync_writes);
        db.write_opt(batch, &write_opts).map_err(|e| StorageError::Io(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::{CF_DAG_BLOCKS, CF_PBFT_HEAD};

    #[test]
    fn put_get_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = ColumnStore::open_ephemeral(dir.path()).unwrap();
        store.put(CF_DAG_BLOCKS, b"hash1", b"rlp-bytes").unwrap();
        assert_eq!(store.get(CF_DAG_BLOCKS, b"hash1").unwrap(), Some(b"rlp-bytes".to_vec()));
    }

    #[test]
    fn missing_key_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = ColumnStore::open_ephemeral(dir.path()).unwrap();
        assert_eq!(store.get(CF_DAG_BLOCKS, b"nope").unwrap(), None);
    }

    #[test]
    fn batch_spans_multiple_columns_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let store = ColumnStore::open_ephemeral(dir.path()).unwrap();
        store
            .write_batch(vec![
                BatchOp::Put { column: CF_DAG_BLOCKS, key: b"h1", value: b"a".to_vec() },
                BatchOp::Put { column: CF_PBFT_HEAD, key: b"0", value: b"b".to_vec() },
            ])
            .unwrap();
        assert_eq!(store.get(CF_DAG_BLOCKS, b"h1").unwrap(), Some(b"a".to_vec()));
        assert_eq!(store.get(CF_PBFT_HEAD, b"0").unwrap(), Some(b"b".to_vec()));
    }
}
