//! # core-storage
//!
//! RocksDB column-family persistence adapter implementing the logical
//! columns the engine crates rely on, consumed by `period-finalizer`,
//! `dag-engine`, `vote-manager` and `sync-queue` as their storage port.

pub mod columns;
pub mod error;
pub mod store;

pub use columns::ALL_COLUMN_FAMILIES;
pub use error::{StorageError, StorageResult};
pub use store::{BatchOp, ColumnStore, StorageConfig};
