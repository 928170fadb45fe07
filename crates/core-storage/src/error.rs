use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("unknown column family: {0}")]
    UnknownColumn(&'static str),

    #[error("rocksdb io error: {0}")]
    Io(String),

    #[error("bincode (de)serialization error: {0}")]
    Codec(#[from] bincode::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;
