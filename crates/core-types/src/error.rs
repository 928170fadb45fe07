//! Typed decode/validation errors for the wire types in this crate. Callers
//! that need subsystem-specific admission semantics (e.g. `dag-engine`'s
//! `AdmissionResult`) wrap these rather than re-deriving them.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypesError {
    #[error("rlp decode failed: {0}")]
    Rlp(#[from] alloy_rlp::Error),

    #[error("{field} length mismatch: expected {expected}, got {actual}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("duplicate entry in {field}")]
    DuplicateEntry { field: &'static str },

    #[error("transactions and gas_estimations length mismatch: {tx_len} vs {gas_len}")]
    MismatchedEstimations { tx_len: usize, gas_len: usize },

    #[error("invalid signature encoding")]
    InvalidSignature,
}

pub type TypesResult<T> = Result<T, TypesError>;
