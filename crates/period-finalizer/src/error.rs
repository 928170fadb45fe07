use core_types::Hash;
use thiserror::Error;

/// Everything that can keep a period from committing. Mirrors the
/// `AdmissionOutcome`-style split dag-engine uses: terminal variants halt
/// the finalizer (spec.md's "propagate to node supervisor, which must
/// refuse to advance"), transient ones leave the period retryable once the
/// missing dependency resolves.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FinalizeError {
    #[error("sub-dag block {0:?} referenced under the anchor is not locally available")]
    MissingSubDagBlock(Hash),
    #[error("transaction {0:?} referenced by a sub-dag block has no known body")]
    MissingTransaction(Hash),
    #[error("order_hash mismatch for period {period}: anchor declares {expected:?}, computed {computed:?}")]
    OrderHashMismatch { period: u64, expected: Hash, computed: Hash },
    #[error("state transition rejected period {period}: {reason}")]
    ConsensusError { period: u64, reason: String },
    #[error(transparent)]
    Persistence(#[from] core_storage::StorageError),
    #[error(transparent)]
    Types(#[from] core_types::TypesError),
}

impl FinalizeError {
    /// Terminal failures mean the period can never be finalized as
    /// proposed and the node must stop advancing rather than retry —
    /// `order_hash` mismatches and state-transition rejections are
    /// consensus-level disagreements, not local gaps. A missing sub-DAG
    /// block or transaction body is transient: the gossip layer may still
    /// deliver it, so the caller should retry once it does.
    pub fn is_terminal(&self) -> bool {
        match self {
            FinalizeError::MissingSubDagBlock(_) | FinalizeError::MissingTransaction(_) => false,
            FinalizeError::OrderHashMismatch { .. } | FinalizeError::ConsensusError { .. } => true,
            FinalizeError::Persistence(_) => true,
            FinalizeError::Types(_) => true,
        }
    }
}

pub type FinalizeResult<T> = Result<T, FinalizeError>;
