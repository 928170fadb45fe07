use core_types::Hash;
use thiserror::Error;

/// Why a DAG block was rejected or deferred at admission. Mirrors the
/// `AdmissionOutcome` set: each variant is either terminal (the block hash
/// is marked invalid and never re-verified) or transient (the block stays
/// out of the non-final set but is retried once its dependency resolves).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DagError {
    #[error("block {0:?} already known")]
    AlreadyKnown(Hash),
    #[error("block {0:?} references an unresolved parent")]
    MissingParent(Hash),
    #[error("block {0:?} references an unresolved transaction")]
    MissingTx(Hash),
    #[error("block {0:?} has an invalid VDF solution")]
    VdfInvalid(Hash),
    #[error("block {0:?} sender is not DPoS-eligible at its proposal period")]
    NotEligible(Hash),
    #[error("block {0:?} gas estimations exceed the proposal period's DAG gas limit")]
    GasOverLimit(Hash),
    #[error("block {0:?} has mismatched transactions/gas_estimations length")]
    MismatchedEstimations(Hash),
    #[error("block {0:?} level is already covered by a finalized period")]
    TooOld(Hash),
    #[error("block {0:?} level maps to a period beyond the current DPoS horizon")]
    FuturePeriod(Hash),
    #[error("block {0:?} structural invariant violated: {reason}")]
    InvalidStructure { hash: Hash, reason: String },
    #[error("signature recovery failed for block {0:?}")]
    InvalidSignature(Hash),
    #[error(transparent)]
    Types(#[from] core_types::TypesError),
}

impl DagError {
    /// Terminal failures blacklist the block hash and demerit the sending
    /// peer; transient ones keep the block out of the non-final set without
    /// blacklisting it.
    pub fn is_terminal(&self) -> bool {
        match self {
            DagError::MissingParent(_) | DagError::MissingTx(_) | DagError::FuturePeriod(_) => {
                false
            }
            DagError::AlreadyKnown(_) => false,
            _ => true,
        }
    }
}

pub type DagResult<T> = Result<T, DagError>;
