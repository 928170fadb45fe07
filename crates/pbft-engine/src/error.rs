use core_types::{Hash, Period};
use thiserror::Error;

/// PBFT-layer failures — spec.md §7. Vote-shaped failures (bad signature,
/// bad VRF proof, stale nonce) belong to `vote-manager`; this crate only
/// owns round/step transition and finalization-trigger failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PbftError {
    #[error("pbft block for period {0} references a round/step this node has already passed")]
    StaleBlock(Period),
    #[error("pbft block {0:?} has an invalid structure: {1}")]
    InvalidStructure(Hash, String),
    #[error("pbft block {0:?} signature recovery failed")]
    InvalidSignature(Hash),
    #[error("pbft block {0:?} anchor is not locally buildable")]
    AnchorNotBuildable(Hash),
    /// Two concrete block hashes both observed 2t+1 cert votes in period
    /// `period` — surfaced to the slashing collaborator; this node
    /// continues with `canonical` and only halts if it cast both votes
    /// itself.
    #[error("chain fork in period {period}: {canonical:?} vs {other:?}")]
    ChainFork { period: Period, canonical: Hash, other: Hash },
    #[error(transparent)]
    Types(#[from] core_types::TypesError),
}

impl PbftError {
    /// `ChainFork` is never terminal for the node itself (§7: "continue
    /// with the locally-canonical certification; halt only if equivocation
    /// is our own" — detecting our own equivocation is a wiring-level
    /// concern in `core-node`, not this crate).
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PbftError::ChainFork { .. })
    }
}

pub type PbftResult<T> = Result<T, PbftError>;
