use core_types::Hash;
use thiserror::Error;

/// Vote-shaped failures — spec.md §7. Round/step transition and
/// finalization-trigger failures belong to `pbft-engine`; this crate only
/// owns verification and indexing failures for individual votes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VoteError {
    #[error("vote {0:?} already indexed")]
    AlreadyKnown(Hash),
    #[error("vote {0:?} signature recovery failed")]
    InvalidSignature(Hash),
    #[error("vote {0:?} vrf proof does not verify")]
    InvalidVrfProof(Hash),
    #[error("vote {0:?} votes the null hash outside a `next` step")]
    NullHashViolation(Hash),
    #[error("voter for vote {0:?} has zero weight for this period")]
    NotEligible(Hash),
    #[error("voter for vote {0:?} has no registered vrf key for this period")]
    UnknownVoter(Hash),
    /// The same voter already cast a different vote for the same
    /// `(period, round, step)` slot — an equivocation, not a retryable
    /// failure; the second vote is rejected and `CoreEvent::Equivocation`
    /// is published.
    #[error("double vote detected for {0:?}")]
    DoubleVote(Hash),
    #[error(transparent)]
    Types(#[from] core_types::TypesError),
}

impl VoteError {
    /// `AlreadyKnown` is the only transient outcome (a race between two
    /// deliveries of the same vote, not a fault); everything else
    /// blacklists the vote hash.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, VoteError::AlreadyKnown(_))
    }
}

pub type VoteResult<T> = Result<T, VoteError>;
