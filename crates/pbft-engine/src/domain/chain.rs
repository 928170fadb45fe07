//! The finalized `PbftChain` head — spec.md §3's head tuple, advanced by
//! the period finalizer once a period commits and read by the PBFT driver
//! to anchor the period it is currently deciding. One of spec.md §5's
//! three named shared resources (lock order: chain-head -> verified-votes
//! -> non-final-set).

use core_types::{ChainHead, Hash, Period};
use parking_lot::RwLock;

use crate::ports::outbound::ChainGateway;

pub struct PbftChain {
    head: RwLock<ChainHead>,
}

impl PbftChain {
    pub fn genesis() -> Self {
        Self { head: RwLock::new(ChainHead::genesis()) }
    }

    pub fn from_head(head: ChainHead) -> Self {
        Self { head: RwLock::new(head) }
    }

    pub fn head(&self) -> ChainHead {
        *self.head.read()
    }

    /// The period the driver should currently be deciding: one past the
    /// last finalized period.
    pub fn current_period(&self) -> Period {
        self.head.read().size + 1
    }

    pub fn last_anchor(&self) -> Hash {
        self.head.read().last_non_null_anchor_hash
    }

    /// Commit the next period's PBFT block, advancing the head. Called by
    /// the period finalizer as part of its atomic DB batch; the in-memory
    /// head update happens under the same lock acquisition the finalizer
    /// takes first (spec.md §5 lock order).
    pub fn advance(&self, block_hash: Hash, anchor_hash: Hash, fork_active: bool) {
        self.head.write().advance(block_hash, anchor_hash, fork_active);
    }
}

impl Default for PbftChain {
    fn default() -> Self {
        Self::genesis()
    }
}

/// Reads the currently committed anchor regardless of the requested
/// period — the driver only ever asks about the period it is actively
/// deciding, which is always one past the committed head.
impl ChainGateway for PbftChain {
    fn previous_anchor(&self, _period: Period) -> Hash {
        self.last_anchor()
    }
}
