//! `PbftChain` head tuple,, non_empty_size,
//! last_pbft_block_hash, last_non_null_anchor_hash,
//! second_last_pbft_block_hash[optional])`.

use serde::{Deserialize, Serialize};

use crate::primitives::{Hash, Period, NULL_HASH};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainHead {
    /// Number of finalized periods so far. Period numbers are `1..=size`.
    pub size: Period,
    /// Count of periods whose anchor was non-null.
    pub non_empty_size: Period,
    pub last_pbft_block_hash: Hash,
    pub last_non_null_anchor_hash: Hash,
    /// `(period, hash)` of the second-to-last PBFT block, populated only
    /// at/after the pillar-chain hard fork height (the
    /// "Optional `second_last_pbft_block_hash`"). `None` before the fork
    /// and at genesis.
    pub second_last_pbft_block: Option<(Period, Hash)>,
}

impl ChainHead {
    pub fn genesis() -> Self {
        Self {
            size: 0,
            non_empty_size: 0,
            last_pbft_block_hash: NULL_HASH,
            last_non_null_anchor_hash: NULL_HASH,
            second_last_pbft_block: None,
        }
    }

    /// Advance the head after committing a new PBFT block. `fork_active`
    /// gates whether `second_last_pbft_block` starts being populated —
    /// it stays `None` until the fork activates.
    pub fn advance(&mut self, block_hash: Hash, anchor_hash: Hash, fork_active: bool) {
        let previous_last = self.last_pbft_block_hash;
        let previous_size = self.size;
        self.size += 1;
        if anchor_hash != NULL_HASH {
            self.non_empty_size += 1;
            self.last_non_null_anchor_hash = anchor_hash;
        }
        if fork_active && previous_size > 0 {
            self.second_last_pbft_block = Some((previous_size, previous_last));
        }
        self.last_pbft_block_hash = block_hash;
    }
}
