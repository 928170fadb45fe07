//! Sub-DAG collection and deterministic transaction ordering: the part of
//! the algorithm every honest node must compute bit-for-bit identically,
//! since its output (`order_hash`) is what the anchor's `PbftBlock`
//! attests to.

use std::collections::{HashSet, VecDeque};

use alloy_rlp::Encodable;
use core_crypto::hashing::keccak256;
use core_types::{DagBlock, Hash, NULL_HASH};

use crate::error::{FinalizeError, FinalizeResult};

/// A callback-style view over the DAG layer, narrow enough to keep this
/// module free of any dependency on `dag-engine`'s own types.
pub trait SubDagLookup {
    fn get(&self, hash: &Hash) -> Option<DagBlock>;
    fn is_finalized(&self, hash: &Hash) -> bool;
}

/// Walk `pivot ∪ tips` back from `anchor` until every branch hits either
/// the null hash or a block already finalized by a previous period,
/// collecting every block strictly between. Ordered level-major,
/// hash-minor on return — the canonical order transactions are replayed
/// in.
pub fn collect_sub_dag(lookup: &dyn SubDagLookup, anchor: Hash) -> FinalizeResult<Vec<DagBlock>> {
    let mut visited: HashSet<Hash> = HashSet::new();
    let mut queue: VecDeque<Hash> = VecDeque::new();
    let mut collected: Vec<DagBlock> = Vec::new();

    visited.insert(anchor);
    queue.push_back(anchor);

    while let Some(hash) = queue.pop_front() {
        if hash == NULL_HASH || lookup.is_finalized(&hash) {
            continue;
        }
        let block = lookup.get(&hash).ok_or(FinalizeError::MissingSubDagBlock(hash))?;

        let mut parents = Vec::with_capacity(1 + block.tips.len());
        parents.push(block.pivot);
        parents.extend(block.tips.iter().copied());
        for parent in parents {
            if visited.insert(parent) {
                queue.push_back(parent);
            }
        }

        collected.push(block);
    }

    collected.sort_by(|a, b| a.level.cmp(&b.level).then_with(|| a.hash().cmp(&b.hash())));
    Ok(collected)
}

/// Per-proposer count of transactions it was the first block (in
/// collection order) to contribute this period — the input to the
/// proposer side of the rewards tally.
pub type ProposerContribution = (core_types::Address, u64);

/// Flatten `ordered_blocks`' transaction hash lists into one deduplicated,
/// order-preserving sequence, plus which dag block first contributed each
/// surviving hash (for the rewards tally).
pub fn order_and_dedupe_transactions(ordered_blocks: &[DagBlock]) -> (Vec<Hash>, Vec<usize>) {
    let mut seen: HashSet<Hash> = HashSet::new();
    let mut ordered = Vec::new();
    let mut contributor_index = Vec::new();

    for (index, block) in ordered_blocks.iter().enumerate() {
        for tx_hash in &block.transactions {
            if seen.insert(*tx_hash) {
                ordered.push(*tx_hash);
                contributor_index.push(index);
            }
        }
    }

    (ordered, contributor_index)
}

/// `Keccak256(RLP(ordered_tx_hashes))` — the value the anchor's
/// `PbftBlock::order_hash` must equal for the period to commit.
pub fn order_hash(ordered_tx_hashes: &[Hash]) -> Hash {
    let mut buf = Vec::with_capacity(ordered_tx_hashes.len() * 33 + 4);
    ordered_tx_hashes.encode(&mut buf);
    keccak256(&buf)
}
