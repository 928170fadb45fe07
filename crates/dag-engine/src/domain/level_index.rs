use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use core_types::Hash;

use super::admission::DagBlockRecord;

/// Bound on the "known invalid" set. The original C++ keeps this unbounded;
/// nothing in the testable-property set requires unbounded retention, so
/// this core evicts oldest-first past the bound (see DESIGN.md).
const MAX_KNOWN_INVALID: usize = 100_000;

/// The non-finalized DAG working set: blocks admitted as `Seen`/`NonFinal`,
/// indexed by hash and by level for `O(log n)` frontier candidate
/// enumeration, plus a bounded record of hashes known to be permanently
/// invalid so repeated gossip of the same bad block is rejected in O(1)
/// without re-verification.
#[derive(Default)]
pub struct NonFinalSet {
    by_hash: HashMap<Hash, DagBlockRecord>,
    by_level: BTreeMap<u64, HashSet<Hash>>,
    seen: HashSet<Hash>,
    invalid: HashSet<Hash>,
    invalid_order: VecDeque<Hash>,
}

impl NonFinalSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_seen(&mut self, hash: Hash) -> bool {
        self.seen.insert(hash)
    }

    /// Undo `mark_seen` for a block that failed validation transiently
    /// (missing parent/tx, future period), so a later re-delivery once the
    /// dependency resolves is re-validated instead of short-circuited as
    /// `AlreadyKnown`.
    pub fn unmark_seen(&mut self, hash: &Hash) {
        self.seen.remove(hash);
    }

    pub fn is_seen(&self, hash: &Hash) -> bool {
        self.seen.contains(hash)
    }

    pub fn is_known(&self, hash: &Hash) -> bool {
        self.by_hash.contains_key(hash) || self.invalid.contains(hash)
    }

    pub fn is_invalid(&self, hash: &Hash) -> bool {
        self.invalid.contains(hash)
    }

    pub fn mark_invalid(&mut self, hash: Hash) {
        if self.invalid.insert(hash) {
            self.invalid_order.push_back(hash);
            if self.invalid_order.len() > MAX_KNOWN_INVALID {
                if let Some(oldest) = self.invalid_order.pop_front() {
                    self.invalid.remove(&oldest);
                }
            }
        }
    }

    pub fn insert(&mut self, record: DagBlockRecord) {
        let hash = record.hash();
        let level = record.level();
        self.by_level.entry(level).or_default().insert(hash);
        self.by_hash.insert(hash, record);
    }

    pub fn get(&self, hash: &Hash) -> Option<&DagBlockRecord> {
        self.by_hash.get(hash)
    }

    pub fn contains(&self, hash: &Hash) -> bool {
        self.by_hash.contains_key(hash)
    }

    pub fn max_level(&self) -> u64 {
        self.by_level.keys().next_back().copied().unwrap_or(0)
    }

    /// Hashes at a given level, for pivot/tip candidate enumeration.
    pub fn at_level(&self, level: u64) -> impl Iterator<Item = &Hash> {
        self.by_level.get(&level).into_iter().flatten()
    }

    /// Current leaves: blocks at `max_level` with no in-set child (a block
    /// in this set referencing them as pivot or tip).
    pub fn leaves(&self) -> Vec<Hash> {
        let mut referenced: HashSet<Hash> = HashSet::new();
        for record in self.by_hash.values() {
            referenced.insert(record.block.pivot);
            referenced.extend(record.block.tips.iter().copied());
        }
        self.by_hash
            .keys()
            .copied()
            .filter(|h| !referenced.contains(h))
            .collect()
    }

    /// Remove a finalized sub-DAG from the working set, returning the
    /// removed records so the caller can re-home them to persistent
    /// storage.
    pub fn remove_finalized(&mut self, hashes: &[Hash]) -> Vec<DagBlockRecord> {
        let mut removed = Vec::with_capacity(hashes.len());
        for hash in hashes {
            if let Some(record) = self.by_hash.remove(hash) {
                if let Some(bucket) = self.by_level.get_mut(&record.level()) {
                    bucket.remove(hash);
                    if bucket.is_empty() {
                        self.by_level.remove(&record.level());
                    }
                }
                removed.push(record);
            }
        }
        removed
    }

    pub fn iter(&self) -> impl Iterator<Item = &DagBlockRecord> {
        self.by_hash.values()
    }

    pub fn len(&self) -> usize {
        self.by_hash.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_hash.is_empty()
    }
}
