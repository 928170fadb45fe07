//! Driven ports: collaborators `dag-engine` calls out through. Both are
//! implemented elsewhere in the node (the DPoS accounting and mempool
//! internals are explicitly out of scope for this core) and injected as
//! trait objects so admission and proposal stay unit-testable without a
//! real state-transition engine or transaction pool.

use core_types::{Address, Hash, Period, Transaction};

/// The slice of `StateAPI` the DAG layer needs: proposer/sender
/// eligibility under DPoS at a given period.
pub trait DposGateway: Send + Sync {
    fn dpos_is_eligible(&self, address: &Address, period: Period) -> bool;
}

/// The slice of the transaction pool's admission interface the DAG layer
/// needs: existence checks and lookup for blocks referencing transaction
/// hashes, and packing for the proposer.
pub trait MempoolGateway: Send + Sync {
    fn is_known(&self, hash: &Hash) -> bool;
    fn get(&self, hash: &Hash) -> Option<Transaction>;
    /// Candidate transactions available for packing, already pool-verified,
    /// in the pool's internal priority order. The proposer applies shard
    /// selection, gas-sum, and `transaction_limit` filtering on top.
    fn pack(&self, max_candidates: usize) -> Vec<(Hash, Transaction, u64)>;
    fn is_empty(&self) -> bool;
}

/// What `period-finalizer` already committed, queried by hash/level rather
/// than by period — admission needs to know whether a pivot or tip the
/// non-final set no longer holds was finalized (and at what level) or was
/// never seen at all.
pub trait FinalizedDagGateway: Send + Sync {
    fn level_of(&self, hash: &Hash) -> Option<u64>;
    fn is_finalized(&self, hash: &Hash) -> bool;
}
