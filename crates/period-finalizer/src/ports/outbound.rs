//! Driven ports: collaborators the finalizer calls out through. DAG/PBFT
//! chain state, reward-vote bookkeeping and persistence are all already
//! owned by sibling crates this crate depends on directly
//! (`dag_engine::DagManager`, `pbft_engine::PbftChain`,
//! `vote_manager::VoteManager`, `core_storage::ColumnStore`) — the only
//! genuinely external collaborator is the state-transition engine itself,
//! out of scope here and reached only through this port.

use async_trait::async_trait;
use core_types::{DagBlock, Hash, Period, Transaction};

use crate::error::FinalizeResult;

/// The mempool's view from the finalizer's side: resolve a DAG block's
/// transaction hashes to their bodies. A separate port from dag-engine's
/// own `MempoolGateway` because the finalizer needs bodies for blocks that
/// have already left dag-engine's in-memory set mid-BFS.
pub trait TransactionPoolGateway: Send + Sync {
    fn get(&self, hash: &Hash) -> Option<Transaction>;
}

/// The header fields the state-transition engine needs to execute a
/// period's ordered transactions against.
#[derive(Clone, Debug)]
pub struct PeriodHeader {
    pub period: Period,
    pub anchor_hash: Hash,
    pub timestamp: u64,
}

/// What executing a period yields back: the resulting state commitment
/// and one receipt hash per ordered transaction, in order.
#[derive(Clone, Debug)]
pub struct StateTransitionOutcome {
    pub state_root: Hash,
    pub receipt_hashes: Vec<Hash>,
}

/// The pluggable state-transition collaborator (spec.md's "StateAPI"):
/// applies a period's ordered transactions against the ledger state. A
/// rejected transition is a consensus-level failure, not a local one —
/// every honest node computed the same ordering, so a transition error
/// here means this node's state diverges from the network's and it must
/// stop rather than guess.
#[async_trait]
pub trait StateApiGateway: Send + Sync {
    async fn transition_state(
        &self,
        header: &PeriodHeader,
        transactions: &[Transaction],
        dag_blocks: &[DagBlock],
    ) -> FinalizeResult<StateTransitionOutcome>;
}
