//! `DagCandidateAdapter`: `pbft_engine::DagCandidateGateway` over a shared
//! `DagManager`. PBFT never mutates the DAG through this port — it only
//! asks "what would I propose" and "can I actually build this anchor".

use std::sync::Arc;

use core_types::{Hash, NULL_HASH};
use dag_engine::DagManager;

pub struct DagCandidateAdapter {
    dag: Arc<DagManager>,
}

impl DagCandidateAdapter {
    pub fn new(dag: Arc<DagManager>) -> Self {
        Self { dag }
    }
}

impl pbft_engine::DagCandidateGateway for DagCandidateAdapter {
    fn heaviest_candidate(&self, previous_anchor: Hash) -> Option<Hash> {
        let frontier = self.dag.frontier(previous_anchor);
        if frontier.pivot == previous_anchor {
            None
        } else {
            Some(frontier.pivot)
        }
    }

    /// Walk `block_hash`'s pivot chain back toward `previous_anchor`,
    /// requiring every block on the path to be locally known. This is a
    /// cheaper proxy for "the full sub-DAG under `block_hash` back to the
    /// anchor is available" than a full BFS — good enough for the `soft`
    /// and `cert` steps, which only need to know a build attempt won't
    /// immediately stall; the finalizer's own sub-DAG BFS is the final,
    /// authoritative buildability check once `2t+1 cert` actually fires.
    fn is_buildable(&self, block_hash: &Hash, previous_anchor: &Hash) -> bool {
        if block_hash == previous_anchor {
            return true;
        }
        let mut current = *block_hash;
        loop {
            if current == *previous_anchor || current == NULL_HASH {
                return true;
            }
            let Some(block) = self.dag.get_block(&current) else {
                return self.dag.is_known(&current);
            };
            current = block.pivot;
        }
    }
}
