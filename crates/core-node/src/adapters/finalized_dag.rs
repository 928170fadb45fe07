//! `StorageFinalizedDag`: `dag_engine::FinalizedDagGateway` backed by the
//! `dag_blocks` column family. Once a period finalizes, `PeriodFinalizer`
//! writes every one of its DAG blocks there and evicts them from
//! `DagManager`'s non-final set — this adapter is how admission still
//! answers "do I know this hash, and at what level" for blocks that have
//! already crossed that boundary.

use std::sync::Arc;

use core_storage::columns::CF_DAG_BLOCKS;
use core_storage::ColumnStore;
use core_types::{DagBlock, Hash, Level};

pub struct StorageFinalizedDag {
    store: Arc<ColumnStore>,
}

impl StorageFinalizedDag {
    pub fn new(store: Arc<ColumnStore>) -> Self {
        Self { store }
    }
}

impl dag_engine::FinalizedDagGateway for StorageFinalizedDag {
    fn level_of(&self, hash: &Hash) -> Option<Level> {
        let bytes = self.store.get(CF_DAG_BLOCKS, hash).ok().flatten()?;
        DagBlock::decode_rlp(&bytes).ok().map(|block| block.level)
    }

    fn is_finalized(&self, hash: &Hash) -> bool {
        matches!(self.store.get(CF_DAG_BLOCKS, hash), Ok(Some(_)))
    }
}
