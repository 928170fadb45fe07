//! Driving ports: how the (out-of-scope) peer layer calls into the DAG
//! manager. `core-node` wires its packet handlers to these.

use core_types::{DagBlock, Hash};

use crate::error::DagResult;

/// Handlers the peer layer invokes. `peer` is an opaque peer identifier the
/// implementation uses for demerit scoring — this core only returns
/// whether to demerit, not how.
pub trait DagInbound: Send + Sync {
    fn on_dag_block(&self, block: DagBlock, peer: &str) -> DagResult<()>;

    /// Stream back the DAG blocks and transactions `peer` is missing,
    /// given the hashes it already has.
    fn on_get_dag_sync(&self, peer: &str, peer_period_hint: u64, known_hashes: &[Hash]) -> Vec<DagBlock>;
}
