//! Driving ports: how `core-node`'s sync catch-up path calls into the
//! finalizer. The live-consensus path doesn't need one of these — it
//! drives the finalizer through `pbft_engine::FinalizationGateway`
//! instead, which this crate also implements.

use async_trait::async_trait;
use core_types::PeriodData;

use crate::error::FinalizeResult;

/// Apply an already-assembled `PeriodData` record received during sync
/// catch-up (spec.md's `request_period_data`/fast-forward path): the
/// ordering is taken as given rather than re-derived from the local
/// sub-DAG, but `order_hash` is still recomputed and checked before the
/// state transition runs.
#[async_trait]
pub trait PeriodFinalizerInbound: Send + Sync {
    async fn finalize_period_data(&self, period_data: PeriodData) -> FinalizeResult<()>;
}
