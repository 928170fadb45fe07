//! Driving port: how the (out-of-scope) peer layer hands us catch-up
//! `PeriodData` records. `core-node` wires its packet handler to this.

use core_types::{Period, PeriodData};

use crate::error::SyncQueueResult;

pub trait SyncQueueInbound: Send + Sync {
    fn on_period_data(
        &self,
        period: Period,
        node_id: String,
        data: PeriodData,
        max_pbft_size: Period,
    ) -> SyncQueueResult<()>;
}
