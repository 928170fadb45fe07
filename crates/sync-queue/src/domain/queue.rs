//! Period-ordered sync catch-up queue: peers hand us `PeriodData` records
//! out of band while we're behind, and this orders them so `core-node`
//! can pop and finalize strictly in period order, one at a time.

use std::collections::VecDeque;

use parking_lot::RwLock;

use core_types::{Period, PeriodData};

use crate::error::{SyncQueueError, SyncQueueResult};
use crate::ports::inbound::SyncQueueInbound;

pub struct QueueEntry {
    pub period: Period,
    pub node_id: String,
    pub data: PeriodData,
}

/// Thread-safe FIFO of periods awaiting finalization, gated so a period
/// is only ever accepted in strict sequence. `current_period` doubles as
/// both "the last period queued or applied" and, via `max_pbft_size`, a
/// way for a peer claiming a longer chain to reset the horizon we're
/// catching up toward.
pub struct SyncQueue {
    entries: RwLock<VecDeque<QueueEntry>>,
    current_period: RwLock<Period>,
}

impl SyncQueue {
    pub fn new(current_period: Period) -> Self {
        Self { entries: RwLock::new(VecDeque::new()), current_period: RwLock::new(current_period) }
    }

    /// Accept `data` for `period` from `node_id`, claiming the peer's
    /// chain reaches at least `max_pbft_size`. Accepted only if `period ==
    /// max(current_period, max_pbft_size) + 1`; if `max_pbft_size`
    /// exceeds what we're currently tracking, the queue is cleared first
    /// (whatever we'd queued against the old, shorter horizon is stale).
    pub fn push(
        &self,
        period: Period,
        node_id: String,
        data: PeriodData,
        max_pbft_size: Period,
    ) -> SyncQueueResult<()> {
        let mut current = self.current_period.write();
        let mut entries = self.entries.write();

        if max_pbft_size > *current {
            entries.clear();
            *current = max_pbft_size;
        }

        let expected = *current + 1;
        if period != expected {
            return Err(SyncQueueError::OutOfOrder { offered: period, expected });
        }

        entries.push_back(QueueEntry { period, node_id, data });
        *current = period;
        Ok(())
    }

    /// Remove and return the head of the queue, the next period ready to
    /// be finalized.
    pub fn pop(&self) -> Option<QueueEntry> {
        self.entries.write().pop_front()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn current_period(&self) -> Period {
        *self.current_period.read()
    }

    /// Resync to the chain's real head after a period finalizes through
    /// the live-consensus path rather than through this queue (so a later
    /// push's `expected` reflects actual progress, not stale queue state).
    pub fn set_current_period(&self, period: Period) {
        *self.current_period.write() = period;
    }
}

impl SyncQueueInbound for SyncQueue {
    fn on_period_data(
        &self,
        period: Period,
        node_id: String,
        data: PeriodData,
        max_pbft_size: Period,
    ) -> SyncQueueResult<()> {
        self.push(period, node_id, data, max_pbft_size)
    }
}
