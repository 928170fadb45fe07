//! DAG-level → PBFT-period mapping (`proposal_period_for_level`).
//!
//! The map is a monotonically growing sequence of level bands, each pinned
//! to the PBFT period whose sub-DAG is permitted to contain a block at
//! those levels. It starts with a single genesis band and grows one band
//! at a time as periods finalize and the DAG's observed `max_level` climbs
//! past the current ceiling — never shrinks, never reorders.

use core_types::{Level, Period};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct LevelBand {
    period: Period,
    /// Inclusive upper bound on levels this band covers. Levels `1..=end`
    /// of the first band, `(previous.end+1)..=end` for later bands.
    level_end: Level,
}

/// Monotonic, append-only level→period mapping. Persisted 1:1 with the
/// `proposal_period_dag_levels` column (`level -> period`); this struct is
/// the in-memory working copy a `ColumnStore`-backed adapter hydrates at
/// startup and appends to as periods finalize.
#[derive(Clone, Debug)]
pub struct ProposalPeriodMap {
    bands: Vec<LevelBand>,
    max_levels_per_period: Level,
}

impl ProposalPeriodMap {
    /// A fresh map for a genesis node: one band covering levels
    /// `1..=max_levels_per_period`, assigned to period `1`.
    pub fn genesis(max_levels_per_period: Level) -> Self {
        Self {
            bands: vec![LevelBand { period: 1, level_end: max_levels_per_period.max(1) }],
            max_levels_per_period: max_levels_per_period.max(1),
        }
    }

    /// Reconstruct from the persisted `(period, level_end)` pairs, in
    /// ascending period order.
    pub fn from_entries(entries: Vec<(Period, Level)>, max_levels_per_period: Level) -> Self {
        Self {
            bands: entries.into_iter().map(|(period, level_end)| LevelBand { period, level_end }).collect(),
            max_levels_per_period: max_levels_per_period.max(1),
        }
    }

    /// All persisted `(period, level_end)` entries, for the storage
    /// adapter to write into `proposal_period_dag_levels`.
    pub fn entries(&self) -> Vec<(Period, Level)> {
        self.bands.iter().map(|b| (b.period, b.level_end)).collect()
    }

    /// The PBFT period whose sub-DAG may contain a block at `level`.
    /// `None` means the level is beyond the map's current horizon — the
    /// admission caller should treat this as `future_period`.
    pub fn proposal_period_for_level(&self, level: Level) -> Option<Period> {
        self.bands.iter().find(|b| level <= b.level_end).map(|b| b.period)
    }

    pub fn top_period(&self) -> Period {
        self.bands.last().map(|b| b.period).unwrap_or(1)
    }

    pub fn top_level_end(&self) -> Level {
        self.bands.last().map(|b| b.level_end).unwrap_or(0)
    }

    /// Called when period `finalized_period` commits with an observed DAG
    /// `max_level`. Appends one new band per `max_levels_per_period`-sized
    /// jump the finalization covers, each pinned to the next period after
    /// `finalized_period` in turn — a single slow-growing DAG appends at
    /// most one band per finalization; a burst of levels (e.g. after sync
    /// catch-up) can append several at once.
    pub fn on_period_finalized(&mut self, finalized_period: Period, max_level: Level) {
        let mut next_period = finalized_period + 1;
        while self.top_level_end() + self.max_levels_per_period <= max_level {
            let level_end = self.top_level_end() + self.max_levels_per_period;
            self.bands.push(LevelBand { period: next_period, level_end });
            next_period += 1;
        }
    }
}
