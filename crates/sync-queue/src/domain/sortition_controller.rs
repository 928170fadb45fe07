//! Sortition-parameter controller: adjusts `vrf_threshold_upper` so the
//! DAG's observed transaction efficiency (unique transactions per unit of
//! `dag_gas_limit`) tracks a target band, the same weighted-rolling-window
//! shape `qc-17-block-production`'s `DifficultyWindowCalculator` uses for
//! DGW difficulty retargeting — generalized here from a block-interval
//! target to a throughput-efficiency target.

use std::collections::VecDeque;

use core_types::SortitionParams;

use crate::config::SortitionControllerConfig;

pub struct SortitionController {
    config: SortitionControllerConfig,
    window: VecDeque<f64>,
    periods_since_change: u64,
    current: SortitionParams,
}

impl SortitionController {
    pub fn new(config: SortitionControllerConfig, initial: SortitionParams) -> Self {
        Self { config, window: VecDeque::new(), periods_since_change: 0, current: initial }
    }

    pub fn current(&self) -> SortitionParams {
        self.current
    }

    /// Record one finalized period's `(unique_transactions, dag_gas_limit)`
    /// sample. Every `changing_interval` periods, compares the window's
    /// average efficiency against the target band and nudges
    /// `vrf_threshold_upper` by a bounded step — down (fewer blocks pass
    /// sortition, easing the DAG) if it's running under-full, up (more
    /// blocks pass) if it's oversaturated.
    /// Returns the (possibly adjusted) parameters the next period's
    /// sortition should use.
    pub fn observe_period(&mut self, unique_transactions: u64, dag_gas_limit: u64) -> SortitionParams {
        let efficiency = if dag_gas_limit == 0 {
            0.0
        } else {
            unique_transactions as f64 / dag_gas_limit as f64
        };
        self.window.push_back(efficiency);
        while self.window.len() > self.config.window_size {
            self.window.pop_front();
        }

        self.periods_since_change += 1;
        if self.periods_since_change >= self.config.changing_interval {
            self.periods_since_change = 0;
            let average = self.window.iter().sum::<f64>() / self.window.len() as f64;

            let mut threshold_upper = self.current.vrf_threshold_upper;
            if average < self.config.dag_efficiency_target_lower {
                threshold_upper = threshold_upper.saturating_sub(self.config.threshold_upper_step);
            } else if average > self.config.dag_efficiency_target_upper {
                threshold_upper = threshold_upper.saturating_add(self.config.threshold_upper_step);
            }
            self.current.vrf_threshold_upper =
                threshold_upper.clamp(self.config.threshold_upper_min, self.config.threshold_upper_max);
        }

        self.current
    }
}
