/// `sortition.changing_interval` plus the DGW-style rolling window this
/// controller is generalized from (`qc-17-block-production`'s
/// `DifficultyWindowConfig`).
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SortitionControllerConfig {
    /// Rolling window length, in periods, the efficiency average is taken
    /// over.
    pub window_size: usize,
    /// `sortition.changing_interval`: periods between threshold_upper
    /// adjustments.
    pub changing_interval: u64,
    /// `sortition.dag_efficiency_targets[0]`.
    pub dag_efficiency_target_lower: f64,
    /// `sortition.dag_efficiency_targets[1]`.
    pub dag_efficiency_target_upper: f64,
    pub threshold_upper_step: u32,
    pub threshold_upper_min: u32,
    pub threshold_upper_max: u32,
}

impl Default for SortitionControllerConfig {
    fn default() -> Self {
        Self {
            window_size: 10,
            changing_interval: 5,
            dag_efficiency_target_lower: 0.75,
            dag_efficiency_target_upper: 0.95,
            threshold_upper_step: 1 << 26,
            threshold_upper_min: 1 << 20,
            threshold_upper_max: u32::MAX,
        }
    }
}

impl SortitionControllerConfig {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.window_size == 0 {
            return Err("sortition controller window_size must be non-zero");
        }
        if self.changing_interval == 0 {
            return Err("sortition.changing_interval must be non-zero");
        }
        if self.dag_efficiency_target_lower >= self.dag_efficiency_target_upper {
            return Err("dag_efficiency_targets lower bound must be < upper bound");
        }
        if self.threshold_upper_min > self.threshold_upper_max {
            return Err("threshold_upper_min must be <= threshold_upper_max");
        }
        Ok(())
    }
}
