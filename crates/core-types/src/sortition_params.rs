//! Per-period sortition parameters driving VDF-difficulty / VRF-threshold
//! classification for DAG block proposal.

use alloy_rlp::{RlpDecodable, RlpEncodable};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, RlpEncodable, RlpDecodable, Serialize, Deserialize)]
pub struct SortitionParams {
    pub vdf_difficulty_min: u16,
    pub vdf_difficulty_max: u16,
    pub vdf_difficulty_stale: u16,
    pub vdf_lambda_bound: u16,
    pub vrf_threshold_upper: u32,
    /// The sub-range of the VRF output space, below `threshold_upper`, that
    /// requires no VDF computation at all (the `omit` class). This field
    /// doubles as that omit cutoff rather than naming a separate threshold
    /// (see `DESIGN.md`).
    pub vrf_threshold_range: u32,
}

impl SortitionParams {
    pub fn threshold_omit(&self) -> u32 {
        self.vrf_threshold_range
    }

    /// Classify a raw VRF threshold value into a proposal-difficulty
    /// outcome: omit, stale, or normal with a derived difficulty.
    pub fn classify(&self, threshold: u32) -> VdfClass {
        if threshold <= self.threshold_omit() {
            VdfClass::Omit
        } else if threshold > self.vrf_threshold_upper {
            VdfClass::Stale { difficulty: self.vdf_difficulty_stale }
        } else {
            let span = (self.vdf_difficulty_max - self.vdf_difficulty_min).max(1) as u32;
            let difficulty = self.vdf_difficulty_min as u32 + threshold % span;
            VdfClass::Normal { difficulty: difficulty as u16 }
        }
    }
}

impl Default for SortitionParams {
    fn default() -> Self {
        Self {
            vdf_difficulty_min: 15,
            vdf_difficulty_max: 21,
            vdf_difficulty_stale: 25,
            vdf_lambda_bound: 100,
            vrf_threshold_upper: (1 << 30),
            vrf_threshold_range: (1 << 20),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VdfClass {
    Omit,
    Stale { difficulty: u16 },
    Normal { difficulty: u16 },
}

impl VdfClass {
    pub fn difficulty(&self) -> u16 {
        match self {
            VdfClass::Omit => 0,
            VdfClass::Stale { difficulty } | VdfClass::Normal { difficulty } => *difficulty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_omit_below_range() {
        let p = SortitionParams::default();
        assert_eq!(p.classify(10), VdfClass::Omit);
    }

    #[test]
    fn classifies_stale_above_upper() {
        let p = SortitionParams::default();
        let c = p.classify(p.vrf_threshold_upper + 1);
        assert_eq!(c, VdfClass::Stale { difficulty: p.vdf_difficulty_stale });
    }

    #[test]
    fn classifies_normal_within_band_bounded_by_span() {
        let p = SortitionParams::default();
        let c = p.classify(p.vrf_threshold_range + 1);
        match c {
            VdfClass::Normal { difficulty } => {
                assert!(difficulty >= p.vdf_difficulty_min && difficulty < p.vdf_difficulty_max);
            }
            _ => panic!("expected normal"),
        }
    }
}
