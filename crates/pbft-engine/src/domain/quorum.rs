//! Byzantine quorum threshold — spec.md §4.3: `2t+1 = floor(2*total/3)+1`.

/// The Byzantine quorum weight over `total_eligible_votes`. Recomputed on
/// every period change since `total_eligible_votes` is itself per-period.
pub fn two_t_plus_one(total_eligible_votes: u64) -> u64 {
    (2 * total_eligible_votes) / 3 + 1
}

/// `true` once `aggregate_weight` reaches the quorum for `total_eligible_votes`.
pub fn quorum_reached(aggregate_weight: u64, total_eligible_votes: u64) -> bool {
    aggregate_weight >= two_t_plus_one(total_eligible_votes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quorum_is_two_thirds_plus_one() {
        assert_eq!(two_t_plus_one(21), 15);
        assert_eq!(two_t_plus_one(1), 1);
        assert_eq!(two_t_plus_one(0), 1);
    }

    #[test]
    fn reached_only_at_or_above_threshold() {
        assert!(!quorum_reached(14, 21));
        assert!(quorum_reached(15, 21));
        assert!(quorum_reached(21, 21));
    }
}
