//! The per-round monotonic clock: `lambda_ms` doubles per consecutive step
//! within a round up to a configured maximum, and resets to the floor on
//! every new round. Only relative elapsed time matters — validators need
//! matching clock *rate*, not a synchronized offset (spec.md §4.3).

use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug)]
pub struct RoundClock {
    lambda_ms_min: u64,
    lambda_ms_max: u64,
    round_started_at: Instant,
    step_started_at: Instant,
    /// Steps elapsed since the round began; drives the doubling.
    steps_in_round: u32,
}

impl RoundClock {
    pub fn new(lambda_ms_min: u64, lambda_ms_max: u64) -> Self {
        let now = Instant::now();
        Self { lambda_ms_min, lambda_ms_max, round_started_at: now, step_started_at: now, steps_in_round: 0 }
    }

    /// Reset to zero on every new round (spec.md §4.3).
    pub fn start_round(&mut self) {
        let now = Instant::now();
        self.round_started_at = now;
        self.step_started_at = now;
        self.steps_in_round = 0;
    }

    /// Mark the start of a new step within the current round, without
    /// resetting the round's elapsed time.
    pub fn start_step(&mut self) {
        self.step_started_at = Instant::now();
        self.steps_in_round = self.steps_in_round.saturating_add(1);
    }

    /// `lambda_ms` for the step just started: the floor doubled once per
    /// consecutive step, capped at `lambda_ms_max`.
    pub fn lambda_ms(&self) -> u64 {
        let doublings = self.steps_in_round.min(32);
        self.lambda_ms_min.saturating_mul(1u64 << doublings).min(self.lambda_ms_max)
    }

    pub fn step_timeout(&self) -> Duration {
        Duration::from_millis(self.lambda_ms())
    }

    pub fn step_elapsed(&self) -> Duration {
        self.step_started_at.elapsed()
    }

    pub fn step_expired(&self) -> bool {
        self.step_elapsed() >= self.step_timeout()
    }

    pub fn round_elapsed(&self) -> Duration {
        self.round_started_at.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lambda_doubles_per_step_and_caps() {
        let mut clock = RoundClock::new(1_000, 8_000);
        assert_eq!(clock.lambda_ms(), 1_000);
        clock.start_step();
        assert_eq!(clock.lambda_ms(), 2_000);
        clock.start_step();
        assert_eq!(clock.lambda_ms(), 4_000);
        clock.start_step();
        assert_eq!(clock.lambda_ms(), 8_000);
        clock.start_step();
        assert_eq!(clock.lambda_ms(), 8_000, "capped at lambda_ms_max");
    }

    #[test]
    fn new_round_resets_doubling() {
        let mut clock = RoundClock::new(1_000, 8_000);
        clock.start_step();
        clock.start_step();
        assert_eq!(clock.lambda_ms(), 4_000);
        clock.start_round();
        assert_eq!(clock.lambda_ms(), 1_000);
    }
}
