//! Time-varying concurrency target derived from a stage list.
use rampart_core::Stage;
use std::time::Duration;

/// Piecewise-linear concurrency profile over an ordered stage list.
///
/// Within each stage the target ramps linearly from the previous stage's
/// target (0 before the first stage) to the stage's own target, so
/// `Stage::new(30s, 50)` means "ramp to 50 workers over 30 seconds".
/// A zero-duration stage is an instantaneous jump, useful for starting a
/// hold stage at full concurrency.
///
/// Pure function of elapsed time and the immutable stage list; no hidden
/// state.
#[derive(Debug, Clone)]
pub struct StageSchedule {
    stages: Vec<Stage>,
    total: Duration,
}

impl StageSchedule {
    pub fn new(stages: Vec<Stage>) -> Self {
        let total = stages.iter().map(|s| s.duration).sum();
        Self { stages, total }
    }

    pub fn total_duration(&self) -> Duration {
        self.total
    }

    /// Target worker count at `elapsed` since run start. Always 0 once
    /// `elapsed` reaches the total duration.
    pub fn target_at(&self, elapsed: Duration) -> usize {
        if elapsed >= self.total {
            return 0;
        }

        let mut start = Duration::ZERO;
        let mut prev = 0usize;
        for stage in &self.stages {
            if stage.duration.is_zero() {
                prev = stage.target;
                continue;
            }

            let end = start + stage.duration;
            if elapsed < end {
                let t = (elapsed - start).as_secs_f64() / stage.duration.as_secs_f64();
                let from = prev as f64;
                let to = stage.target as f64;
                return (from + (to - from) * t).round() as usize;
            }

            start = end;
            prev = stage.target;
        }

        0
    }
}
