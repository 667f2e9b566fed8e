use crate::{ConfigError, DEFAULT_TICK_INTERVAL, MIN_SHUTDOWN_GRACE};
use std::time::Duration;

/// One segment of a load profile: ramp to `target` workers over `duration`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Stage {
    pub duration: Duration,
    pub target: usize,
}

impl Stage {
    pub fn new(duration: Duration, target: usize) -> Self {
        Self { duration, target }
    }
}

/// Full configuration for a single run. Built via the fluent methods on
/// `LoadTest`; immutable once the run starts.
#[derive(Clone, Debug)]
pub struct RunConfig {
    pub name: String,
    pub stages: Vec<Stage>,
    /// Minimum delay between a worker's successive iterations.
    pub pacing: Duration,
    pub tick_interval: Duration,
    pub shutdown_grace: Option<Duration>,
}

impl RunConfig {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            stages: vec![],
            pacing: Duration::ZERO,
            tick_interval: DEFAULT_TICK_INTERVAL,
            shutdown_grace: None,
        }
    }

    pub fn total_duration(&self) -> Duration {
        self.stages.iter().map(|s| s.duration).sum()
    }

    /// How long the run controller waits for workers to finish their last
    /// iteration before aborting them.
    pub fn grace_period(&self) -> Duration {
        self.shutdown_grace
            .unwrap_or_else(|| (self.pacing * 2).max(MIN_SHUTDOWN_GRACE))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stages.is_empty() {
            return Err(ConfigError::EmptyStages);
        }

        if self.total_duration().is_zero() {
            return Err(ConfigError::ZeroDuration);
        }

        if self.tick_interval.is_zero() {
            return Err(ConfigError::ZeroTickInterval);
        }

        Ok(())
    }
}
