use thiserror::Error;

/// Invalid run configuration. Always fatal: a run with a bad config never
/// spawns a worker.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("No stages configured")]
    EmptyStages,

    #[error("Stages sum to a zero total duration")]
    ZeroDuration,

    #[error("Tick interval must be non-zero")]
    ZeroTickInterval,
}
