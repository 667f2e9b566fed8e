use std::time::Duration;

/// Interval at which the run controller recomputes the concurrency target
/// and reconciles the worker pool against it.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Lower bound on the shutdown grace period. The default grace is twice the
/// pacing interval, which would be zero for unpaced runs without this floor.
pub const MIN_SHUTDOWN_GRACE: Duration = Duration::from_secs(1);
