use std::collections::BTreeMap;
use std::time::Duration;

/// Aggregated latency statistics for one request label.
///
/// A consistent point-in-time copy of the sampler's running state; two
/// snapshots with no interleaved records are identical.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelSummary {
    pub count: u64,
    pub failures: u64,
    pub mean: Duration,
    pub stddev: Duration,
    pub min: Duration,
    pub max: Duration,
    pub latency_p50: Duration,
    pub latency_p90: Duration,
    pub latency_p99: Duration,
}

impl LabelSummary {
    pub fn error_rate(&self) -> f64 {
        if self.count == 0 {
            0.
        } else {
            self.failures as f64 / self.count as f64
        }
    }
}

/// Final report of a completed run. Created once, at run end; immutable
/// thereafter.
#[derive(Clone, Debug)]
pub struct RunResult {
    pub name: String,
    pub wall_duration: Duration,
    /// False if one or more workers had to be aborted because they failed to
    /// drain within the grace period. The statistics are still valid for
    /// every outcome that was recorded.
    pub clean_shutdown: bool,
    pub labels: BTreeMap<String, LabelSummary>,
}

impl RunResult {
    pub fn total_requests(&self) -> u64 {
        self.labels.values().map(|l| l.count).sum()
    }

    pub fn total_failures(&self) -> u64 {
        self.labels.values().map(|l| l.failures).sum()
    }

    pub fn summary(&self, label: &str) -> Option<&LabelSummary> {
        self.labels.get(label)
    }
}

impl std::fmt::Display for RunResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        writeln!(
            f,
            "{}: {} requests ({} failed) over {}{}",
            self.name,
            self.total_requests(),
            self.total_failures(),
            humantime::format_duration(self.wall_duration),
            if self.clean_shutdown {
                ""
            } else {
                " [partial: shutdown grace period exceeded]"
            },
        )?;

        for (label, summary) in &self.labels {
            writeln!(
                f,
                "  {label}: count={} err={:.2}% mean={:?} stddev={:?} min={:?} max={:?} p50={:?} p90={:?} p99={:?}",
                summary.count,
                summary.error_rate() * 100.,
                summary.mean,
                summary.stddev,
                summary.min,
                summary.max,
                summary.latency_p50,
                summary.latency_p90,
                summary.latency_p99,
            )?;
        }

        Ok(())
    }
}
