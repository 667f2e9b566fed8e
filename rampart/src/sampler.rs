//! Concurrency-safe aggregation of request outcomes.
use pdatastructs::tdigest::{TDigest, K1};
use rampart_core::{LabelSummary, RequestOutcome};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::time::Duration;

const TDIGEST_BACKLOG_SIZE: usize = 100;

/// Accumulates request outcomes into per-label summary statistics.
///
/// Every label owns its own lock, so concurrent records for unrelated
/// request types never contend; the outer map is only write-locked the
/// first time a label is seen. Individual outcomes are not retained, which
/// bounds memory for arbitrarily long runs.
///
/// Owned by the run controller and handed to workers behind an `Arc`; there
/// is no process-wide sampler, so independent runs in one process never
/// share state.
#[derive(Default)]
pub struct Sampler {
    labels: RwLock<HashMap<String, Arc<Mutex<LabelAccumulator>>>>,
}

impl Sampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one outcome. O(1), callable from any number of workers.
    pub fn record(&self, outcome: &RequestOutcome) {
        #[cfg(feature = "metrics")]
        {
            metrics::histogram!(format!("{}_latency", outcome.label))
                .record(outcome.latency.as_nanos() as f64);
            if outcome.success {
                metrics::counter!(format!("{}_success", outcome.label)).increment(1);
            } else {
                metrics::counter!(format!("{}_error", outcome.label)).increment(1);
            }
        }

        let slot = self.slot(&outcome.label);
        lock(&slot).push(outcome.success, outcome.latency);
    }

    /// Consistent point-in-time statistics for one label, or None if the
    /// label has never been recorded.
    pub fn snapshot(&self, label: &str) -> Option<LabelSummary> {
        let slot = self.labels.read().unwrap_or_else(|e| e.into_inner()).get(label).cloned()?;
        let summary = lock(&slot).summarize();
        Some(summary)
    }

    /// Statistics for every label seen so far.
    pub fn snapshot_all(&self) -> BTreeMap<String, LabelSummary> {
        let slots: Vec<(String, Arc<Mutex<LabelAccumulator>>)> = {
            let map = self.labels.read().unwrap_or_else(|e| e.into_inner());
            map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
        };

        slots
            .into_iter()
            .map(|(label, slot)| {
                let summary = lock(&slot).summarize();
                (label, summary)
            })
            .collect()
    }

    fn slot(&self, label: &str) -> Arc<Mutex<LabelAccumulator>> {
        {
            let map = self.labels.read().unwrap_or_else(|e| e.into_inner());
            if let Some(slot) = map.get(label) {
                return slot.clone();
            }
        }

        let mut map = self.labels.write().unwrap_or_else(|e| e.into_inner());
        map.entry(label.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(LabelAccumulator::new())))
            .clone()
    }
}

// A poisoned lock only means some other worker panicked mid-record; the
// accumulator itself is never left torn (see LabelAccumulator::push), so
// keep going with whatever was recorded.
fn lock(slot: &Mutex<LabelAccumulator>) -> MutexGuard<'_, LabelAccumulator> {
    slot.lock().unwrap_or_else(|e| e.into_inner())
}

/// Welford streaming mean/variance plus a TDigest for quantiles. All fields
/// update together under the label's lock, so snapshots are never torn.
struct LabelAccumulator {
    count: u64,
    failures: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
    digest: TDigest<K1>,
}

impl LabelAccumulator {
    fn new() -> Self {
        Self {
            count: 0,
            failures: 0,
            mean: 0.,
            m2: 0.,
            min: f64::INFINITY,
            max: 0.,
            digest: default_tdigest(),
        }
    }

    fn push(&mut self, success: bool, latency: Duration) {
        let secs = latency.as_secs_f64();

        self.count += 1;
        if !success {
            self.failures += 1;
        }

        let delta = secs - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (secs - self.mean);

        self.min = self.min.min(secs);
        self.max = self.max.max(secs);
        self.digest.insert(secs);
    }

    fn summarize(&self) -> LabelSummary {
        if self.count == 0 {
            return LabelSummary {
                count: 0,
                failures: 0,
                mean: Duration::ZERO,
                stddev: Duration::ZERO,
                min: Duration::ZERO,
                max: Duration::ZERO,
                latency_p50: Duration::ZERO,
                latency_p90: Duration::ZERO,
                latency_p99: Duration::ZERO,
            };
        }

        let variance = if self.count > 1 {
            self.m2 / (self.count - 1) as f64
        } else {
            0.
        };

        LabelSummary {
            count: self.count,
            failures: self.failures,
            mean: Duration::from_secs_f64(self.mean),
            stddev: Duration::from_secs_f64(variance.sqrt()),
            min: Duration::from_secs_f64(self.min),
            max: Duration::from_secs_f64(self.max),
            latency_p50: self.quantile(0.5),
            latency_p90: self.quantile(0.9),
            latency_p99: self.quantile(0.99),
        }
    }

    fn quantile(&self, q: f64) -> Duration {
        Duration::from_secs_f64(self.digest.quantile(q))
    }
}

fn default_tdigest() -> TDigest<K1> {
    TDigest::new(K1::new(10.), TDIGEST_BACKLOG_SIZE)
}
