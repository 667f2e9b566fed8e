//! Run controller: drives the tick loop and assembles the final result.
use crate::executor::WorkerPool;
use crate::sampler::Sampler;
use crate::schedule::StageSchedule;
use crate::{BoxError, Error};
use rampart_core::{RequestOutcome, RunConfig, RunResult};
use std::future::Future;
use std::sync::Arc;
use tokio::time::{interval, Instant, MissedTickBehavior};
#[allow(unused)]
use tracing::{debug, error, info, instrument, trace, warn};

#[instrument(name = "load_test", skip_all, fields(name = %config.name))]
pub(crate) async fn run_load_test<T, F>(config: RunConfig, request_fn: T) -> Result<RunResult, Error>
where
    T: Fn() -> F + Send + Sync + Clone + 'static,
    F: Future<Output = Result<RequestOutcome, BoxError>> + Send + 'static,
{
    config.validate()?;
    info!("Running {} with config {:?}", config.name, &config);

    let schedule = StageSchedule::new(config.stages.clone());
    let total = schedule.total_duration();
    let sampler = Arc::new(Sampler::new());
    let mut pool = WorkerPool::new(request_fn, sampler.clone(), &config.name, config.pacing);

    let start = Instant::now();
    let mut ticker = interval(config.tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // NOTE: First tick completes instantly, so the first reconcile happens
    // at elapsed ~0.
    loop {
        ticker.tick().await;

        let elapsed = start.elapsed();
        if elapsed >= total {
            break;
        }

        let target = schedule.target_at(elapsed);
        if target != pool.active_count() {
            debug!(
                "Reconciling worker count {} -> {target} at {elapsed:?}",
                pool.active_count()
            );
        }
        pool.reconcile(target);
    }

    debug!("Run duration elapsed, draining workers");
    let clean_shutdown = pool.drain(config.grace_period()).await;
    let wall_duration = start.elapsed();

    let result = RunResult {
        name: config.name,
        wall_duration,
        clean_shutdown,
        labels: sampler.snapshot_all(),
    };

    info!(
        "Run complete: {} requests, {} failures, {}",
        result.total_requests(),
        result.total_failures(),
        humantime::format_duration(wall_duration),
    );

    Ok(result)
}
