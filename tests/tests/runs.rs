//! End-to-end harness runs with simulated time (no network, no real sleeps).
use rampart::prelude::*;
use rampart::{BoxError, Error};
use rampart_core::ConfigError;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use std::time::Duration;
use tokio::time::Instant;

fn sleeping_request_fn(
    invocations: Arc<AtomicU64>,
    label: &'static str,
    latency: Duration,
) -> impl Fn() -> std::pin::Pin<
    Box<dyn std::future::Future<Output = Result<RequestOutcome, BoxError>> + Send>,
> + Send
       + Sync
       + Clone
       + 'static {
    move || {
        let invocations = invocations.clone();
        Box::pin(async move {
            let start = Instant::now();
            tokio::time::sleep(latency).await;
            invocations.fetch_add(1, Ordering::Relaxed);
            Ok(RequestOutcome::success(label, start.elapsed()))
        })
    }
}

#[tokio::test(start_paused = true)]
async fn converges_to_target_concurrency_and_throughput() {
    let invocations = Arc::new(AtomicU64::new(0));

    // Jump to 5 workers, hold for 10s, no pacing; each iteration takes
    // 100ms, so the run should complete close to 5 * (10s / 100ms) requests.
    let result = LoadTest::new(
        "converge",
        sleeping_request_fn(invocations.clone(), "api", Duration::from_millis(100)),
    )
    .stage(Duration::ZERO, 5)
    .stage(Duration::from_secs(10), 5)
    .await
    .unwrap();

    assert!(result.clean_shutdown);
    let summary = result.summary("api").unwrap();
    assert_eq!(summary.failures, 0);
    assert!(
        summary.count >= 400 && summary.count <= 600,
        "total requests = {}",
        summary.count
    );
    assert_eq!(summary.count, invocations.load(Ordering::Relaxed));
}

#[tokio::test(start_paused = true)]
async fn every_third_request_failing_yields_one_third_error_rate() {
    let calls = Arc::new(AtomicU64::new(0));

    let result = LoadTest::new("flaky", {
        let calls = calls.clone();
        move || {
            let calls = calls.clone();
            async move {
                let n = calls.fetch_add(1, Ordering::Relaxed);
                tokio::time::sleep(Duration::from_millis(5)).await;
                let latency = Duration::from_millis(5);
                Ok::<_, BoxError>(if n % 3 == 0 {
                    RequestOutcome::failure("flaky_api", latency)
                } else {
                    RequestOutcome::success("flaky_api", latency)
                })
            }
        }
    })
    .stage(Duration::ZERO, 10)
    .stage(Duration::from_secs(5), 10)
    .pacing(Duration::from_millis(10))
    .await
    .unwrap();

    let summary = result.summary("flaky_api").unwrap();
    assert!(summary.count > 100);
    let error_rate = summary.error_rate();
    assert!(
        (error_rate - 1. / 3.).abs() < 0.02,
        "error rate = {error_rate}"
    );
}

#[tokio::test(start_paused = true)]
async fn empty_stages_fail_before_any_worker_spawns() {
    let invocations = Arc::new(AtomicU64::new(0));

    let err = LoadTest::new(
        "no_stages",
        sleeping_request_fn(invocations.clone(), "api", Duration::from_millis(1)),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, Error::Config(ConfigError::EmptyStages)));
    assert_eq!(invocations.load(Ordering::Relaxed), 0);
}

#[tokio::test(start_paused = true)]
async fn zero_tick_interval_fails_as_config_error() {
    let invocations = Arc::new(AtomicU64::new(0));

    let err = LoadTest::new(
        "no_ticks",
        sleeping_request_fn(invocations.clone(), "api", Duration::from_millis(1)),
    )
    .stage(Duration::from_secs(1), 1)
    .tick_interval(Duration::ZERO)
    .await
    .unwrap_err();

    assert!(matches!(err, Error::Config(ConfigError::ZeroTickInterval)));
    assert_eq!(invocations.load(Ordering::Relaxed), 0);
}

#[tracing_test::traced_test]
#[tokio::test(start_paused = true)]
async fn workers_outliving_the_grace_period_yield_a_partial_result() {
    let invocations = Arc::new(AtomicU64::new(0));

    // Requests take far longer than the grace period, so the drain must
    // abort the stragglers. The run still returns a result, marked partial.
    let result = LoadTest::new("stuck", {
        let invocations = invocations.clone();
        move || {
            let invocations = invocations.clone();
            async move {
                tokio::time::sleep(Duration::from_secs(600)).await;
                invocations.fetch_add(1, Ordering::Relaxed);
                Ok::<_, BoxError>(RequestOutcome::success("stuck_api", Duration::from_secs(600)))
            }
        }
    })
    .stage(Duration::ZERO, 2)
    .stage(Duration::from_secs(1), 2)
    .shutdown_grace(Duration::from_millis(100))
    .await
    .unwrap();

    assert!(!result.clean_shutdown);
    // The aborted iterations never completed, so nothing was recorded.
    assert_eq!(invocations.load(Ordering::Relaxed), 0);
    assert_eq!(result.total_requests(), 0);
}

#[tokio::test(start_paused = true)]
async fn ramp_down_to_zero_accounts_for_every_iteration() {
    let invocations = Arc::new(AtomicU64::new(0));

    // Ramp to 20, hold, then ramp down to 0. Shrinking must retire workers
    // only after their in-flight iteration is recorded.
    let result = LoadTest::new(
        "ramp_down",
        sleeping_request_fn(invocations.clone(), "api", Duration::from_millis(20)),
    )
    .stage(Duration::from_secs(2), 20)
    .stage(Duration::from_secs(2), 20)
    .stage(Duration::from_secs(1), 0)
    .pacing(Duration::from_millis(50))
    .await
    .unwrap();

    assert!(result.clean_shutdown);
    let summary = result.summary("api").unwrap();
    assert_eq!(summary.failures, 0);
    assert_eq!(summary.count, invocations.load(Ordering::Relaxed));
    assert_eq!(result.total_requests(), summary.count);
}

#[tokio::test(start_paused = true)]
async fn shutdown_wakes_workers_sleeping_on_pacing() {
    let invocations = Arc::new(AtomicU64::new(0));

    // Pacing far longer than the run: each worker completes one iteration
    // and then sleeps. The run can only end promptly if those sleeps are
    // interrupted at shutdown.
    let result = LoadTest::new(
        "sleepy",
        sleeping_request_fn(invocations.clone(), "api", Duration::from_millis(1)),
    )
    .stage(Duration::ZERO, 3)
    .stage(Duration::from_secs(1), 3)
    .pacing(Duration::from_secs(600))
    .await
    .unwrap();

    assert!(result.clean_shutdown);
    assert!(
        result.wall_duration < Duration::from_secs(5),
        "wall duration = {:?}",
        result.wall_duration
    );
    assert_eq!(result.summary("api").unwrap().count, 3);
}
