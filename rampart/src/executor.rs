//! Virtual-user pool: spawning, pacing, graceful retirement.
use crate::sampler::Sampler;
use crate::BoxError;
use rampart_core::RequestOutcome;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
#[allow(unused)]
use tracing::{debug, error, info, trace, warn};

/// Pool of virtual-user tasks, each looping over the request function.
///
/// `reconcile` adjusts the live worker count to a target. Growing spawns new
/// tasks; shrinking signals workers to stop after their current iteration,
/// never mid-iteration, so every invocation's outcome lands in the sampler.
pub(crate) struct WorkerPool<T> {
    request_fn: T,
    sampler: Arc<Sampler>,
    default_label: Arc<str>,
    pacing: Duration,
    active: Vec<Worker>,
    retired: Vec<JoinHandle<()>>,
    next_id: usize,
}

struct Worker {
    stop: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl<T, F> WorkerPool<T>
where
    T: Fn() -> F + Send + Sync + Clone + 'static,
    F: Future<Output = Result<RequestOutcome, BoxError>> + Send + 'static,
{
    pub fn new(request_fn: T, sampler: Arc<Sampler>, default_label: &str, pacing: Duration) -> Self {
        Self {
            request_fn,
            sampler,
            default_label: Arc::from(default_label),
            pacing,
            active: vec![],
            retired: vec![],
            next_id: 0,
        }
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn reconcile(&mut self, target: usize) {
        self.retired.retain(|handle| !handle.is_finished());

        while self.active.len() < target {
            self.spawn_worker();
        }

        while self.active.len() > target {
            // Graceful shrink: the worker sees the signal after its current
            // iteration (or mid-sleep) and exits on its own.
            let Some(worker) = self.active.pop() else { break };
            let _ = worker.stop.send(true);
            self.retired.push(worker.handle);
        }
    }

    /// Signal every worker to stop and wait up to `grace` for in-flight
    /// iterations to finish. Returns false if stragglers had to be aborted.
    pub async fn drain(&mut self, grace: Duration) -> bool {
        for worker in &self.active {
            let _ = worker.stop.send(true);
        }

        let mut handles: Vec<_> = self.active.drain(..).map(|w| w.handle).collect();
        handles.append(&mut self.retired);

        let deadline = Instant::now() + grace;
        let mut clean = true;
        for mut handle in handles {
            match tokio::time::timeout_at(deadline, &mut handle).await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    error!("Worker task failed: {err}");
                    clean = false;
                }
                Err(_) => {
                    handle.abort();
                    clean = false;
                }
            }
        }

        if !clean {
            warn!(
                "Workers failed to drain within {}",
                humantime::format_duration(grace)
            );
        }

        clean
    }

    fn spawn_worker(&mut self) {
        let id = self.next_id;
        self.next_id += 1;

        let (stop, stop_rx) = watch::channel(false);
        let handle = tokio::spawn(worker_loop(
            id,
            self.request_fn.clone(),
            self.sampler.clone(),
            self.default_label.clone(),
            self.pacing,
            stop_rx,
        ));
        self.active.push(Worker { stop, handle });
        trace!("Spawned worker {id}");
    }
}

async fn worker_loop<T, F>(
    id: usize,
    request_fn: T,
    sampler: Arc<Sampler>,
    default_label: Arc<str>,
    pacing: Duration,
    mut stop: watch::Receiver<bool>,
) where
    T: Fn() -> F + Send + Sync + Clone + 'static,
    F: Future<Output = Result<RequestOutcome, BoxError>> + Send + 'static,
{
    loop {
        if *stop.borrow() {
            break;
        }

        // The request itself is never interrupted; accounting stays exact
        // even during shutdown.
        let start = Instant::now();
        match request_fn().await {
            Ok(outcome) => sampler.record(&outcome),
            Err(err) => {
                debug!("Worker {id}: request function failed: {err}");
                sampler.record(&RequestOutcome::failure(&*default_label, start.elapsed()));
            }
        }

        if *stop.borrow() {
            break;
        }

        if !pacing.is_zero() {
            // Pacing sleep wakes immediately on a stop signal.
            tokio::select! {
                _ = tokio::time::sleep(pacing) => {}
                _ = stop.changed() => break,
            }
        }
    }

    trace!("Worker {id} exiting");
}
