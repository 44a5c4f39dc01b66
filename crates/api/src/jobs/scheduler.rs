//! Periodic background jobs with cooperative shutdown.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// How often a job runs.
#[derive(Debug, Clone, Copy)]
pub enum JobFrequency {
    Every(Duration),
    Minutes(u64),
    Hourly,
}

impl JobFrequency {
    pub fn duration(&self) -> Duration {
        match self {
            JobFrequency::Every(d) => *d,
            JobFrequency::Minutes(mins) => Duration::from_secs(*mins * 60),
            JobFrequency::Hourly => Duration::from_secs(3600),
        }
    }
}

/// A unit of periodic background work.
#[async_trait::async_trait]
pub trait Job: Send + Sync {
    fn name(&self) -> &'static str;

    fn frequency(&self) -> JobFrequency;

    async fn execute(&self) -> anyhow::Result<()>;
}

/// Runs registered jobs on their own intervals until shut down.
///
/// The first tick is skipped, so nothing runs at startup. A failing run is
/// logged and the job keeps its schedule.
pub struct JobScheduler {
    jobs: Vec<Arc<dyn Job>>,
    shutdown_tx: watch::Sender<bool>,
    handles: Vec<JoinHandle<()>>,
}

impl JobScheduler {
    pub fn new() -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            jobs: Vec::new(),
            shutdown_tx,
            handles: Vec::new(),
        }
    }

    pub fn register<J: Job + 'static>(&mut self, job: J) {
        self.jobs.push(Arc::new(job));
    }

    pub fn start(&mut self) {
        info!(jobs = self.jobs.len(), "Starting job scheduler");
        for job in &self.jobs {
            let handle = tokio::spawn(run_job(Arc::clone(job), self.shutdown_tx.subscribe()));
            self.handles.push(handle);
        }
    }

    /// Signals every job to stop after its current run.
    pub fn shutdown(&self) {
        info!("Stopping job scheduler");
        let _ = self.shutdown_tx.send(true);
    }

    /// Waits for all job tasks, giving up after `timeout`.
    pub async fn wait_for_shutdown(self, timeout: Duration) {
        let all = async {
            for handle in self.handles {
                if let Err(e) = handle.await {
                    warn!(error = %e, "Job task panicked");
                }
            }
        };

        if tokio::time::timeout(timeout, all).await.is_err() {
            warn!(?timeout, "Job shutdown timed out");
        }
    }
}

impl Default for JobScheduler {
    fn default() -> Self {
        Self::new()
    }
}

async fn run_job(job: Arc<dyn Job>, mut shutdown_rx: watch::Receiver<bool>) {
    let name = job.name();
    let mut interval = tokio::time::interval(job.frequency().duration());
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval.tick().await;

    debug!(job = name, frequency = ?job.frequency(), "Job scheduled");

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let start = Instant::now();
                match job.execute().await {
                    Ok(()) => debug!(job = name, elapsed_ms = start.elapsed().as_millis() as u64, "Job completed"),
                    Err(e) => error!(job = name, elapsed_ms = start.elapsed().as_millis() as u64, error = %e, "Job failed"),
                }
            }
            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    debug!(job = name, "Job stopped");
                    break;
                }
            }
        }
    }
}
