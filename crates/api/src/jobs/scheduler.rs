//! Interval scheduler for background jobs.
//!
//! Each registered job runs on its own task. A watch channel carries the
//! stop signal; tasks exit at their next wakeup after it flips.

use std::sync::Arc;
use std::time::{Duration, Instant};

use metrics::counter;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// How often a job runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobFrequency {
    Seconds(u64),
    Hours(u64),
}

impl JobFrequency {
    /// Period between runs. Never zero.
    pub fn duration(&self) -> Duration {
        let secs = match self {
            JobFrequency::Seconds(secs) => *secs,
            JobFrequency::Hours(hours) => hours.saturating_mul(3600),
        };
        Duration::from_secs(secs.max(1))
    }
}

/// A unit of periodic background work.
#[async_trait::async_trait]
pub trait Job: Send + Sync {
    /// Stable identifier used in logs and metric labels.
    fn name(&self) -> &'static str;

    fn frequency(&self) -> JobFrequency;

    /// One run. An `Err` is logged and counted; the job keeps its schedule.
    async fn execute(&self) -> Result<(), String>;
}

/// Executes a job once, logging and counting the outcome.
async fn run_once(job: &dyn Job) {
    let name = job.name();
    let start = Instant::now();
    let result = job.execute().await;
    let elapsed_ms = start.elapsed().as_millis();

    let outcome = match &result {
        Ok(()) => {
            debug!(job = name, elapsed_ms, "Job run finished");
            "success"
        }
        Err(e) => {
            error!(job = name, elapsed_ms, error = %e, "Job run failed");
            "failure"
        }
    };
    counter!("background_job_runs_total", "job" => name, "outcome" => outcome).increment(1);
}

/// Drives one job until the stop signal flips or its sender is dropped.
///
/// The first run happens one full period after start.
async fn drive(job: Arc<dyn Job>, mut stop: watch::Receiver<bool>) {
    let name = job.name();
    let period = job.frequency().duration();
    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    info!(job = name, period_secs = period.as_secs(), "Job scheduled");

    loop {
        tokio::select! {
            _ = ticker.tick() => run_once(job.as_ref()).await,
            changed = stop.changed() => {
                if changed.is_err() || *stop.borrow() {
                    break;
                }
            }
        }
    }
    info!(job = name, "Job stopped");
}

/// Owns the background job tasks.
pub struct JobScheduler {
    jobs: Vec<Arc<dyn Job>>,
    stop_tx: watch::Sender<bool>,
    tasks: JoinSet<()>,
}

impl JobScheduler {
    pub fn new() -> Self {
        let (stop_tx, _) = watch::channel(false);
        Self {
            jobs: Vec::new(),
            stop_tx,
            tasks: JoinSet::new(),
        }
    }

    pub fn register<J: Job + 'static>(&mut self, job: J) {
        self.jobs.push(Arc::new(job));
    }

    pub fn job_count(&self) -> usize {
        self.jobs.len()
    }

    /// Spawns a task per registered job. Must run inside a tokio runtime.
    pub fn start(&mut self) {
        info!(jobs = self.jobs.len(), "Starting job scheduler");
        for job in &self.jobs {
            self.tasks
                .spawn(drive(Arc::clone(job), self.stop_tx.subscribe()));
        }
    }

    /// Signals every job to stop without waiting.
    pub fn shutdown(&self) {
        info!("Stopping background jobs");
        self.stop_tx.send_replace(true);
    }

    /// Waits for the job tasks to exit, aborting any still running at `timeout`.
    pub async fn wait_for_shutdown(mut self, timeout: Duration) {
        let drained = tokio::time::timeout(timeout, async {
            while let Some(joined) = self.tasks.join_next().await {
                if let Err(e) = joined {
                    warn!(error = %e, "Job task ended abnormally");
                }
            }
        })
        .await;

        if drained.is_err() {
            warn!(?timeout, "Background jobs did not stop in time, aborting");
            self.tasks.abort_all();
        }
    }
}

impl Default for JobScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fails every other run.
    struct FlakyJob {
        runs: Arc<AtomicUsize>,
    }

    #[async_trait::async_trait]
    impl Job for FlakyJob {
        fn name(&self) -> &'static str {
            "flaky"
        }

        fn frequency(&self) -> JobFrequency {
            JobFrequency::Seconds(1)
        }

        async fn execute(&self) -> Result<(), String> {
            let run = self.runs.fetch_add(1, Ordering::SeqCst);
            if run % 2 == 0 {
                Err(format!("run {} failed", run))
            } else {
                Ok(())
            }
        }
    }

    fn flaky() -> (FlakyJob, Arc<AtomicUsize>) {
        let runs = Arc::new(AtomicUsize::new(0));
        (
            FlakyJob {
                runs: Arc::clone(&runs),
            },
            runs,
        )
    }

    #[test]
    fn test_frequency_duration() {
        assert_eq!(JobFrequency::Seconds(45).duration(), Duration::from_secs(45));
        assert_eq!(JobFrequency::Hours(6).duration(), Duration::from_secs(21_600));
        assert_eq!(JobFrequency::Hours(0).duration(), Duration::from_secs(1));
        assert_eq!(
            JobFrequency::Hours(u64::MAX).duration(),
            Duration::from_secs(u64::MAX)
        );
    }

    #[test]
    fn test_register_counts_jobs() {
        let mut scheduler = JobScheduler::default();
        assert_eq!(scheduler.job_count(), 0);
        scheduler.register(flaky().0);
        scheduler.register(flaky().0);
        assert_eq!(scheduler.job_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_do_not_stop_schedule() {
        let mut scheduler = JobScheduler::new();
        let (job, runs) = flaky();
        scheduler.register(job);
        scheduler.start();

        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert!(runs.load(Ordering::SeqCst) >= 3);

        scheduler.shutdown();
        scheduler.wait_for_shutdown(Duration::from_secs(1)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_before_first_period() {
        let mut scheduler = JobScheduler::new();
        let (job, runs) = flaky();
        scheduler.register(job);
        scheduler.start();

        tokio::time::sleep(Duration::from_millis(500)).await;
        scheduler.shutdown();
        scheduler.wait_for_shutdown(Duration::from_secs(1)).await;

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }
}
