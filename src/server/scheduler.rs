use crate::domain_port::Clock;
use chrono::{DateTime, NaiveTime, TimeDelta, Utc};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[async_trait::async_trait]
pub trait RecurringJob: Send + Sync {
    fn name(&self) -> &'static str;
    async fn run(&self) -> anyhow::Result<()>;
}

/// When the current run of a scheduled job began, if one is in flight.
#[derive(Debug, Default)]
pub struct RunState {
    running_since: Mutex<Option<DateTime<Utc>>>,
}

impl RunState {
    pub fn running_since(&self) -> Option<DateTime<Utc>> {
        self.running_since.lock().ok().and_then(|lock| *lock)
    }

    fn set(&self, value: Option<DateTime<Utc>>) {
        if let Ok(mut lock) = self.running_since.lock() {
            *lock = value;
        }
    }
}

/// Runs a job once on start, then every day at a fixed UTC time.
///
/// Runs are strictly sequential. Cancellation is only observed between runs,
/// so a run in progress always finishes.
pub struct DailyScheduler {
    at: NaiveTime,
    clock: Arc<dyn Clock>,
    cancellation_token: CancellationToken,
    state: Arc<RunState>,
}

impl DailyScheduler {
    pub fn new(at: NaiveTime, clock: Arc<dyn Clock>, cancellation_token: CancellationToken) -> Self {
        Self {
            at,
            clock,
            cancellation_token,
            state: Arc::new(RunState::default()),
        }
    }

    pub fn state(&self) -> Arc<RunState> {
        self.state.clone()
    }

    /// First instant strictly after `now` whose UTC wall time is `at`.
    pub fn next_run_after(at: NaiveTime, now: DateTime<Utc>) -> DateTime<Utc> {
        let today = now.date_naive().and_time(at).and_utc();
        if today > now {
            today
        } else {
            today + TimeDelta::days(1)
        }
    }

    async fn run_job(&self, job: &dyn RecurringJob) {
        self.state.set(Some(self.clock.now()));
        if let Err(e) = job.run().await {
            tracing::error!(job = job.name(), "recurring job failed: {:#}", e);
        }
        self.state.set(None);
    }

    pub async fn run(&self, job: Arc<dyn RecurringJob>) {
        tracing::info!(job = job.name(), at = %self.at, "scheduler started");

        if !self.cancellation_token.is_cancelled() {
            self.run_job(job.as_ref()).await;
        }

        loop {
            let now = self.clock.now();
            let delay = (Self::next_run_after(self.at, now) - now)
                .to_std()
                .unwrap_or(Duration::ZERO);

            tokio::select! {
                biased;
                _ = self.cancellation_token.cancelled() => {
                    tracing::info!(job = job.name(), "scheduler shutting down...");
                    break;
                }
                _ = tokio::time::sleep(delay) => {
                    self.run_job(job.as_ref()).await;
                }
            }
        }
    }

    pub fn spawn(self, job: Arc<dyn RecurringJob>) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(job).await })
    }
}
