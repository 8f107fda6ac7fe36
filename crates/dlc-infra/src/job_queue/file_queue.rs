//! Durable job queue persisted as one JSON document.
//!
//! Each job name holds at most one pending job. Due jobs are delivered on an
//! mpsc channel; the runner reports back through [`FileJobQueue::complete`].

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use dlc_core::config::JobQueueConfig;
use dlc_core::ports::{ClockPort, DurableJobQueuePort};
use dlc_core::schedule::{JobInfo, JobOutcome, JobRequest};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, Mutex};
use tokio::time::{sleep, Duration};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::fs::JsonFileStore;

pub const DEFAULT_JOB_QUEUE_FILE: &str = "jobs.json";

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct QueueDocument {
    jobs: BTreeMap<String, JobInfo>,
}

pub struct FileJobQueue {
    store: JsonFileStore<QueueDocument>,
    clock: Arc<dyn ClockPort>,
    config: JobQueueConfig,
    due: mpsc::Sender<JobInfo>,
    timers: Arc<Mutex<HashMap<String, (Uuid, tokio::task::AbortHandle)>>>,
}

impl FileJobQueue {
    pub fn new(
        path: PathBuf,
        clock: Arc<dyn ClockPort>,
        config: JobQueueConfig,
        due: mpsc::Sender<JobInfo>,
    ) -> Self {
        Self {
            store: JsonFileStore::new(path),
            clock,
            config,
            due,
            timers: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn with_defaults(
        base_dir: PathBuf,
        clock: Arc<dyn ClockPort>,
        config: JobQueueConfig,
        due: mpsc::Sender<JobInfo>,
    ) -> Self {
        Self::new(base_dir.join(DEFAULT_JOB_QUEUE_FILE), clock, config, due)
    }

    /// Re-arm every persisted job. Jobs whose run time already passed are
    /// delivered immediately. Returns the number of jobs restored.
    pub async fn restore(&self) -> Result<usize> {
        let document = self.store.load().await?;
        for job in document.jobs.values() {
            self.arm(job.clone()).await;
        }
        if !document.jobs.is_empty() {
            info!(count = document.jobs.len(), "restored pending jobs");
        }
        Ok(document.jobs.len())
    }

    /// Whether `job` is still the pending job for its name.
    pub async fn is_current(&self, job: &JobInfo) -> Result<bool> {
        let document = self.store.load().await?;
        Ok(document
            .jobs
            .get(&job.name)
            .is_some_and(|current| current.id == job.id))
    }

    /// Record the outcome of a run. A job replaced while it ran is left
    /// untouched.
    pub async fn complete(&self, job: &JobInfo, outcome: JobOutcome) -> Result<()> {
        let now = self.clock.now_ms();
        let mut rescheduled = None;

        self.store
            .update(|document| {
                let Some(current) = document.jobs.get_mut(&job.name) else {
                    return;
                };
                if current.id != job.id {
                    return;
                }
                match outcome {
                    JobOutcome::Success | JobOutcome::Failure => {
                        document.jobs.remove(&job.name);
                    }
                    JobOutcome::Retry => {
                        current.attempt += 1;
                        let delay = backoff_delay_ms(&self.config, current.attempt);
                        current.run_at_ms = now.saturating_add(delay as i64);
                        rescheduled = Some(current.clone());
                    }
                }
            })
            .await?;

        match rescheduled {
            Some(next) => {
                debug!(job = %next.name, attempt = next.attempt, run_at_ms = next.run_at_ms, "job retry scheduled");
                self.arm(next).await;
            }
            None => {
                let mut timers = self.timers.lock().await;
                if timers.get(&job.name).is_some_and(|(id, _)| *id == job.id) {
                    if let Some((_, handle)) = timers.remove(&job.name) {
                        handle.abort();
                    }
                }
                debug!(job = %job.name, ?outcome, "job completed");
            }
        }
        Ok(())
    }

    async fn arm(&self, job: JobInfo) {
        let delay_ms = (job.run_at_ms - self.clock.now_ms()).max(0) as u64;
        let timers = Arc::clone(&self.timers);
        let due = self.due.clone();
        let name = job.name.clone();
        let id = job.id;

        let mut guard = self.timers.lock().await;
        if let Some((_, existing)) = guard.remove(&name) {
            existing.abort();
        }

        let handle = tokio::spawn(async move {
            sleep(Duration::from_millis(delay_ms)).await;
            {
                let mut guard = timers.lock().await;
                if guard.get(&job.name).is_some_and(|(armed, _)| *armed == job.id) {
                    guard.remove(&job.name);
                }
            }
            let name = job.name.clone();
            if due.send(job).await.is_err() {
                warn!(job = %name, "job runner dropped");
            }
        });

        guard.insert(name, (id, handle.abort_handle()));
    }
}

/// `initial * 2^(attempt - 1)`, capped at the configured maximum.
fn backoff_delay_ms(config: &JobQueueConfig, attempt: u32) -> u64 {
    let exponent = attempt.saturating_sub(1).min(32);
    config
        .backoff_initial_ms
        .saturating_mul(1u64 << exponent)
        .min(config.backoff_max_ms)
}

#[async_trait]
impl DurableJobQueuePort for FileJobQueue {
    async fn enqueue_unique(&self, request: JobRequest) -> Result<()> {
        let now = self.clock.now_ms();
        let delay_ms = u64::try_from(request.initial_delay.as_millis()).unwrap_or(u64::MAX);
        let job = JobInfo {
            id: Uuid::new_v4(),
            name: request.name,
            initial_delay_ms: delay_ms,
            network_required: request.network_required,
            enqueued_at_ms: now,
            run_at_ms: now.saturating_add(i64::try_from(delay_ms).unwrap_or(i64::MAX)),
            attempt: 0,
        };

        let stored = job.clone();
        self.store
            .update(move |document| {
                document.jobs.insert(stored.name.clone(), stored);
            })
            .await?;

        debug!(job = %job.name, delay_ms, network_required = job.network_required, "job enqueued");
        self.arm(job).await;
        Ok(())
    }

    async fn query(&self, name: &str) -> Result<Option<JobInfo>> {
        Ok(self.store.load().await?.jobs.get(name).cloned())
    }

    async fn cancel(&self, name: &str) -> Result<()> {
        self.store
            .update(|document| {
                document.jobs.remove(name);
            })
            .await?;

        if let Some((_, handle)) = self.timers.lock().await.remove(name) {
            handle.abort();
            debug!(job = %name, "job cancelled");
        }
        Ok(())
    }
}
