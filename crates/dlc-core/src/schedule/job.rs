use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique work name shared by the initial and retry check-in jobs.
pub const DEVICE_CHECK_IN_WORK_NAME: &str = "device-check-in";

pub const PUSH_TOKEN_WORK_NAME: &str = "push-token-retrieval";

/// Request to enqueue a named job, replacing any pending job of that name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRequest {
    pub name: String,
    pub initial_delay: Duration,
    /// Only run while a network connection is available.
    pub network_required: bool,
}

impl JobRequest {
    pub fn new(name: impl Into<String>, initial_delay: Duration) -> Self {
        Self {
            name: name.into(),
            initial_delay,
            network_required: false,
        }
    }

    pub fn require_network(mut self) -> Self {
        self.network_required = true;
        self
    }
}

/// A job as currently held by the queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobInfo {
    /// Fresh for every enqueue, so a replaced job can be told apart.
    pub id: Uuid,
    pub name: String,
    pub initial_delay_ms: u64,
    pub network_required: bool,
    /// Epoch millis at which the job was (re)enqueued.
    pub enqueued_at_ms: i64,
    /// Epoch millis at which the job becomes runnable.
    pub run_at_ms: i64,
    /// Number of finished attempts that asked for a retry.
    pub attempt: u32,
}

impl JobInfo {
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }
}

/// What a job runner reports back to the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    Success,
    /// Run again after the queue's backoff.
    Retry,
    Failure,
}
