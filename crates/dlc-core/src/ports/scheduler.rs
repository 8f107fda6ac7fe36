use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Errors surfaced by scheduler operations.
///
/// Persistence writes never produce these; they are logged and dropped.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("failed to read schedule state: {0}")]
    StoreRead(#[source] anyhow::Error),

    #[error("failed to enqueue job {name}: {source}")]
    JobQueue {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to arm alarm {id}: {source}")]
    Alarm {
        id: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Converts scheduling intents into durable triggers.
///
/// Every `schedule_*` call persists an absolute wall-clock intent and arms
/// the matching job or alarm. `reschedule_*` re-arms from the persisted
/// intent. `correct_expected_to_run_time` only shifts persisted intents; a
/// later reschedule re-arms them.
#[async_trait]
pub trait SchedulerPort: Send + Sync {
    async fn schedule_initial_check_in_work(&self) -> Result<(), SchedulerError>;

    async fn schedule_retry_check_in_work(&self, delay: Duration) -> Result<(), SchedulerError>;

    async fn reschedule_retry_check_in_work(&self) -> Result<(), SchedulerError>;

    async fn schedule_resume_provision_alarm(&self) -> Result<(), SchedulerError>;

    async fn reschedule_resume_provision_alarm(&self) -> Result<(), SchedulerError>;

    async fn cancel_resume_provision_alarm(&self) -> Result<(), SchedulerError>;

    async fn schedule_next_provision_failed_step_alarm(
        &self,
        delay: Duration,
    ) -> Result<(), SchedulerError>;

    async fn reschedule_next_provision_failed_step_alarm(&self) -> Result<(), SchedulerError>;

    async fn cancel_next_provision_failed_step_alarm(&self) -> Result<(), SchedulerError>;

    async fn schedule_mandatory_reset_device_alarm(&self) -> Result<(), SchedulerError>;

    async fn reschedule_reset_device_alarm(&self) -> Result<(), SchedulerError>;

    async fn cancel_reset_device_alarm(&self) -> Result<(), SchedulerError>;

    async fn schedule_push_token_retrieval_work(&self) -> Result<(), SchedulerError>;

    /// Shift the intents that are live in the current state by `delta`.
    async fn correct_expected_to_run_time(
        &self,
        delta: chrono::Duration,
    ) -> Result<(), SchedulerError>;
}
