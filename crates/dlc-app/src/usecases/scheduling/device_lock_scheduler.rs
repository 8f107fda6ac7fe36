//! Device lock scheduler.
//!
//! Turns scheduling intents into persisted wall-clock timestamps plus the job
//! or alarm that realises them. Alarms are armed on the elapsed-time clock, so
//! a wall-clock jump does not move them; `correct_expected_to_run_time` shifts
//! the stored intent and a following reschedule re-arms from it.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use dlc_core::config::ScheduleConfig;
use dlc_core::ports::{
    ClockPort, DurableJobQueuePort, SchedulerError, SchedulerPort, UserParametersPort,
    WallClockAlarmPort,
};
use dlc_core::schedule::{AlarmId, JobRequest, DEVICE_CHECK_IN_WORK_NAME, PUSH_TOKEN_WORK_NAME};
use dlc_core::ScheduleField;

fn duration_ms(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}

/// Delay until `trigger_at_ms`, zero when it already passed.
fn delay_until(trigger_at_ms: i64, now_ms: i64) -> Duration {
    Duration::from_millis(trigger_at_ms.saturating_sub(now_ms).max(0) as u64)
}

pub struct DeviceLockScheduler {
    clock: Arc<dyn ClockPort>,
    user_params: Arc<dyn UserParametersPort>,
    alarm: Arc<dyn WallClockAlarmPort>,
    job_queue: Arc<dyn DurableJobQueuePort>,
    schedule: ScheduleConfig,
}

impl DeviceLockScheduler {
    pub fn new(
        clock: Arc<dyn ClockPort>,
        user_params: Arc<dyn UserParametersPort>,
        alarm: Arc<dyn WallClockAlarmPort>,
        job_queue: Arc<dyn DurableJobQueuePort>,
        schedule: ScheduleConfig,
    ) -> Self {
        Self {
            clock,
            user_params,
            alarm,
            job_queue,
            schedule,
        }
    }

    /// Persist one intent. Failures are logged and dropped; the caller still
    /// arms with the value it tried to write.
    async fn persist(&self, field: ScheduleField, value_ms: i64) {
        if let Err(err) = self.user_params.set_timestamp(field, value_ms).await {
            warn!(error = %err, field = %field, value_ms, "failed to persist schedule intent");
        }
    }

    async fn stored(&self, field: ScheduleField) -> Result<i64, SchedulerError> {
        self.user_params
            .timestamp(field)
            .await
            .map_err(SchedulerError::StoreRead)
    }

    async fn enqueue(&self, request: JobRequest) -> Result<(), SchedulerError> {
        let name = request.name.clone();
        self.job_queue
            .enqueue_unique(request)
            .await
            .map_err(|source| SchedulerError::JobQueue { name, source })
    }

    async fn enqueue_check_in(&self, delay: Duration) -> Result<(), SchedulerError> {
        self.enqueue(JobRequest::new(DEVICE_CHECK_IN_WORK_NAME, delay).require_network())
            .await
    }

    async fn arm(&self, id: AlarmId, delay: Duration) -> Result<(), SchedulerError> {
        let trigger_elapsed_ms = self.clock.elapsed_ms().saturating_add(duration_ms(delay));
        self.alarm
            .arm_at(trigger_elapsed_ms, id)
            .await
            .map_err(|source| SchedulerError::Alarm {
                id: id.to_string(),
                source,
            })
    }

    async fn cancel_alarm(&self, id: AlarmId) -> Result<(), SchedulerError> {
        self.alarm
            .cancel(id)
            .await
            .map_err(|source| SchedulerError::Alarm {
                id: id.to_string(),
                source,
            })?;
        self.persist(id.field(), 0).await;
        debug!(alarm = %id, "alarm cancelled");
        Ok(())
    }

    async fn schedule_alarm(&self, id: AlarmId, delay: Duration) -> Result<(), SchedulerError> {
        let trigger_at_ms = self.clock.now_ms().saturating_add(duration_ms(delay));
        self.persist(id.field(), trigger_at_ms).await;
        self.arm(id, delay).await?;
        info!(alarm = %id, delay_ms = duration_ms(delay), trigger_at_ms, "alarm scheduled");
        Ok(())
    }

    async fn reschedule_alarm(&self, id: AlarmId) -> Result<(), SchedulerError> {
        let stored = self.stored(id.field()).await?;
        if stored == 0 {
            debug!(alarm = %id, "no stored intent, nothing to reschedule");
            return Ok(());
        }
        let delay = delay_until(stored, self.clock.now_ms());
        self.arm(id, delay).await?;
        info!(alarm = %id, delay_ms = duration_ms(delay), trigger_at_ms = stored, "alarm rescheduled");
        Ok(())
    }
}

#[async_trait]
impl SchedulerPort for DeviceLockScheduler {
    async fn schedule_initial_check_in_work(&self) -> Result<(), SchedulerError> {
        let params = self
            .user_params
            .load()
            .await
            .map_err(SchedulerError::StoreRead)?;
        if !params.need_initial_check_in {
            debug!("initial check-in already scheduled");
            return Ok(());
        }

        self.enqueue_check_in(Duration::ZERO).await?;
        if let Err(err) = self.user_params.set_need_initial_check_in(false).await {
            warn!(error = %err, "failed to record initial check-in as scheduled");
        }
        info!("initial check-in scheduled");
        Ok(())
    }

    async fn schedule_retry_check_in_work(&self, delay: Duration) -> Result<(), SchedulerError> {
        let trigger_at_ms = self.clock.now_ms().saturating_add(duration_ms(delay));
        self.persist(ScheduleField::NextCheckIn, trigger_at_ms).await;
        self.persist(ScheduleField::ResumeProvision, 0).await;
        self.enqueue_check_in(delay).await?;
        info!(
            delay_ms = duration_ms(delay),
            trigger_at_ms, "retry check-in scheduled"
        );
        Ok(())
    }

    async fn reschedule_retry_check_in_work(&self) -> Result<(), SchedulerError> {
        let stored = self.stored(ScheduleField::NextCheckIn).await?;
        if stored == 0 {
            debug!("no stored check-in intent, nothing to reschedule");
            return Ok(());
        }
        let delay = delay_until(stored, self.clock.now_ms());
        self.enqueue_check_in(delay).await?;
        info!(
            delay_ms = duration_ms(delay),
            trigger_at_ms = stored,
            "retry check-in rescheduled"
        );
        Ok(())
    }

    async fn schedule_resume_provision_alarm(&self) -> Result<(), SchedulerError> {
        self.persist(ScheduleField::NextCheckIn, 0).await;
        self.schedule_alarm(AlarmId::ResumeProvision, self.schedule.provision_pause())
            .await
    }

    async fn reschedule_resume_provision_alarm(&self) -> Result<(), SchedulerError> {
        self.reschedule_alarm(AlarmId::ResumeProvision).await
    }

    async fn cancel_resume_provision_alarm(&self) -> Result<(), SchedulerError> {
        self.cancel_alarm(AlarmId::ResumeProvision).await
    }

    async fn schedule_next_provision_failed_step_alarm(
        &self,
        delay: Duration,
    ) -> Result<(), SchedulerError> {
        self.schedule_alarm(AlarmId::NextProvisionFailedStep, delay)
            .await
    }

    async fn reschedule_next_provision_failed_step_alarm(&self) -> Result<(), SchedulerError> {
        self.reschedule_alarm(AlarmId::NextProvisionFailedStep).await
    }

    async fn cancel_next_provision_failed_step_alarm(&self) -> Result<(), SchedulerError> {
        self.cancel_alarm(AlarmId::NextProvisionFailedStep).await
    }

    async fn schedule_mandatory_reset_device_alarm(&self) -> Result<(), SchedulerError> {
        self.schedule_alarm(AlarmId::ResetDevice, self.schedule.mandatory_reset())
            .await
    }

    async fn reschedule_reset_device_alarm(&self) -> Result<(), SchedulerError> {
        self.reschedule_alarm(AlarmId::ResetDevice).await
    }

    async fn cancel_reset_device_alarm(&self) -> Result<(), SchedulerError> {
        self.cancel_alarm(AlarmId::ResetDevice).await
    }

    async fn schedule_push_token_retrieval_work(&self) -> Result<(), SchedulerError> {
        let delay = self.schedule.push_token_retrieval_delay();
        self.enqueue(JobRequest::new(PUSH_TOKEN_WORK_NAME, delay).require_network())
            .await?;
        info!(delay_ms = duration_ms(delay), "push token retrieval scheduled");
        Ok(())
    }

    async fn correct_expected_to_run_time(
        &self,
        delta: chrono::Duration,
    ) -> Result<(), SchedulerError> {
        let params = self
            .user_params
            .load()
            .await
            .map_err(SchedulerError::StoreRead)?;
        let delta_ms = delta.num_milliseconds();

        for &field in ScheduleField::live_for(params.provision_state) {
            let stored = params.timestamp(field);
            if stored == 0 {
                continue;
            }
            let corrected = stored.saturating_add(delta_ms);
            self.persist(field, corrected).await;
            info!(
                field = %field,
                state = %params.provision_state,
                delta_ms,
                from_ms = stored,
                to_ms = corrected,
                "expected-to-run time corrected"
            );
        }
        Ok(())
    }
}
