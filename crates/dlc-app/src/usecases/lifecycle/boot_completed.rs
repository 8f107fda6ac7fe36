use std::sync::Arc;

use tracing::{info, info_span, Instrument};

use dlc_core::ports::{ClockPort, SchedulerPort, UserParametersPort};
use dlc_core::{DeviceState, ScheduleField};

use super::reschedule_live_intents;

/// Runs once per boot: records the boot time, starts the first check-in when
/// the device never had one and re-arms every persisted intent.
pub struct BootCompletedHandler {
    clock: Arc<dyn ClockPort>,
    user_params: Arc<dyn UserParametersPort>,
    scheduler: Arc<dyn SchedulerPort>,
}

impl BootCompletedHandler {
    pub fn new(
        clock: Arc<dyn ClockPort>,
        user_params: Arc<dyn UserParametersPort>,
        scheduler: Arc<dyn SchedulerPort>,
    ) -> Self {
        Self {
            clock,
            user_params,
            scheduler,
        }
    }

    pub async fn on_boot_completed(&self) -> anyhow::Result<()> {
        let span = info_span!("usecase.lifecycle.boot_completed");
        async {
            let params = self.user_params.load().await?;
            if params.provision_state.is_terminal() {
                info!(state = %params.provision_state, "boot completed, device finalized");
                return Ok(());
            }

            let boot_time_ms = self.clock.now_ms() - self.clock.elapsed_ms();
            self.user_params
                .set_timestamp(ScheduleField::BootTime, boot_time_ms)
                .await?;
            info!(state = %params.provision_state, boot_time_ms, "boot completed");

            if params.need_initial_check_in && params.provision_state == DeviceState::Unprovisioned
            {
                self.scheduler.schedule_initial_check_in_work().await?;
            }

            reschedule_live_intents(self.scheduler.as_ref(), &params).await?;
            Ok(())
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::test_support::Harness;
    use dlc_core::schedule::{AlarmId, DEVICE_CHECK_IN_WORK_NAME};

    fn boot(h: &Harness) -> BootCompletedHandler {
        BootCompletedHandler::new(h.clock.clone(), h.user_params.clone(), h.scheduler.clone())
    }

    #[tokio::test]
    async fn first_boot_records_boot_time_and_schedules_initial_check_in() {
        let h = Harness::new();

        boot(&h).on_boot_completed().await.unwrap();

        let params = h.user_params.snapshot();
        assert_eq!(params.boot_time_millis, h.clock_now() - 1_000);
        assert!(!params.need_initial_check_in);
        let job = h.job_queue.pending(DEVICE_CHECK_IN_WORK_NAME).unwrap();
        assert_eq!(job.initial_delay, Duration::ZERO);
    }

    #[tokio::test]
    async fn reboot_rearms_retry_check_in_from_stored_intent() {
        let h = Harness::new();
        h.user_params.set_need_initial_check_in(false).await.unwrap();
        h.user_params
            .set_provision_state(DeviceState::CheckingIn)
            .await
            .unwrap();
        h.user_params
            .set_timestamp(ScheduleField::NextCheckIn, h.clock_now() + 60_000)
            .await
            .unwrap();

        boot(&h).on_boot_completed().await.unwrap();

        let job = h.job_queue.pending(DEVICE_CHECK_IN_WORK_NAME).unwrap();
        assert_eq!(job.initial_delay, Duration::from_millis(60_000));
        assert_eq!(h.job_queue.enqueue_count(), 1);
    }

    #[tokio::test]
    async fn reboot_rearms_resume_alarm_when_paused() {
        let h = Harness::new();
        h.user_params.set_need_initial_check_in(false).await.unwrap();
        h.user_params
            .set_provision_state(DeviceState::ProvisionPaused)
            .await
            .unwrap();
        h.user_params
            .set_timestamp(ScheduleField::ResumeProvision, h.clock_now() + 30_000)
            .await
            .unwrap();

        boot(&h).on_boot_completed().await.unwrap();

        assert_eq!(
            h.alarm.armed(AlarmId::ResumeProvision),
            Some(h.clock.elapsed_ms() + 30_000)
        );
        assert_eq!(h.job_queue.enqueue_count(), 0);
    }

    #[tokio::test]
    async fn finalized_device_schedules_nothing() {
        let h = Harness::new();
        h.user_params
            .set_provision_state(DeviceState::Finalized)
            .await
            .unwrap();

        boot(&h).on_boot_completed().await.unwrap();

        assert_eq!(h.job_queue.enqueue_count(), 0);
    }
}
