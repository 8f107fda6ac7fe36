//! Boot and clock-change handling.
//!
//! Both entry points end the same way: every intent that is live for the
//! current state and non-zero is re-armed from its stored absolute time.

mod boot_completed;
mod time_changed;

pub use boot_completed::BootCompletedHandler;
pub use time_changed::TimeChangeObserver;

use dlc_core::ports::{SchedulerError, SchedulerPort};
use dlc_core::{ScheduleField, UserParameters};

async fn reschedule_live_intents(
    scheduler: &dyn SchedulerPort,
    params: &UserParameters,
) -> Result<(), SchedulerError> {
    for &field in ScheduleField::live_for(params.provision_state) {
        if params.timestamp(field) == 0 {
            continue;
        }
        match field {
            ScheduleField::NextCheckIn => scheduler.reschedule_retry_check_in_work().await?,
            ScheduleField::ResumeProvision => {
                scheduler.reschedule_resume_provision_alarm().await?
            }
            ScheduleField::NextProvisionFailedStep => {
                scheduler
                    .reschedule_next_provision_failed_step_alarm()
                    .await?
            }
            ScheduleField::ResetDevice => scheduler.reschedule_reset_device_alarm().await?,
            ScheduleField::BootTime => {}
        }
    }
    Ok(())
}
