use std::sync::Arc;

use tracing::{debug, info, info_span, Instrument};

use dlc_core::ports::{ClockPort, SchedulerPort, UserParametersPort};
use dlc_core::ScheduleField;

use super::reschedule_live_intents;

/// Reacts to a wall-clock change.
///
/// The boot time derived from the current clocks is compared with the stored
/// one; the difference is the jump. Stored intents are shifted by it and then
/// re-armed, so they keep their position relative to real elapsed time.
///
/// 墙钟跳变时，按跳变量修正已保存的计划时间并重新设定。
pub struct TimeChangeObserver {
    clock: Arc<dyn ClockPort>,
    user_params: Arc<dyn UserParametersPort>,
    scheduler: Arc<dyn SchedulerPort>,
}

impl TimeChangeObserver {
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

    /// Returns the detected jump, `None` when the clock did not move.
    pub async fn on_time_changed(&self) -> anyhow::Result<Option<chrono::Duration>> {
        let span = info_span!("usecase.lifecycle.time_changed");
        async {
            let state = self.user_params.provision_state().await?;
            if state.is_terminal() {
                debug!(state = %state, "device finalized, clock change ignored");
                return Ok(None);
            }

            let computed_boot_ms = self.clock.now_ms() - self.clock.elapsed_ms();
            let stored_boot_ms = self.user_params.timestamp(ScheduleField::BootTime).await?;
            let delta_ms = computed_boot_ms - stored_boot_ms;
            if delta_ms == 0 {
                debug!("wall clock unchanged");
                return Ok(None);
            }

            self.user_params
                .set_timestamp(ScheduleField::BootTime, computed_boot_ms)
                .await?;
            if stored_boot_ms == 0 {
                debug!(boot_time_ms = computed_boot_ms, "boot time recorded");
                return Ok(None);
            }

            let delta = chrono::Duration::milliseconds(delta_ms);
            info!(delta_ms, "wall clock changed");
            self.scheduler.correct_expected_to_run_time(delta).await?;

            let params = self.user_params.load().await?;
            reschedule_live_intents(self.scheduler.as_ref(), &params).await?;
            Ok(Some(delta))
        }
        .instrument(span)
        .await
    }
}
