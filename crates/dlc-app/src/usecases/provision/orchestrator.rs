//! Provision orchestrator.
//!
//! This module coordinates the provision state machine and side effects.
//! Every dispatch re-reads the state from the store, commits the new state and
//! only then runs the actions. Action failures are logged and never roll the
//! committed state back.

use std::sync::Arc;

use tracing::{debug, error, info, info_span, Instrument};

use dlc_core::ports::{
    FinalizationPort, GlobalParametersPort, ProvisionSignalPort, SchedulerPort,
    UserParametersPort,
};
use dlc_core::schedule::AlarmId;
use dlc_core::{
    DeviceState, ProvisionAction, ProvisionEvent, ProvisionStateMachine, RetryPolicy,
    ScheduleField,
};

/// Errors produced by the provision orchestrator.
#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    #[error("failed to read provision state: {0}")]
    ReadState(#[source] anyhow::Error),
    #[error("failed to commit provision state {state}: {source}")]
    CommitState {
        state: DeviceState,
        #[source]
        source: anyhow::Error,
    },
}

/// Orchestrator that drives provision state and side effects.
pub struct ProvisionOrchestrator {
    user_params: Arc<dyn UserParametersPort>,
    global_params: Arc<dyn GlobalParametersPort>,
    scheduler: Arc<dyn SchedulerPort>,
    signals: Arc<dyn ProvisionSignalPort>,
    finalization: Arc<dyn FinalizationPort>,
    failed_step_policy: RetryPolicy,
}

impl ProvisionOrchestrator {
    pub fn new(
        user_params: Arc<dyn UserParametersPort>,
        global_params: Arc<dyn GlobalParametersPort>,
        scheduler: Arc<dyn SchedulerPort>,
        signals: Arc<dyn ProvisionSignalPort>,
        finalization: Arc<dyn FinalizationPort>,
        failed_step_policy: RetryPolicy,
    ) -> Self {
        Self {
            user_params,
            global_params,
            scheduler,
            signals,
            finalization,
            failed_step_policy,
        }
    }

    pub async fn start(&self) -> Result<DeviceState, ProvisionError> {
        self.dispatch(ProvisionEvent::ProvisionStart).await
    }

    pub async fn pause(&self) -> Result<DeviceState, ProvisionError> {
        self.dispatch(ProvisionEvent::ProvisionPause).await
    }

    pub async fn resume(&self) -> Result<DeviceState, ProvisionError> {
        self.dispatch(ProvisionEvent::ProvisionResume).await
    }

    pub async fn kiosk_ready(&self) -> Result<DeviceState, ProvisionError> {
        self.dispatch(ProvisionEvent::ProvisionKioskReady).await
    }

    pub async fn fail(&self, mandatory: bool) -> Result<DeviceState, ProvisionError> {
        self.dispatch(ProvisionEvent::ProvisionFailure { mandatory })
            .await
    }

    pub async fn finalize(&self) -> Result<DeviceState, ProvisionError> {
        self.dispatch(ProvisionEvent::Finalize).await
    }

    /// Route a fired alarm to the event it stands for. Alarms firing after
    /// the device reached a terminal state write nothing.
    pub async fn on_alarm(&self, id: AlarmId) -> Result<DeviceState, ProvisionError> {
        info!(alarm = %id, "alarm fired");
        let current = self
            .user_params
            .provision_state()
            .await
            .map_err(ProvisionError::ReadState)?;
        if current.is_terminal() {
            debug!(alarm = %id, state = %current, "alarm in terminal state, ignored");
            return Ok(current);
        }

        match id {
            AlarmId::ResumeProvision => self.dispatch(ProvisionEvent::ProvisionResume).await,
            AlarmId::NextProvisionFailedStep => self.on_failed_step_alarm().await,
            AlarmId::ResetDevice => self.dispatch(ProvisionEvent::Finalize).await,
        }
    }

    pub async fn dispatch(&self, event: ProvisionEvent) -> Result<DeviceState, ProvisionError> {
        let span = info_span!("usecase.provision_orchestrator.dispatch", event = event.name());
        async {
            let current = self
                .user_params
                .provision_state()
                .await
                .map_err(ProvisionError::ReadState)?;

            if event == ProvisionEvent::ProvisionPause
                && self
                    .global_params
                    .is_provision_forced()
                    .await
                    .map_err(ProvisionError::ReadState)?
            {
                info!(state = %current, "provisioning is forced, pause ignored");
                return Ok(current);
            }

            let (next, actions) = ProvisionStateMachine::transition(current, event);
            if next == current && actions.is_empty() {
                debug!(state = %current, "event not applicable, ignored");
                return Ok(current);
            }

            self.user_params
                .set_provision_state(next)
                .await
                .map_err(|source| ProvisionError::CommitState {
                    state: next,
                    source,
                })?;
            info!(from = %current, to = %next, event = event.name(), "provision state changed");

            self.execute_actions(actions).await;
            Ok(next)
        }
        .instrument(span)
        .await
    }

    async fn execute_actions(&self, actions: Vec<ProvisionAction>) {
        for action in actions {
            debug!(?action, "executing provision action");
            if let Err(err) = self.execute(action).await {
                error!(error = %err, ?action, "provision action failed");
            }
        }
    }

    async fn execute(&self, action: ProvisionAction) -> anyhow::Result<()> {
        match action {
            ProvisionAction::NotifyProvisionReady => self.signals.provisioning_ready().await,
            ProvisionAction::InstallKioskApp => self.signals.install_kiosk_app().await,
            ProvisionAction::ForceProvision => self.global_params.set_provision_forced(true).await,
            ProvisionAction::ScheduleResumeAlarm => {
                Ok(self.scheduler.schedule_resume_provision_alarm().await?)
            }
            ProvisionAction::ShowDeferredProvisioning => {
                let resume_at_ms = self
                    .user_params
                    .timestamp(ScheduleField::ResumeProvision)
                    .await?;
                self.signals.deferred_provisioning(resume_at_ms).await
            }
            ProvisionAction::CancelResumeAlarm => {
                Ok(self.scheduler.cancel_resume_provision_alarm().await?)
            }
            ProvisionAction::ScheduleFailedStepRetry => self.schedule_failed_step_retry().await,
            ProvisionAction::CancelFailedStepAlarm => Ok(self
                .scheduler
                .cancel_next_provision_failed_step_alarm()
                .await?),
            ProvisionAction::ClearResetCountdown => {
                self.user_params.set_days_left_until_reset(i32::MAX).await
            }
            ProvisionAction::ScheduleMandatoryReset => {
                Ok(self.scheduler.schedule_mandatory_reset_device_alarm().await?)
            }
            ProvisionAction::CancelResetAlarm => {
                Ok(self.scheduler.cancel_reset_device_alarm().await?)
            }
            ProvisionAction::FinalizeEnrolled => self.finalization.finalize_enrolled().await,
            ProvisionAction::FinalizeNotEnrolled => {
                self.finalization.finalize_not_enrolled().await
            }
            ProvisionAction::ResetDevice => self.finalization.reset_device().await,
        }
    }

    fn max_attempts(&self) -> i32 {
        i32::try_from(self.failed_step_policy.max_retries).unwrap_or(i32::MAX - 1)
    }

    /// Start or continue the reset countdown and arm the next failed-step
    /// alarm. An exhausted countdown arms the reset alarm instead.
    async fn schedule_failed_step_retry(&self) -> anyhow::Result<()> {
        let max = self.max_attempts();
        let mut days_left = self.user_params.load().await?.days_left_until_reset;
        if days_left > max {
            days_left = max;
            self.user_params.set_days_left_until_reset(days_left).await?;
        }

        if days_left <= 0 {
            info!("failed-step retries exhausted, scheduling device reset");
            return Ok(self.scheduler.schedule_mandatory_reset_device_alarm().await?);
        }

        let attempt = (max - days_left) as u32;
        let delay = self.failed_step_policy.delay_for_attempt(attempt);
        info!(attempt, days_left, delay_ms = delay.as_millis() as u64, "failed step retry scheduled");
        Ok(self
            .scheduler
            .schedule_next_provision_failed_step_alarm(delay)
            .await?)
    }

    async fn on_failed_step_alarm(&self) -> Result<DeviceState, ProvisionError> {
        let params = self
            .user_params
            .load()
            .await
            .map_err(ProvisionError::ReadState)?;
        if params.provision_state != DeviceState::ProvisionFailed {
            debug!(state = %params.provision_state, "failed-step alarm outside failed state, ignored");
            return Ok(params.provision_state);
        }

        self.clear_intent(ScheduleField::NextProvisionFailedStep)
            .await;
        let days_left = params.days_left_until_reset.min(self.max_attempts()) - 1;
        if let Err(err) = self.user_params.set_days_left_until_reset(days_left).await {
            error!(error = %err, "failed to persist reset countdown");
        }

        if days_left <= 0 {
            info!("reset countdown reached zero");
            self.dispatch(ProvisionEvent::Finalize).await
        } else {
            info!(days_left, "retrying failed provisioning step");
            self.dispatch(ProvisionEvent::ProvisionRetry).await
        }
    }

    async fn clear_intent(&self, field: ScheduleField) {
        if let Err(err) = self.user_params.set_timestamp(field, 0).await {
            error!(error = %err, field = %field, "failed to clear schedule intent");
        }
    }
}
