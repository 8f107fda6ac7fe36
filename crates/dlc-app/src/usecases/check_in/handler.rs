use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, info_span, warn, Instrument};

use dlc_core::ports::{
    CheckInServicePort, ClockPort, DeviceIdentityPort, GlobalParametersPort, PushTokenPort,
    SchedulerError, SchedulerPort, SetupParametersPort, UserParametersPort,
};
use dlc_core::{
    CheckInFailureCause, CheckInOutcome, CheckInReport, ProvisionEvent, ProvisioningConfiguration,
    ProvisioningType, SetupParameters,
};

use crate::usecases::provision::{ProvisionError, ProvisionOrchestrator};

/// Local failures that stop an attempt before its response is interpreted.
#[derive(Debug, thiserror::Error)]
pub enum CheckInError {
    #[error("failed to collect device identity: {0}")]
    Identity(#[source] anyhow::Error),
    #[error("parameter store failed: {0}")]
    Store(#[source] anyhow::Error),
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
    #[error(transparent)]
    Provision(#[from] ProvisionError),
}

/// Runs a single device check-in and applies the server's answer.
pub struct CheckInProtocolHandler {
    identity: Arc<dyn DeviceIdentityPort>,
    service: Arc<dyn CheckInServicePort>,
    push_token: Arc<dyn PushTokenPort>,
    global_params: Arc<dyn GlobalParametersPort>,
    user_params: Arc<dyn UserParametersPort>,
    setup_params: Arc<dyn SetupParametersPort>,
    clock: Arc<dyn ClockPort>,
    scheduler: Arc<dyn SchedulerPort>,
    orchestrator: Arc<ProvisionOrchestrator>,
    failure_retry_delay: Duration,
}

impl CheckInProtocolHandler {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        identity: Arc<dyn DeviceIdentityPort>,
        service: Arc<dyn CheckInServicePort>,
        push_token: Arc<dyn PushTokenPort>,
        global_params: Arc<dyn GlobalParametersPort>,
        user_params: Arc<dyn UserParametersPort>,
        setup_params: Arc<dyn SetupParametersPort>,
        clock: Arc<dyn ClockPort>,
        scheduler: Arc<dyn SchedulerPort>,
        orchestrator: Arc<ProvisionOrchestrator>,
        failure_retry_delay: Duration,
    ) -> Self {
        Self {
            identity,
            service,
            push_token,
            global_params,
            user_params,
            setup_params,
            clock,
            scheduler,
            orchestrator,
            failure_retry_delay,
        }
    }

    pub async fn handle(&self) -> Result<CheckInReport, CheckInError> {
        let span = info_span!("usecase.check_in.handle");
        async {
            let state = self
                .user_params
                .provision_state()
                .await
                .map_err(CheckInError::Store)?;
            if state.is_terminal() {
                debug!(state = %state, "device finalized, check-in skipped");
                return Ok(CheckInReport::Handled);
            }

            let identity = self
                .identity
                .device_ids()
                .await
                .map_err(CheckInError::Identity)?;
            if identity.is_empty() {
                let cause = CheckInFailureCause::DeviceIdentifierUnavailable;
                warn!(cause = %cause, "no device identifier available, finalizing");
                self.orchestrator.dispatch(ProvisionEvent::Finalize).await?;
                return Ok(CheckInReport::Failed(cause));
            }

            let carrier_info = match self.identity.carrier_info().await {
                Ok(info) => info.unwrap_or_default(),
                Err(err) => {
                    warn!(error = %err, "carrier info unavailable");
                    String::new()
                }
            };
            let push_token = match self.push_token.registration_token().await {
                Ok(token) => token,
                Err(err) => {
                    warn!(error = %err, "push token unavailable");
                    None
                }
            };

            info!(ids = identity.len(), "checking in");
            let response = match self
                .service
                .check_in(&identity, &carrier_info, push_token.as_deref())
                .await
            {
                Ok(response) => response,
                Err(err) => {
                    warn!(error = %err, "check-in call failed");
                    return self.on_remote_failure().await;
                }
            };

            if let Some(id) = response.registered_device_id {
                self.global_params
                    .set_registered_device_id(Some(id))
                    .await
                    .map_err(CheckInError::Store)?;
            }

            info!(outcome = response.outcome.name(), "check-in response received");
            self.on_outcome(response.outcome, push_token.as_deref())
                .await
        }
        .instrument(span)
        .await
    }

    async fn on_outcome(
        &self,
        outcome: CheckInOutcome,
        push_token: Option<&str>,
    ) -> Result<CheckInReport, CheckInError> {
        match outcome {
            CheckInOutcome::RecoverableError => Ok(CheckInReport::Retry),
            CheckInOutcome::ReadyForProvision {
                config,
                provisioning_type,
                mandatory,
                debug_allowed,
                provision_forced,
            } => {
                let report = self
                    .on_ready_for_provision(
                        config,
                        provisioning_type,
                        mandatory,
                        debug_allowed,
                        provision_forced,
                    )
                    .await?;
                // The boot-time check-in is done with either way.
                self.user_params
                    .set_need_initial_check_in(false)
                    .await
                    .map_err(CheckInError::Store)?;
                self.retrieve_push_token_if_missing(push_token).await;
                Ok(report)
            }
            CheckInOutcome::RetryCheckIn {
                next_check_in_time_ms,
            } => {
                let Some(now_ms) = self.clock.network_time_ms() else {
                    return Ok(self.failed(CheckInFailureCause::NetworkTimeUnavailable));
                };
                let delay =
                    Duration::from_millis(next_check_in_time_ms.saturating_sub(now_ms).max(0) as u64);

                self.scheduler.schedule_retry_check_in_work(delay).await?;
                self.orchestrator
                    .dispatch(ProvisionEvent::CheckInRetryScheduled)
                    .await?;
                self.retrieve_push_token_if_missing(push_token).await;
                Ok(CheckInReport::Handled)
            }
            CheckInOutcome::StopCheckIn => {
                self.orchestrator.dispatch(ProvisionEvent::Finalize).await?;
                Ok(CheckInReport::Handled)
            }
            CheckInOutcome::Unspecified => {
                Ok(self.failed(CheckInFailureCause::ResponseUnspecified))
            }
            CheckInOutcome::Interrupted => Ok(self.failed(CheckInFailureCause::Interrupted)),
            CheckInOutcome::NonRecoverableError => self.on_remote_failure().await,
        }
    }

    async fn on_ready_for_provision(
        &self,
        config: Option<ProvisioningConfiguration>,
        provisioning_type: ProvisioningType,
        mandatory: bool,
        debug_allowed: bool,
        provision_forced: bool,
    ) -> Result<CheckInReport, CheckInError> {
        self.global_params
            .set_provision_forced(provision_forced)
            .await
            .map_err(CheckInError::Store)?;
        let Some(configuration) = config else {
            return Ok(self.failed(CheckInFailureCause::ConfigUnavailable));
        };

        self.setup_params
            .store(&SetupParameters {
                configuration,
                provisioning_type,
                mandatory,
                debug_allowed,
            })
            .await
            .map_err(CheckInError::Store)?;
        self.global_params
            .set_provision_ready(true)
            .await
            .map_err(CheckInError::Store)?;
        self.global_params
            .set_need_check_in(false)
            .await
            .map_err(CheckInError::Store)?;

        self.orchestrator
            .dispatch(ProvisionEvent::CheckInReady)
            .await?;
        Ok(CheckInReport::Handled)
    }

    async fn on_remote_failure(&self) -> Result<CheckInReport, CheckInError> {
        self.scheduler
            .schedule_retry_check_in_work(self.failure_retry_delay)
            .await?;
        self.orchestrator
            .dispatch(ProvisionEvent::CheckInRetryScheduled)
            .await?;
        Ok(self.failed(CheckInFailureCause::RemoteCallFailed))
    }

    fn failed(&self, cause: CheckInFailureCause) -> CheckInReport {
        warn!(cause = %cause, "check-in failed");
        CheckInReport::Failed(cause)
    }

    async fn retrieve_push_token_if_missing(&self, push_token: Option<&str>) {
        if push_token.is_some_and(|token| !token.trim().is_empty()) {
            return;
        }
        if let Err(err) = self.scheduler.schedule_push_token_retrieval_work().await {
            warn!(error = %err, "failed to schedule push token retrieval");
        }
    }
}
