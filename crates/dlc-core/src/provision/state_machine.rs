//! Provision state machine.
//!
//! Defines a pure state transition function for the provisioning flow. The
//! orchestrator in the app layer persists the returned state and then runs
//! the returned actions.

use serde::{Deserialize, Serialize};

use super::state::DeviceState;

/// Events that drive the provisioning flow.
///
/// 驱动配置流程的事件。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProvisionEvent {
    /// Check-in answered "ready for provision".
    ///
    /// 签到返回可以开始配置。
    CheckInReady,
    /// Check-in answered "retry later" and a retry was scheduled.
    ///
    /// 签到要求稍后重试。
    CheckInRetryScheduled,
    /// Provisioning UI started the install.
    ///
    /// 开始配置。
    ProvisionStart,
    /// User deferred provisioning.
    ///
    /// 用户推迟配置。
    ProvisionPause,
    /// Resume alarm fired or user resumed.
    ///
    /// 恢复配置。
    ProvisionResume,
    /// Kiosk app installed and ready.
    ///
    /// kiosk 应用就绪。
    ProvisionKioskReady,
    /// A provisioning step failed.
    ///
    /// 配置步骤失败。
    ProvisionFailure { mandatory: bool },
    /// Failed-step alarm fired and attempts remain.
    ///
    /// 失败步骤重试。
    ProvisionRetry,
    Finalize,
}

impl ProvisionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ProvisionEvent::CheckInReady => "check_in_ready",
            ProvisionEvent::CheckInRetryScheduled => "check_in_retry_scheduled",
            ProvisionEvent::ProvisionStart => "provision_start",
            ProvisionEvent::ProvisionPause => "provision_pause",
            ProvisionEvent::ProvisionResume => "provision_resume",
            ProvisionEvent::ProvisionKioskReady => "provision_kiosk_ready",
            ProvisionEvent::ProvisionFailure { .. } => "provision_failure",
            ProvisionEvent::ProvisionRetry => "provision_retry",
            ProvisionEvent::Finalize => "finalize",
        }
    }
}

/// Side-effects produced by state transitions.
///
/// 状态迁移产生的副作用。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProvisionAction {
    /// Tell the provisioning UI that setup parameters are available.
    NotifyProvisionReady,
    /// Install the kiosk app and enter lock task mode.
    InstallKioskApp,
    /// Mark provisioning as forced so it cannot be deferred again.
    ForceProvision,
    ScheduleResumeAlarm,
    /// Show the "provisioning deferred" notice.
    ShowDeferredProvisioning,
    CancelResumeAlarm,
    /// Arm the next failed-step alarm and advance the reset countdown.
    ScheduleFailedStepRetry,
    CancelFailedStepAlarm,
    /// Clear the failed-step reset countdown.
    ClearResetCountdown,
    ScheduleMandatoryReset,
    CancelResetAlarm,
    FinalizeEnrolled,
    FinalizeNotEnrolled,
    ResetDevice,
}

/// Pure provision state machine.
///
/// 纯状态机：不包含副作用。
pub struct ProvisionStateMachine;

/// Every transition into `Finalized` disarms the alarms first; nothing may
/// fire against a terminal device.
fn finalize_with(
    cancel: &[ProvisionAction],
    finalize: ProvisionAction,
) -> (DeviceState, Vec<ProvisionAction>) {
    let mut actions = cancel.to_vec();
    actions.push(ProvisionAction::CancelFailedStepAlarm);
    actions.push(ProvisionAction::CancelResetAlarm);
    actions.push(finalize);
    (DeviceState::Finalized, actions)
}

impl ProvisionStateMachine {
    pub fn transition(
        state: DeviceState,
        event: ProvisionEvent,
    ) -> (DeviceState, Vec<ProvisionAction>) {
        use DeviceState as S;
        use ProvisionEvent as E;

        match (state, event) {
            (S::Finalized, _) => (S::Finalized, Vec::new()),

            (S::Unprovisioned | S::CheckingIn, E::CheckInRetryScheduled) => {
                (S::CheckingIn, Vec::new())
            }
            (S::Unprovisioned | S::CheckingIn, E::CheckInReady) => (
                S::AwaitingProvision,
                vec![ProvisionAction::NotifyProvisionReady],
            ),

            (S::AwaitingProvision, E::ProvisionStart) => (
                S::ProvisionInProgress,
                vec![ProvisionAction::InstallKioskApp],
            ),
            (S::AwaitingProvision | S::ProvisionInProgress, E::ProvisionPause) => (
                S::ProvisionPaused,
                vec![
                    ProvisionAction::ForceProvision,
                    ProvisionAction::ScheduleResumeAlarm,
                    ProvisionAction::ShowDeferredProvisioning,
                ],
            ),
            (S::ProvisionPaused, E::ProvisionResume) => (
                S::ProvisionInProgress,
                vec![
                    ProvisionAction::CancelResumeAlarm,
                    ProvisionAction::InstallKioskApp,
                ],
            ),

            (S::ProvisionInProgress, E::ProvisionKioskReady) => (
                S::ProvisionSuccess,
                vec![
                    ProvisionAction::CancelFailedStepAlarm,
                    ProvisionAction::ClearResetCountdown,
                ],
            ),
            (S::ProvisionInProgress, E::ProvisionFailure { mandatory: true }) => (
                S::ProvisionFailed,
                vec![ProvisionAction::ScheduleMandatoryReset],
            ),
            (S::ProvisionInProgress, E::ProvisionFailure { mandatory: false }) => (
                S::ProvisionFailed,
                vec![ProvisionAction::ScheduleFailedStepRetry],
            ),
            (S::ProvisionFailed, E::ProvisionRetry) => (
                S::ProvisionInProgress,
                vec![ProvisionAction::InstallKioskApp],
            ),

            (S::Unprovisioned | S::CheckingIn | S::AwaitingProvision, E::Finalize) => {
                finalize_with(&[], ProvisionAction::FinalizeNotEnrolled)
            }
            (S::ProvisionPaused, E::Finalize) => finalize_with(
                &[ProvisionAction::CancelResumeAlarm],
                ProvisionAction::FinalizeNotEnrolled,
            ),
            (S::ProvisionSuccess, E::Finalize) => {
                finalize_with(&[], ProvisionAction::FinalizeEnrolled)
            }
            (S::ProvisionFailed, E::Finalize) => finalize_with(&[], ProvisionAction::ResetDevice),

            (state, _event) => (state, Vec::new()),
        }
    }
}
