use serde::{Deserialize, Serialize};

use crate::provision::DeviceState;

/// Per-user parameters.
///
/// Every `*_time_millis` field is an absolute wall-clock intent in epoch
/// milliseconds. `0` means there is no pending intent.
///
/// 每个 `*_time_millis` 字段都是绝对墙钟时间，`0` 表示没有待执行的计划。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserParameters {
    pub provision_state: DeviceState,
    pub boot_time_millis: i64,
    pub next_check_in_time_millis: i64,
    pub resume_provision_time_millis: i64,
    pub next_provision_failed_step_time_millis: i64,
    pub reset_device_time_millis: i64,
    /// Remaining failed-step retries before the device is reset.
    /// `i32::MAX` means the countdown has not started.
    pub days_left_until_reset: i32,
    pub need_initial_check_in: bool,
}

impl Default for UserParameters {
    fn default() -> Self {
        Self {
            provision_state: DeviceState::default(),
            boot_time_millis: 0,
            next_check_in_time_millis: 0,
            resume_provision_time_millis: 0,
            next_provision_failed_step_time_millis: 0,
            reset_device_time_millis: 0,
            days_left_until_reset: i32::MAX,
            need_initial_check_in: true,
        }
    }
}

impl UserParameters {
    pub fn timestamp(&self, field: ScheduleField) -> i64 {
        match field {
            ScheduleField::BootTime => self.boot_time_millis,
            ScheduleField::NextCheckIn => self.next_check_in_time_millis,
            ScheduleField::ResumeProvision => self.resume_provision_time_millis,
            ScheduleField::NextProvisionFailedStep => self.next_provision_failed_step_time_millis,
            ScheduleField::ResetDevice => self.reset_device_time_millis,
        }
    }

    pub fn set_timestamp(&mut self, field: ScheduleField, value: i64) {
        let slot = match field {
            ScheduleField::BootTime => &mut self.boot_time_millis,
            ScheduleField::NextCheckIn => &mut self.next_check_in_time_millis,
            ScheduleField::ResumeProvision => &mut self.resume_provision_time_millis,
            ScheduleField::NextProvisionFailedStep => {
                &mut self.next_provision_failed_step_time_millis
            }
            ScheduleField::ResetDevice => &mut self.reset_device_time_millis,
        };
        *slot = value;
    }

    /// Reset to defaults but keep the recorded boot time.
    pub fn cleared(&self) -> Self {
        Self {
            boot_time_millis: self.boot_time_millis,
            ..Self::default()
        }
    }
}

/// Timestamp fields of [`UserParameters`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleField {
    BootTime,
    NextCheckIn,
    ResumeProvision,
    NextProvisionFailedStep,
    ResetDevice,
}

impl ScheduleField {
    /// Fields whose value is a schedule intent that follows the wall clock.
    pub const INTENTS: [ScheduleField; 4] = [
        ScheduleField::NextCheckIn,
        ScheduleField::ResumeProvision,
        ScheduleField::NextProvisionFailedStep,
        ScheduleField::ResetDevice,
    ];

    /// Intent fields that are live in `state`.
    pub fn live_for(state: DeviceState) -> &'static [ScheduleField] {
        match state {
            DeviceState::Unprovisioned | DeviceState::CheckingIn => &[ScheduleField::NextCheckIn],
            DeviceState::ProvisionPaused => &[ScheduleField::ResumeProvision],
            DeviceState::ProvisionFailed => &[
                ScheduleField::NextProvisionFailedStep,
                ScheduleField::ResetDevice,
            ],
            DeviceState::AwaitingProvision
            | DeviceState::ProvisionInProgress
            | DeviceState::ProvisionSuccess
            | DeviceState::Finalized => &[],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ScheduleField::BootTime => "boot_time_millis",
            ScheduleField::NextCheckIn => "next_check_in_time_millis",
            ScheduleField::ResumeProvision => "resume_provision_time_millis",
            ScheduleField::NextProvisionFailedStep => "next_provision_failed_step_time_millis",
            ScheduleField::ResetDevice => "reset_device_time_millis",
        }
    }
}

impl std::fmt::Display for ScheduleField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
