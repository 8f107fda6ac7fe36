use serde::{Deserialize, Serialize};

use crate::parameters::ScheduleField;

/// Identity of a wall-clock alarm. Arming an id replaces any alarm already
/// armed under it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlarmId {
    ResumeProvision,
    NextProvisionFailedStep,
    ResetDevice,
}

impl AlarmId {
    pub const ALL: [AlarmId; 3] = [
        AlarmId::ResumeProvision,
        AlarmId::NextProvisionFailedStep,
        AlarmId::ResetDevice,
    ];

    /// The user parameter holding this alarm's wall-clock intent.
    pub fn field(self) -> ScheduleField {
        match self {
            AlarmId::ResumeProvision => ScheduleField::ResumeProvision,
            AlarmId::NextProvisionFailedStep => ScheduleField::NextProvisionFailedStep,
            AlarmId::ResetDevice => ScheduleField::ResetDevice,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AlarmId::ResumeProvision => "resume_provision",
            AlarmId::NextProvisionFailedStep => "next_provision_failed_step",
            AlarmId::ResetDevice => "reset_device",
        }
    }
}

impl std::fmt::Display for AlarmId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
