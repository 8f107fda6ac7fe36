use serde::{Deserialize, Serialize};

/// Provisioning lifecycle state of a device.
///
/// 设备配置生命周期状态。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceState {
    /// Nothing has happened yet.
    ///
    /// 尚未开始。
    #[default]
    Unprovisioned,
    /// Check-in is pending or being retried.
    ///
    /// 正在签到或等待重试。
    CheckingIn,
    /// Server said the device is ready for provisioning.
    ///
    /// 服务端已下发配置，等待开始。
    AwaitingProvision,
    /// Kiosk app install and lock-task setup are running.
    ///
    /// 正在安装 kiosk 应用。
    ProvisionInProgress,
    /// User deferred provisioning; resume alarm is armed.
    ///
    /// 用户推迟配置，恢复闹钟已设定。
    ProvisionPaused,
    ProvisionSuccess,
    /// A provisioning step failed; retry or reset is pending.
    ///
    /// 配置步骤失败，等待重试或重置。
    ProvisionFailed,
    /// Terminal. No further event changes the state.
    ///
    /// 终止状态。
    Finalized,
}

impl DeviceState {
    pub fn is_terminal(self) -> bool {
        matches!(self, DeviceState::Finalized)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DeviceState::Unprovisioned => "unprovisioned",
            DeviceState::CheckingIn => "checking_in",
            DeviceState::AwaitingProvision => "awaiting_provision",
            DeviceState::ProvisionInProgress => "provision_in_progress",
            DeviceState::ProvisionPaused => "provision_paused",
            DeviceState::ProvisionSuccess => "provision_success",
            DeviceState::ProvisionFailed => "provision_failed",
            DeviceState::Finalized => "finalized",
        }
    }
}

impl std::fmt::Display for DeviceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
