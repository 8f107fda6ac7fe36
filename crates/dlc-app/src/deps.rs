//! # Agent Dependencies / 代理依赖
//!
//! This module defines the dependency grouping for use case construction.
//! 此模块定义用例构造的依赖分组。
//!
//! **Note / 注意**: This is NOT a Builder pattern. Just parameter grouping.
//! **这不是 Builder 模式**，仅用于参数打包。

use std::sync::Arc;
use dlc_core::ports::*;

/// Agent dependency grouping (non-Builder, just parameter grouping)
/// 代理依赖分组（非 Builder，仅参数打包）
///
/// All dependencies are required - no defaults, no optional fields.
/// 所有依赖都是必需的 - 无默认值，无可选字段。
pub struct AgentDeps {
    // Storage dependencies / 存储依赖
    pub global_params: Arc<dyn GlobalParametersPort>,
    pub user_params: Arc<dyn UserParametersPort>,
    pub setup_params: Arc<dyn SetupParametersPort>,

    // Scheduling dependencies / 调度依赖
    pub clock: Arc<dyn ClockPort>,
    pub alarm: Arc<dyn WallClockAlarmPort>,
    pub job_queue: Arc<dyn DurableJobQueuePort>,

    // Check-in dependencies / 签到依赖
    pub check_in_service: Arc<dyn CheckInServicePort>,
    pub device_identity: Arc<dyn DeviceIdentityPort>,
    pub push_token: Arc<dyn PushTokenPort>,

    // Outbound collaborators / 外部协作方
    pub provision_signals: Arc<dyn ProvisionSignalPort>,
    pub finalization: Arc<dyn FinalizationPort>,
}
