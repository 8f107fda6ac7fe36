//! # Dependency Injection / 依赖注入模块
//!
//! ## Responsibilities / 职责
//!
//! - ✅ Create infra implementations (parameter files, job queue, alarms, clock)
//! - ✅ Pick the check-in service adapter from configuration
//! - ✅ Inject everything into [`AgentDeps`]
//!
//! ## Prohibited / 禁止事项
//!
//! ❌ **No business logic / 禁止包含任何业务逻辑**
//! - Do not decide whether a check-in is due
//! - Do not touch the provisioning state
//!
//! > **This is the only place allowed to depend on dlc-infra and dlc-app simultaneously.**
//! > **这是唯一允许同时依赖 dlc-infra 和 dlc-app 的地方。**

use std::sync::Arc;
use std::time::Duration;

use dlc_app::AgentDeps;
use dlc_core::config::AgentConfig;
use dlc_core::ports::*;
use dlc_core::schedule::{AlarmId, JobInfo};
use dlc_infra::device::{ConfiguredDeviceIdentity, ConfiguredPushToken};
use dlc_infra::parameters::{FileGlobalParameters, FileSetupParameters, FileUserParameters};
use dlc_infra::{FileJobQueue, SystemClock, TokioWallClockAlarm};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::adapters::{
    HttpCheckInService, LoggingFinalization, LoggingProvisionSignals, UnlinkedCheckInService,
};

/// Result type for wiring operations
pub type WiringResult<T> = Result<T, WiringError>;

/// Errors during dependency injection
/// 依赖注入错误
#[derive(Debug, thiserror::Error)]
pub enum WiringError {
    #[error("Data directory is not set")]
    MissingDataDir,

    #[error("Check-in client initialization failed: {0}")]
    CheckInClient(String),
}

const SIGNAL_CHANNEL_CAPACITY: usize = 32;

/// Everything the runtime needs: the port bundle, the concrete job queue
/// (the runtime reports job outcomes to it) and the receiving ends of the
/// alarm and job channels.
pub struct WiredAgent {
    pub deps: AgentDeps,
    pub job_queue: Arc<FileJobQueue>,
    pub alarms: mpsc::Receiver<AlarmId>,
    pub jobs: mpsc::Receiver<JobInfo>,
}

fn check_in_service(config: &AgentConfig) -> WiringResult<Arc<dyn CheckInServicePort>> {
    match config.check_in.endpoint.as_deref() {
        Some(endpoint) => {
            let service = HttpCheckInService::new(
                endpoint,
                Duration::from_secs(config.check_in.timeout_secs),
            )
            .map_err(|e| WiringError::CheckInClient(e.to_string()))?;
            info!(endpoint, "check-in service linked");
            Ok(Arc::new(service))
        }
        None => {
            warn!("no check-in endpoint configured; check-ins will fail");
            Ok(Arc::new(UnlinkedCheckInService))
        }
    }
}

/// Build the agent's dependency graph from configuration.
///
/// Must be called inside a tokio runtime: the alarm and job queue adapters
/// spawn timer tasks.
pub fn wire_dependencies(config: &AgentConfig) -> WiringResult<WiredAgent> {
    if config.data_dir.as_os_str().is_empty() {
        return Err(WiringError::MissingDataDir);
    }
    let data_dir = config.data_dir.clone();

    let clock: Arc<dyn ClockPort> = Arc::new(SystemClock::new());
    let (alarm_tx, alarms) = mpsc::channel(SIGNAL_CHANNEL_CAPACITY);
    let (job_tx, jobs) = mpsc::channel(SIGNAL_CHANNEL_CAPACITY);

    let job_queue = Arc::new(FileJobQueue::with_defaults(
        data_dir.clone(),
        Arc::clone(&clock),
        config.job_queue.clone(),
        job_tx,
    ));

    let deps = AgentDeps {
        global_params: Arc::new(FileGlobalParameters::with_defaults(data_dir.clone())),
        user_params: Arc::new(FileUserParameters::with_defaults(data_dir.clone())),
        setup_params: Arc::new(FileSetupParameters::with_defaults(data_dir)),
        clock: Arc::clone(&clock),
        alarm: Arc::new(TokioWallClockAlarm::new(clock, alarm_tx)),
        job_queue: job_queue.clone(),
        check_in_service: check_in_service(config)?,
        device_identity: Arc::new(ConfiguredDeviceIdentity::new(config.device.clone())),
        push_token: Arc::new(ConfiguredPushToken::new(config.device.push_token.clone())),
        provision_signals: Arc::new(LoggingProvisionSignals),
        finalization: Arc::new(LoggingFinalization),
    };

    Ok(WiredAgent {
        deps,
        job_queue,
        alarms,
        jobs,
    })
}
