//! Shared wiring for the integration tests: real file-backed stores, job
//! queue and alarms from `dlc-infra`, with scripted doubles at the edges.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use dlc_app::usecases::{
    BootCompletedHandler, CheckInProtocolHandler, DeviceLockScheduler, ProvisionOrchestrator,
    TimeChangeObserver,
};
use dlc_core::config::{JobQueueConfig, ScheduleConfig};
use dlc_core::ports::*;
use dlc_core::{
    AlarmId, CheckInResponse, DeviceIdType, DeviceIdentity, DeviceState, JobInfo, RetryPolicy,
    ScheduleField, UserParameters,
};
use dlc_infra::parameters::{FileGlobalParameters, FileSetupParameters, FileUserParameters};
use dlc_infra::{FileJobQueue, TokioWallClockAlarm};

pub const HOUR_MS: i64 = 60 * 60 * 1000;
pub const DAY_MS: i64 = 24 * HOUR_MS;

/// Wall clock at T = 5h, one second after boot.
pub const T_MS: i64 = 5 * HOUR_MS;
pub const BOOT_ELAPSED_MS: i64 = 1_000;

pub struct FakeClock {
    now_ms: AtomicI64,
    elapsed_ms: AtomicI64,
    network_available: AtomicBool,
}

impl FakeClock {
    pub fn at_t() -> Arc<Self> {
        Arc::new(Self {
            now_ms: AtomicI64::new(T_MS),
            elapsed_ms: AtomicI64::new(BOOT_ELAPSED_MS),
            network_available: AtomicBool::new(true),
        })
    }

    pub fn advance(&self, ms: i64) {
        self.now_ms.fetch_add(ms, Ordering::SeqCst);
        self.elapsed_ms.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn jump_wall_clock(&self, delta_ms: i64) {
        self.now_ms.fetch_add(delta_ms, Ordering::SeqCst);
    }

    /// A reboot resets elapsed time; the wall clock keeps going.
    pub fn reboot(&self, elapsed_ms: i64) {
        self.elapsed_ms.store(elapsed_ms, Ordering::SeqCst);
    }

    pub fn set_network_available(&self, available: bool) {
        self.network_available.store(available, Ordering::SeqCst);
    }
}

impl ClockPort for FakeClock {
    fn now_ms(&self) -> i64 {
        self.now_ms.load(Ordering::SeqCst)
    }

    fn elapsed_ms(&self) -> i64 {
        self.elapsed_ms.load(Ordering::SeqCst)
    }

    fn network_time_ms(&self) -> Option<i64> {
        self.network_available
            .load(Ordering::SeqCst)
            .then(|| self.now_ms())
    }
}

/// Check-in service that replays scripted responses in order.
#[derive(Default)]
pub struct StubCheckInService {
    responses: Mutex<VecDeque<Result<CheckInResponse, String>>>,
    calls: AtomicUsize,
}

impl StubCheckInService {
    pub fn respond(&self, response: CheckInResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    pub fn fail_transport(&self, message: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CheckInServicePort for StubCheckInService {
    async fn check_in(
        &self,
        _identity: &DeviceIdentity,
        _carrier_info: &str,
        _push_token: Option<&str>,
    ) -> Result<CheckInResponse, CheckInServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.responses.lock().unwrap().pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(CheckInServiceError::Transport(message)),
            None => Err(CheckInServiceError::Transport("no scripted response".into())),
        }
    }
}

pub struct StaticIdentity {
    ids: Vec<(DeviceIdType, String)>,
}

impl StaticIdentity {
    pub fn imei(value: &str) -> Self {
        Self {
            ids: vec![(DeviceIdType::Imei, value.to_string())],
        }
    }

    pub fn empty() -> Self {
        Self { ids: Vec::new() }
    }
}

#[async_trait]
impl DeviceIdentityPort for StaticIdentity {
    async fn device_ids(&self) -> anyhow::Result<DeviceIdentity> {
        let mut identity = DeviceIdentity::new();
        for (kind, value) in &self.ids {
            identity.insert(*kind, value.clone());
        }
        Ok(identity)
    }

    async fn carrier_info(&self) -> anyhow::Result<Option<String>> {
        Ok(Some("test-carrier".to_string()))
    }
}

#[derive(Default)]
pub struct StaticPushToken {
    token: Mutex<Option<String>>,
}

impl StaticPushToken {
    pub fn set(&self, token: &str) {
        *self.token.lock().unwrap() = Some(token.to_string());
    }
}

#[async_trait]
impl PushTokenPort for StaticPushToken {
    async fn registration_token(&self) -> anyhow::Result<Option<String>> {
        Ok(self.token.lock().unwrap().clone())
    }
}

#[derive(Default)]
pub struct RecordingSignals {
    pub ready: AtomicUsize,
    pub install: AtomicUsize,
    pub deferred: Mutex<Vec<i64>>,
}

#[async_trait]
impl ProvisionSignalPort for RecordingSignals {
    async fn provisioning_ready(&self) -> anyhow::Result<()> {
        self.ready.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn install_kiosk_app(&self) -> anyhow::Result<()> {
        self.install.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn deferred_provisioning(&self, resume_at_ms: i64) -> anyhow::Result<()> {
        self.deferred.lock().unwrap().push(resume_at_ms);
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingFinalization {
    pub enrolled: AtomicUsize,
    pub not_enrolled: AtomicUsize,
    pub reset: AtomicUsize,
}

#[async_trait]
impl FinalizationPort for RecordingFinalization {
    async fn finalize_enrolled(&self) -> anyhow::Result<()> {
        self.enrolled.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn finalize_not_enrolled(&self) -> anyhow::Result<()> {
        self.not_enrolled.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn reset_device(&self) -> anyhow::Result<()> {
        self.reset.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// One agent instance over a data directory.
pub struct Agent {
    pub clock: Arc<FakeClock>,
    pub user_params: Arc<FileUserParameters>,
    pub global_params: Arc<FileGlobalParameters>,
    pub setup_params: Arc<FileSetupParameters>,
    pub alarm: Arc<TokioWallClockAlarm>,
    pub job_queue: Arc<FileJobQueue>,
    pub service: Arc<StubCheckInService>,
    pub push_token: Arc<StaticPushToken>,
    pub signals: Arc<RecordingSignals>,
    pub finalization: Arc<RecordingFinalization>,
    pub scheduler: Arc<DeviceLockScheduler>,
    pub orchestrator: Arc<ProvisionOrchestrator>,
    pub handler: CheckInProtocolHandler,
    pub alarms: mpsc::Receiver<AlarmId>,
    pub jobs: mpsc::Receiver<JobInfo>,
}

impl Agent {
    pub fn open(dir: &Path, clock: Arc<FakeClock>) -> Self {
        Self::open_with(dir, clock, StaticIdentity::imei("490154203237518"), RetryPolicy::default())
    }

    pub fn open_with(
        dir: &Path,
        clock: Arc<FakeClock>,
        identity: StaticIdentity,
        failed_step: RetryPolicy,
    ) -> Self {
        let (alarm_tx, alarms) = mpsc::channel(16);
        let (job_tx, jobs) = mpsc::channel(16);

        let user_params = Arc::new(FileUserParameters::with_defaults(dir.to_path_buf()));
        let global_params = Arc::new(FileGlobalParameters::with_defaults(dir.to_path_buf()));
        let setup_params = Arc::new(FileSetupParameters::with_defaults(dir.to_path_buf()));
        let alarm = Arc::new(TokioWallClockAlarm::new(clock.clone(), alarm_tx));
        let job_queue = Arc::new(FileJobQueue::with_defaults(
            dir.to_path_buf(),
            clock.clone(),
            JobQueueConfig::default(),
            job_tx,
        ));
        let service = Arc::new(StubCheckInService::default());
        let push_token = Arc::new(StaticPushToken::default());
        let signals = Arc::new(RecordingSignals::default());
        let finalization = Arc::new(RecordingFinalization::default());

        let scheduler = Arc::new(DeviceLockScheduler::new(
            clock.clone(),
            user_params.clone(),
            alarm.clone(),
            job_queue.clone(),
            ScheduleConfig::default(),
        ));
        let orchestrator = Arc::new(ProvisionOrchestrator::new(
            user_params.clone(),
            global_params.clone(),
            scheduler.clone(),
            signals.clone(),
            finalization.clone(),
            failed_step,
        ));
        let handler = CheckInProtocolHandler::new(
            Arc::new(identity),
            service.clone(),
            push_token.clone(),
            global_params.clone(),
            user_params.clone(),
            setup_params.clone(),
            clock.clone(),
            scheduler.clone(),
            orchestrator.clone(),
            Duration::from_secs(24 * 60 * 60),
        );

        Self {
            clock,
            user_params,
            global_params,
            setup_params,
            alarm,
            job_queue,
            service,
            push_token,
            signals,
            finalization,
            scheduler,
            orchestrator,
            handler,
            alarms,
            jobs,
        }
    }

    pub fn boot_handler(&self) -> BootCompletedHandler {
        BootCompletedHandler::new(
            self.clock.clone(),
            self.user_params.clone(),
            self.scheduler.clone(),
        )
    }

    pub fn time_observer(&self) -> TimeChangeObserver {
        TimeChangeObserver::new(
            self.clock.clone(),
            self.user_params.clone(),
            self.scheduler.clone(),
        )
    }

    pub async fn params(&self) -> UserParameters {
        self.user_params.load().await.expect("load user parameters")
    }

    pub async fn state(&self) -> DeviceState {
        self.params().await.provision_state
    }

    pub async fn stored(&self, field: ScheduleField) -> i64 {
        self.params().await.timestamp(field)
    }

    pub async fn set_state(&self, state: DeviceState) {
        self.user_params
            .set_provision_state(state)
            .await
            .expect("set provision state");
    }

    pub async fn set_stored(&self, field: ScheduleField, value_ms: i64) {
        self.user_params
            .set_timestamp(field, value_ms)
            .await
            .expect("set schedule intent");
    }

    pub async fn job(&self, name: &str) -> Option<JobInfo> {
        self.job_queue.query(name).await.expect("query job queue")
    }
}
