//! In-memory doubles for the ports, shared by the unit tests of this crate.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use dlc_core::config::ScheduleConfig;
use dlc_core::ports::*;
use dlc_core::schedule::{AlarmId, JobInfo, JobRequest};
use dlc_core::{
    DeviceState, GlobalParameters, RetryPolicy, ScheduleField, SetupParameters, UserParameters,
};

use crate::usecases::provision::ProvisionOrchestrator;
use crate::usecases::scheduling::DeviceLockScheduler;

pub struct FakeClock {
    now_ms: AtomicI64,
    elapsed_ms: AtomicI64,
    network_available: AtomicBool,
}

impl FakeClock {
    pub fn new(now_ms: i64, elapsed_ms: i64) -> Self {
        Self {
            now_ms: AtomicI64::new(now_ms),
            elapsed_ms: AtomicI64::new(elapsed_ms),
            network_available: AtomicBool::new(true),
        }
    }

    /// Both clocks move forward together.
    pub fn advance(&self, ms: i64) {
        self.now_ms.fetch_add(ms, Ordering::SeqCst);
        self.elapsed_ms.fetch_add(ms, Ordering::SeqCst);
    }

    /// Wall clock jumps; elapsed time does not.
    pub fn jump_wall_clock(&self, delta_ms: i64) {
        self.now_ms.fetch_add(delta_ms, Ordering::SeqCst);
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

#[derive(Default)]
pub struct InMemoryUserParameters {
    params: Mutex<UserParameters>,
    fail_writes: AtomicBool,
}

impl InMemoryUserParameters {
    pub fn snapshot(&self) -> UserParameters {
        self.params.lock().unwrap().clone()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn update(&self, f: impl FnOnce(&mut UserParameters)) -> anyhow::Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            anyhow::bail!("disk full");
        }
        f(&mut self.params.lock().unwrap());
        Ok(())
    }
}

#[async_trait]
impl UserParametersPort for InMemoryUserParameters {
    async fn load(&self) -> anyhow::Result<UserParameters> {
        Ok(self.snapshot())
    }

    async fn set_provision_state(&self, state: DeviceState) -> anyhow::Result<()> {
        self.update(|p| p.provision_state = state)
    }

    async fn set_timestamp(&self, field: ScheduleField, value_ms: i64) -> anyhow::Result<()> {
        self.update(|p| p.set_timestamp(field, value_ms))
    }

    async fn set_days_left_until_reset(&self, days: i32) -> anyhow::Result<()> {
        self.update(|p| p.days_left_until_reset = days)
    }

    async fn set_need_initial_check_in(&self, need: bool) -> anyhow::Result<()> {
        self.update(|p| p.need_initial_check_in = need)
    }

    async fn clear(&self) -> anyhow::Result<()> {
        self.update(|p| *p = p.cleared())
    }
}

#[derive(Default)]
pub struct InMemoryGlobalParameters {
    params: Mutex<GlobalParameters>,
}

impl InMemoryGlobalParameters {
    pub fn snapshot(&self) -> GlobalParameters {
        self.params.lock().unwrap().clone()
    }
}

#[async_trait]
impl GlobalParametersPort for InMemoryGlobalParameters {
    async fn load(&self) -> anyhow::Result<GlobalParameters> {
        Ok(self.snapshot())
    }

    async fn set_registered_device_id(&self, id: Option<String>) -> anyhow::Result<()> {
        self.params.lock().unwrap().registered_device_id = id;
        Ok(())
    }

    async fn set_provision_forced(&self, forced: bool) -> anyhow::Result<()> {
        self.params.lock().unwrap().provision_forced = forced;
        Ok(())
    }

    async fn set_provision_ready(&self, ready: bool) -> anyhow::Result<()> {
        self.params.lock().unwrap().provision_ready = ready;
        Ok(())
    }

    async fn set_need_check_in(&self, need: bool) -> anyhow::Result<()> {
        self.params.lock().unwrap().need_check_in = need;
        Ok(())
    }

    async fn set_enrollment_token(&self, token: Option<String>) -> anyhow::Result<()> {
        self.params.lock().unwrap().enrollment_token = token;
        Ok(())
    }

    async fn clear(&self) -> anyhow::Result<()> {
        *self.params.lock().unwrap() = GlobalParameters::default();
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemorySetupParameters {
    params: Mutex<Option<SetupParameters>>,
}

impl InMemorySetupParameters {
    pub fn snapshot(&self) -> Option<SetupParameters> {
        self.params.lock().unwrap().clone()
    }
}

#[async_trait]
impl SetupParametersPort for InMemorySetupParameters {
    async fn load(&self) -> anyhow::Result<Option<SetupParameters>> {
        Ok(self.snapshot())
    }

    async fn store(&self, params: &SetupParameters) -> anyhow::Result<()> {
        *self.params.lock().unwrap() = Some(params.clone());
        Ok(())
    }

    async fn clear(&self) -> anyhow::Result<()> {
        *self.params.lock().unwrap() = None;
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingAlarm {
    armed: Mutex<HashMap<AlarmId, i64>>,
}

impl RecordingAlarm {
    pub fn armed(&self, id: AlarmId) -> Option<i64> {
        self.armed.lock().unwrap().get(&id).copied()
    }
}

#[async_trait]
impl WallClockAlarmPort for RecordingAlarm {
    async fn arm_at(&self, trigger_elapsed_ms: i64, id: AlarmId) -> anyhow::Result<()> {
        self.armed.lock().unwrap().insert(id, trigger_elapsed_ms);
        Ok(())
    }

    async fn cancel(&self, id: AlarmId) -> anyhow::Result<()> {
        self.armed.lock().unwrap().remove(&id);
        Ok(())
    }

    async fn peek(&self) -> anyhow::Result<Option<(i64, AlarmId)>> {
        Ok(self
            .armed
            .lock()
            .unwrap()
            .iter()
            .map(|(id, at)| (*at, *id))
            .min_by_key(|(at, _)| *at))
    }
}

#[derive(Default)]
pub struct RecordingJobQueue {
    pending: Mutex<HashMap<String, JobRequest>>,
    enqueued: AtomicUsize,
}

impl RecordingJobQueue {
    pub fn pending(&self, name: &str) -> Option<JobRequest> {
        self.pending.lock().unwrap().get(name).cloned()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.lock().unwrap().len()
    }

    pub fn enqueue_count(&self) -> usize {
        self.enqueued.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DurableJobQueuePort for RecordingJobQueue {
    async fn enqueue_unique(&self, request: JobRequest) -> anyhow::Result<()> {
        self.enqueued.fetch_add(1, Ordering::SeqCst);
        self.pending
            .lock()
            .unwrap()
            .insert(request.name.clone(), request);
        Ok(())
    }

    async fn query(&self, name: &str) -> anyhow::Result<Option<JobInfo>> {
        Ok(self.pending(name).map(|request| JobInfo {
            id: uuid::Uuid::nil(),
            name: request.name,
            initial_delay_ms: request.initial_delay.as_millis() as u64,
            network_required: request.network_required,
            enqueued_at_ms: 0,
            run_at_ms: request.initial_delay.as_millis() as i64,
            attempt: 0,
        }))
    }

    async fn cancel(&self, name: &str) -> anyhow::Result<()> {
        self.pending.lock().unwrap().remove(name);
        Ok(())
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

/// Everything a provisioning test needs, wired with in-memory doubles.
pub struct Harness {
    pub clock: Arc<FakeClock>,
    pub user_params: Arc<InMemoryUserParameters>,
    pub global_params: Arc<InMemoryGlobalParameters>,
    pub setup_params: Arc<InMemorySetupParameters>,
    pub alarm: Arc<RecordingAlarm>,
    pub job_queue: Arc<RecordingJobQueue>,
    pub signals: Arc<RecordingSignals>,
    pub finalization: Arc<RecordingFinalization>,
    pub scheduler: Arc<DeviceLockScheduler>,
    pub orchestrator: Arc<ProvisionOrchestrator>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_policy(RetryPolicy::default())
    }

    pub fn with_policy(policy: RetryPolicy) -> Self {
        let clock = Arc::new(FakeClock::new(5 * 60 * 60 * 1000, 1_000));
        let user_params = Arc::new(InMemoryUserParameters::default());
        let global_params = Arc::new(InMemoryGlobalParameters::default());
        let setup_params = Arc::new(InMemorySetupParameters::default());
        let alarm = Arc::new(RecordingAlarm::default());
        let job_queue = Arc::new(RecordingJobQueue::default());
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
            policy,
        ));
        Self {
            clock,
            user_params,
            global_params,
            setup_params,
            alarm,
            job_queue,
            signals,
            finalization,
            scheduler,
            orchestrator,
        }
    }

    pub fn clock_now(&self) -> i64 {
        self.clock.now_ms()
    }

    pub fn state(&self) -> DeviceState {
        self.user_params.snapshot().provision_state
    }
}
