//! # Agent Runtime / 代理运行时
//!
//! Owns the long-lived use cases and runs the single event loop. Alarm
//! firings, due jobs, clock jumps and operator commands are all handled one
//! at a time on this loop, so provisioning state has exactly one writer.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use dlc_app::usecases::{
    BootCompletedHandler, CheckInProtocolHandler, DeviceCheckInWorker, DeviceLockScheduler,
    DumpParameters, ProvisionOrchestrator, ResetParameters, RetrievePushToken, TimeChangeObserver,
};
use dlc_app::AgentDeps;
use dlc_core::config::AgentConfig;
use dlc_core::ports::SchedulerPort;
use dlc_core::schedule::{
    AlarmId, JobInfo, JobOutcome, DEVICE_CHECK_IN_WORK_NAME, PUSH_TOKEN_WORK_NAME,
};
use dlc_infra::FileJobQueue;
use tokio::sync::mpsc;
use tracing::{debug, error, info, info_span, warn, Instrument};

use super::command::AgentCommand;
use super::wiring::WiredAgent;

/// Receiving ends of every event source the loop listens to.
pub struct AgentChannels {
    pub alarms: mpsc::Receiver<AlarmId>,
    pub jobs: mpsc::Receiver<JobInfo>,
    pub commands: mpsc::Receiver<AgentCommand>,
}

/// Detects wall-clock jumps by watching `now - elapsed`, which is constant
/// while the wall clock runs in step with the monotonic clock.
#[derive(Debug, Clone)]
pub struct ClockJumpDetector {
    last_boot_ms: i64,
    threshold_ms: i64,
}

impl ClockJumpDetector {
    pub fn new(now_ms: i64, elapsed_ms: i64, threshold_ms: i64) -> Self {
        Self {
            last_boot_ms: now_ms - elapsed_ms,
            threshold_ms,
        }
    }

    /// Returns `true` once per jump larger than the threshold.
    pub fn observe(&mut self, now_ms: i64, elapsed_ms: i64) -> bool {
        let boot_ms = now_ms - elapsed_ms;
        if (boot_ms - self.last_boot_ms).abs() > self.threshold_ms {
            self.last_boot_ms = boot_ms;
            return true;
        }
        false
    }
}

pub struct AgentRuntime {
    deps: AgentDeps,
    config: AgentConfig,
    job_queue: Arc<FileJobQueue>,
    scheduler: Arc<DeviceLockScheduler>,
    orchestrator: Arc<ProvisionOrchestrator>,
    check_in: Arc<CheckInProtocolHandler>,
}

impl AgentRuntime {
    pub fn new(deps: AgentDeps, job_queue: Arc<FileJobQueue>, config: AgentConfig) -> Self {
        let scheduler = Arc::new(DeviceLockScheduler::new(
            deps.clock.clone(),
            deps.user_params.clone(),
            deps.alarm.clone(),
            deps.job_queue.clone(),
            config.schedule.clone(),
        ));
        let orchestrator = Arc::new(ProvisionOrchestrator::new(
            deps.user_params.clone(),
            deps.global_params.clone(),
            scheduler.clone(),
            deps.provision_signals.clone(),
            deps.finalization.clone(),
            config.failed_step.clone(),
        ));
        let check_in = Arc::new(CheckInProtocolHandler::new(
            deps.device_identity.clone(),
            deps.check_in_service.clone(),
            deps.push_token.clone(),
            deps.global_params.clone(),
            deps.user_params.clone(),
            deps.setup_params.clone(),
            deps.clock.clone(),
            scheduler.clone(),
            orchestrator.clone(),
            config.schedule.check_in_failure_retry(),
        ));

        Self {
            deps,
            config,
            job_queue,
            scheduler,
            orchestrator,
            check_in,
        }
    }

    /// Build a runtime from freshly wired dependencies, handing back the
    /// alarm and job receivers for [`AgentRuntime::run`].
    pub fn from_wired(
        wired: WiredAgent,
        config: AgentConfig,
        commands: mpsc::Receiver<AgentCommand>,
    ) -> (Self, AgentChannels) {
        let runtime = Self::new(wired.deps, wired.job_queue, config);
        let channels = AgentChannels {
            alarms: wired.alarms,
            jobs: wired.jobs,
            commands,
        };
        (runtime, channels)
    }

    pub fn deps(&self) -> &AgentDeps {
        &self.deps
    }

    pub fn scheduler(&self) -> Arc<dyn SchedulerPort> {
        self.scheduler.clone()
    }

    pub fn orchestrator(&self) -> Arc<ProvisionOrchestrator> {
        self.orchestrator.clone()
    }

    pub fn usecases(&self) -> UseCases<'_> {
        UseCases::new(self)
    }

    /// Restore durable jobs and run the boot hook. Call once before
    /// [`AgentRuntime::run`].
    pub async fn start(&self) -> anyhow::Result<()> {
        let span = info_span!("runtime.start");
        async {
            let restored = self.job_queue.restore().await?;
            self.usecases().boot_completed().on_boot_completed().await?;
            info!(restored_jobs = restored, "agent started");
            Ok(())
        }
        .instrument(span)
        .await
    }

    /// Run the event loop until `shutdown` resolves or a `quit` command
    /// arrives.
    pub async fn run<F>(&self, mut channels: AgentChannels, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()>,
    {
        let mut clock_check = tokio::time::interval(Duration::from_secs(
            self.config.clock.check_interval_secs.max(1),
        ));
        clock_check.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        let mut detector = ClockJumpDetector::new(
            self.deps.clock.now_ms(),
            self.deps.clock.elapsed_ms(),
            self.config.clock.jump_threshold_ms,
        );
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("shutdown requested");
                    break;
                }
                Some(id) = channels.alarms.recv() => self.on_alarm(id).await,
                Some(job) = channels.jobs.recv() => self.on_job_due(job).await,
                Some(command) = channels.commands.recv() => {
                    if command == AgentCommand::Quit {
                        info!("quit command received");
                        break;
                    }
                    self.on_command(command).await;
                }
                _ = clock_check.tick() => {
                    if detector.observe(self.deps.clock.now_ms(), self.deps.clock.elapsed_ms()) {
                        self.on_time_changed().await;
                    }
                }
            }
        }
        Ok(())
    }

    pub async fn on_alarm(&self, id: AlarmId) {
        match self.orchestrator.on_alarm(id).await {
            Ok(state) => info!(alarm = %id, state = %state, "alarm handled"),
            Err(err) => error!(alarm = %id, error = %err, "alarm handling failed"),
        }
    }

    /// Run a due job and report its outcome to the queue. Jobs replaced
    /// after they were delivered are dropped.
    pub async fn on_job_due(&self, job: JobInfo) {
        match self.job_queue.is_current(&job).await {
            Ok(true) => {}
            Ok(false) => {
                debug!(job = %job.name, "stale job delivery ignored");
                return;
            }
            Err(err) => {
                error!(job = %job.name, error = %err, "failed to read job queue");
                return;
            }
        }

        let outcome = match job.name.as_str() {
            DEVICE_CHECK_IN_WORK_NAME => self.usecases().check_in_worker().run().await,
            PUSH_TOKEN_WORK_NAME => self.usecases().retrieve_push_token().execute().await,
            other => {
                warn!(job = other, "no runner for job");
                JobOutcome::Failure
            }
        };

        if let Err(err) = self.job_queue.complete(&job, outcome).await {
            error!(job = %job.name, error = %err, "failed to record job outcome");
        }
    }

    pub async fn on_time_changed(&self) {
        match self.usecases().time_changed().on_time_changed().await {
            Ok(Some(delta)) => info!(delta_ms = delta.num_milliseconds(), "clock change applied"),
            Ok(None) => debug!("clock change check found no drift"),
            Err(err) => error!(error = %err, "clock change handling failed"),
        }
    }

    pub async fn on_command(&self, command: AgentCommand) {
        let result = match command {
            AgentCommand::Start => self.orchestrator.start().await.map(Some),
            AgentCommand::Pause => self.orchestrator.pause().await.map(Some),
            AgentCommand::Resume => self.orchestrator.resume().await.map(Some),
            AgentCommand::KioskReady => self.orchestrator.kiosk_ready().await.map(Some),
            AgentCommand::Fail { mandatory } => self.orchestrator.fail(mandatory).await.map(Some),
            AgentCommand::Finalize => self.orchestrator.finalize().await.map(Some),
            AgentCommand::CheckIn => {
                let outcome = self.usecases().check_in_worker().run().await;
                info!(?outcome, "manual check-in finished");
                Ok(None)
            }
            AgentCommand::Status => {
                match self.usecases().dump_parameters().execute().await {
                    Ok(snapshot) => match serde_json::to_string_pretty(&snapshot) {
                        Ok(json) => println!("{json}"),
                        Err(err) => error!(error = %err, "failed to render parameters"),
                    },
                    Err(err) => error!(error = %err, "failed to read parameters"),
                }
                Ok(None)
            }
            AgentCommand::Quit => Ok(None),
        };

        match result {
            Ok(Some(state)) => info!(?command, state = %state, "command applied"),
            Ok(None) => {}
            Err(err) => error!(?command, error = %err, "command failed"),
        }
    }
}

/// Use case accessors built from the runtime's dependencies.
pub struct UseCases<'a> {
    runtime: &'a AgentRuntime,
}

impl<'a> UseCases<'a> {
    pub fn new(runtime: &'a AgentRuntime) -> Self {
        Self { runtime }
    }

    pub fn boot_completed(&self) -> BootCompletedHandler {
        let deps = &self.runtime.deps;
        BootCompletedHandler::new(
            deps.clock.clone(),
            deps.user_params.clone(),
            self.runtime.scheduler.clone(),
        )
    }

    pub fn time_changed(&self) -> TimeChangeObserver {
        let deps = &self.runtime.deps;
        TimeChangeObserver::new(
            deps.clock.clone(),
            deps.user_params.clone(),
            self.runtime.scheduler.clone(),
        )
    }

    pub fn check_in_worker(&self) -> DeviceCheckInWorker {
        DeviceCheckInWorker::new(self.runtime.check_in.clone())
    }

    pub fn retrieve_push_token(&self) -> RetrievePushToken {
        RetrievePushToken::new(self.runtime.deps.push_token.clone())
    }

    pub fn dump_parameters(&self) -> DumpParameters {
        let deps = &self.runtime.deps;
        DumpParameters::new(
            deps.global_params.clone(),
            deps.user_params.clone(),
            deps.setup_params.clone(),
        )
    }

    pub fn reset_parameters(&self) -> ResetParameters {
        let deps = &self.runtime.deps;
        ResetParameters::new(
            deps.global_params.clone(),
            deps.user_params.clone(),
            deps.setup_params.clone(),
            self.runtime.config.allow_debug_reset,
        )
    }
}
