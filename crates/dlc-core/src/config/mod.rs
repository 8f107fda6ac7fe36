//! # Agent configuration DTO / 代理配置 DTO
//!
//! Maps the TOML configuration file onto plain data. Keys that are absent fall
//! back to the schedule constants in [`crate::schedule`]; an empty `data_dir`
//! is a valid fact and is resolved by the caller.
//!
//! 只负责 TOML → DTO 的映射；`data_dir` 为空时由调用方决定默认目录。

use std::path::PathBuf;
use std::time::Duration;

use crate::schedule::{
    RetryPolicy, MANDATORY_RESET_MINUTES_DEFAULT, PROVISION_PAUSED_MINUTES_DEFAULT,
    PUSH_TOKEN_RETRIEVAL_DELAY_MINUTES_DEFAULT, RETRY_ON_FAILURE_DELAY_HOURS,
};

/// Agent configuration DTO
/// 代理配置 DTO
#[derive(Debug, Clone, PartialEq)]
pub struct AgentConfig {
    /// Directory holding the parameter files and the job queue.
    pub data_dir: PathBuf,
    /// Directory for rolling log files. `None` logs to stdout only.
    pub log_dir: Option<PathBuf>,
    pub schedule: ScheduleConfig,
    /// Backoff for non-mandatory provisioning step failures.
    pub failed_step: RetryPolicy,
    pub job_queue: JobQueueConfig,
    pub device: DeviceConfig,
    pub check_in: CheckInConfig,
    pub clock: ClockConfig,
    /// Allows the parameter reset command. Off in production builds.
    pub allow_debug_reset: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleConfig {
    pub provision_pause_minutes: u64,
    pub check_in_failure_retry_hours: u64,
    pub mandatory_reset_minutes: u64,
    pub push_token_retrieval_delay_minutes: u64,
}

impl ScheduleConfig {
    pub fn provision_pause(&self) -> Duration {
        Duration::from_secs(self.provision_pause_minutes * 60)
    }

    pub fn check_in_failure_retry(&self) -> Duration {
        Duration::from_secs(self.check_in_failure_retry_hours * 60 * 60)
    }

    pub fn mandatory_reset(&self) -> Duration {
        Duration::from_secs(self.mandatory_reset_minutes * 60)
    }

    pub fn push_token_retrieval_delay(&self) -> Duration {
        Duration::from_secs(self.push_token_retrieval_delay_minutes * 60)
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            provision_pause_minutes: PROVISION_PAUSED_MINUTES_DEFAULT,
            check_in_failure_retry_hours: RETRY_ON_FAILURE_DELAY_HOURS,
            mandatory_reset_minutes: MANDATORY_RESET_MINUTES_DEFAULT,
            push_token_retrieval_delay_minutes: PUSH_TOKEN_RETRIEVAL_DELAY_MINUTES_DEFAULT,
        }
    }
}

/// Backoff the durable job queue applies when a job asks to be retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobQueueConfig {
    pub backoff_initial_ms: u64,
    pub backoff_max_ms: u64,
}

impl Default for JobQueueConfig {
    fn default() -> Self {
        Self {
            backoff_initial_ms: 30_000,
            backoff_max_ms: 5 * 60 * 60 * 1000,
        }
    }
}

/// Identity facts reported to the check-in service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceConfig {
    pub imei: Vec<String>,
    pub meid: Vec<String>,
    pub carrier: Option<String>,
    /// Which identifier kinds to report, see `DeviceIdType::bit`.
    pub id_type_bitmap: i32,
    pub push_token: Option<String>,
}

/// Remote check-in service endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckInConfig {
    /// Base URL of the check-in service. `None` leaves the agent unlinked and
    /// every attempt fails as a remote failure.
    pub endpoint: Option<String>,
    pub timeout_secs: u64,
}

impl Default for CheckInConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: 30,
        }
    }
}

/// Wall-clock jump detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockConfig {
    pub check_interval_secs: u64,
    /// Drift between wall clock and elapsed time tolerated before it counts
    /// as a time change.
    pub jump_threshold_ms: i64,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: 30,
            jump_threshold_ms: 2_000,
        }
    }
}

fn lookup<'a>(value: &'a toml::Value, section: &str, key: &str) -> Option<&'a toml::Value> {
    value.get(section).and_then(|s| s.get(key))
}

fn lookup_u64(value: &toml::Value, section: &str, key: &str, default: u64) -> u64 {
    lookup(value, section, key)
        .and_then(|v| v.as_integer())
        .and_then(|v| u64::try_from(v).ok())
        .unwrap_or(default)
}

fn lookup_str(value: &toml::Value, section: &str, key: &str) -> Option<String> {
    lookup(value, section, key)
        .and_then(|v| v.as_str())
        .map(str::to_string)
}

fn lookup_str_list(value: &toml::Value, section: &str, key: &str) -> Vec<String> {
    match lookup(value, section, key) {
        Some(toml::Value::String(single)) => vec![single.clone()],
        Some(toml::Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

impl AgentConfig {
    /// Create AgentConfig from TOML value
    /// 从 TOML 值创建 AgentConfig
    pub fn from_toml(toml_value: &toml::Value) -> anyhow::Result<Self> {
        let schedule_defaults = ScheduleConfig::default();
        let failed_step_defaults = RetryPolicy::default();
        let job_queue_defaults = JobQueueConfig::default();
        let clock_defaults = ClockConfig::default();
        let check_in_defaults = CheckInConfig::default();

        Ok(Self {
            data_dir: PathBuf::from(
                lookup_str(toml_value, "storage", "data_dir").unwrap_or_default(),
            ),
            log_dir: lookup_str(toml_value, "log", "dir").map(PathBuf::from),
            schedule: ScheduleConfig {
                provision_pause_minutes: lookup_u64(
                    toml_value,
                    "schedule",
                    "provision_pause_minutes",
                    schedule_defaults.provision_pause_minutes,
                ),
                check_in_failure_retry_hours: lookup_u64(
                    toml_value,
                    "schedule",
                    "check_in_failure_retry_hours",
                    schedule_defaults.check_in_failure_retry_hours,
                ),
                mandatory_reset_minutes: lookup_u64(
                    toml_value,
                    "schedule",
                    "mandatory_reset_minutes",
                    schedule_defaults.mandatory_reset_minutes,
                ),
                push_token_retrieval_delay_minutes: lookup_u64(
                    toml_value,
                    "schedule",
                    "push_token_retrieval_delay_minutes",
                    schedule_defaults.push_token_retrieval_delay_minutes,
                ),
            },
            failed_step: RetryPolicy {
                max_retries: lookup_u64(
                    toml_value,
                    "failed_step",
                    "max_retries",
                    u64::from(failed_step_defaults.max_retries),
                ) as u32,
                initial_delay_ms: lookup_u64(
                    toml_value,
                    "failed_step",
                    "initial_delay_ms",
                    failed_step_defaults.initial_delay_ms,
                ),
                max_delay_ms: lookup_u64(
                    toml_value,
                    "failed_step",
                    "max_delay_ms",
                    failed_step_defaults.max_delay_ms,
                ),
                backoff_multiplier: lookup(toml_value, "failed_step", "backoff_multiplier")
                    .and_then(|v| v.as_float().or_else(|| v.as_integer().map(|i| i as f64)))
                    .unwrap_or(failed_step_defaults.backoff_multiplier),
            },
            job_queue: JobQueueConfig {
                backoff_initial_ms: lookup_u64(
                    toml_value,
                    "job_queue",
                    "backoff_initial_ms",
                    job_queue_defaults.backoff_initial_ms,
                ),
                backoff_max_ms: lookup_u64(
                    toml_value,
                    "job_queue",
                    "backoff_max_ms",
                    job_queue_defaults.backoff_max_ms,
                ),
            },
            device: DeviceConfig {
                imei: lookup_str_list(toml_value, "device", "imei"),
                meid: lookup_str_list(toml_value, "device", "meid"),
                carrier: lookup_str(toml_value, "device", "carrier"),
                id_type_bitmap: lookup(toml_value, "device", "id_type_bitmap")
                    .and_then(|v| v.as_integer())
                    .map(|v| v as i32)
                    .unwrap_or(0),
                push_token: lookup_str(toml_value, "device", "push_token"),
            },
            check_in: CheckInConfig {
                endpoint: lookup_str(toml_value, "check_in", "endpoint")
                    .filter(|e| !e.trim().is_empty()),
                timeout_secs: lookup_u64(
                    toml_value,
                    "check_in",
                    "timeout_secs",
                    check_in_defaults.timeout_secs,
                ),
            },
            clock: ClockConfig {
                check_interval_secs: lookup_u64(
                    toml_value,
                    "clock",
                    "check_interval_secs",
                    clock_defaults.check_interval_secs,
                ),
                jump_threshold_ms: lookup(toml_value, "clock", "jump_threshold_ms")
                    .and_then(|v| v.as_integer())
                    .unwrap_or(clock_defaults.jump_threshold_ms),
            },
            allow_debug_reset: lookup(toml_value, "debug", "allow_reset")
                .and_then(|v| v.as_bool())
                .unwrap_or(false),
        })
    }

    /// Create empty AgentConfig (empty paths, default schedule)
    /// 创建空的 AgentConfig
    pub fn empty() -> Self {
        Self::with_system_defaults(PathBuf::new())
    }

    /// Create AgentConfig rooted at `data_dir` for production use.
    /// The caller computes `data_dir` with platform logic (e.g. the `dirs` crate).
    ///
    /// 生产环境使用：基础目录由调用方计算。
    pub fn with_system_defaults(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            log_dir: None,
            schedule: ScheduleConfig::default(),
            failed_step: RetryPolicy::default(),
            job_queue: JobQueueConfig::default(),
            device: DeviceConfig::default(),
            check_in: CheckInConfig::default(),
            clock: ClockConfig::default(),
            allow_debug_reset: false,
        }
    }
}
