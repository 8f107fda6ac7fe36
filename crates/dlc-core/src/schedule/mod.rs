//! Schedule value objects.
//!
//! Named durable jobs, wall-clock alarm identities and the backoff policy used
//! for failed provisioning steps.

mod alarm;
mod job;
mod retry_policy;

pub use alarm::AlarmId;
pub use job::{JobInfo, JobOutcome, JobRequest, DEVICE_CHECK_IN_WORK_NAME, PUSH_TOKEN_WORK_NAME};
pub use retry_policy::RetryPolicy;

/// Delay before a check-in is retried after a remote call failure.
pub const RETRY_ON_FAILURE_DELAY_HOURS: u64 = 24;

/// Default length of a user-requested provisioning pause.
pub const PROVISION_PAUSED_MINUTES_DEFAULT: u64 = 60;

/// Default delay before a mandatory provisioning failure resets the device.
pub const MANDATORY_RESET_MINUTES_DEFAULT: u64 = 60;

pub const PUSH_TOKEN_RETRIEVAL_DELAY_MINUTES_DEFAULT: u64 = 5;
