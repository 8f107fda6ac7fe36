//! Port interfaces for the application layer
//!
//! Ports define the contract between the use cases in `dlc-app` and the
//! adapters in `dlc-infra`. Use cases only ever see `Arc<dyn ...Port>`, so a
//! test can swap any collaborator for a recording double.
//!
//! ## Port Placement Guidelines
//!
//! A port lives here when it is a capability the agent depends on (storage,
//! time, alarms, the check-in service) and is implemented outside the domain.
//! Pure rules stay in their domain module.

mod alarm;
mod check_in;
mod clock;
mod device_identity;
mod finalization;
mod job_queue;
mod parameters;
mod provision_signal;
mod push_token;
mod scheduler;

pub use alarm::WallClockAlarmPort;
pub use check_in::{CheckInServiceError, CheckInServicePort};
pub use clock::ClockPort;
pub use device_identity::DeviceIdentityPort;
pub use finalization::FinalizationPort;
pub use job_queue::DurableJobQueuePort;
pub use parameters::{GlobalParametersPort, SetupParametersPort, UserParametersPort};
pub use provision_signal::ProvisionSignalPort;
pub use push_token::PushTokenPort;
pub use scheduler::{SchedulerError, SchedulerPort};
