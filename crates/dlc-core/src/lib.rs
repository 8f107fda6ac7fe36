//! # dlc-core
//!
//! Core domain models and ports for the device lock provisioning agent.
//!
//! This crate contains pure business logic without any infrastructure
//! dependencies: the provisioning state machine, the persisted parameter
//! models, check-in outcomes and the port traits adapters implement.

pub mod check_in;
pub mod config;
pub mod parameters;
pub mod ports;
pub mod provision;
pub mod schedule;

// Re-export commonly used types at the crate root
pub use check_in::{
    CheckInFailureCause, CheckInOutcome, CheckInReport, CheckInResponse, DeviceId, DeviceIdType,
    DeviceIdentity,
};
pub use config::AgentConfig;
pub use parameters::{
    GlobalParameters, ProvisioningConfiguration, ProvisioningType, ScheduleField, SetupParameters,
    UserParameters,
};
pub use provision::{DeviceState, ProvisionAction, ProvisionEvent, ProvisionStateMachine};
pub use schedule::{AlarmId, JobInfo, JobOutcome, JobRequest, RetryPolicy};
