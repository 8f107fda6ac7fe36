//! Persisted parameter models.
//!
//! Global parameters are device-wide; user parameters are per user and carry
//! the provisioning state plus every absolute schedule intent.

mod global;
mod setup;
mod user;

pub use global::GlobalParameters;
pub use setup::{ProvisioningConfiguration, ProvisioningType, SetupParameters};
pub use user::{ScheduleField, UserParameters};
