//! Provisioning domain module.
//!
//! Defines the device provisioning state, the events that drive it and the
//! pure transition function.

pub mod state;
pub mod state_machine;

pub use state::DeviceState;
pub use state_machine::{ProvisionAction, ProvisionEvent, ProvisionStateMachine};
