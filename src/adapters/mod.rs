//! Adapters owned by the agent binary.
//!
//! 代理二进制自带的适配器。

pub mod check_in_service;
pub mod provisioning;

pub use check_in_service::{HttpCheckInService, UnlinkedCheckInService};
pub use provisioning::{LoggingFinalization, LoggingProvisionSignals};
