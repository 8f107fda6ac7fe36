//! # dlc-agent
//!
//! Process-level assembly of the device lock provisioning agent: adapters
//! owned by the binary, configuration, tracing, wiring and the event loop.

pub mod adapters;
pub mod bootstrap;
