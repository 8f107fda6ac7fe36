//! Device lock agent application layer
//!
//! This crate contains the use cases that drive provisioning: scheduling,
//! check-in interpretation and the provision orchestrator.

pub mod deps;
pub mod usecases;

#[cfg(test)]
mod test_support;

pub use deps::AgentDeps;
