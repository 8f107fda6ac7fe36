pub mod command;
pub mod config;
pub mod runtime;
pub mod tracing;
pub mod wiring;

pub use command::{forward_commands, AgentCommand};
pub use config::resolve_config;
pub use runtime::{AgentChannels, AgentRuntime};
pub use wiring::{wire_dependencies, WiredAgent, WiringError};
