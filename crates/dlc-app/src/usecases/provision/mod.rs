mod orchestrator;

pub use orchestrator::{ProvisionError, ProvisionOrchestrator};
