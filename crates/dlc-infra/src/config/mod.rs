mod loader;

pub use loader::{load_agent_config, ENV_PREFIX};
