//! # Configuration Resolution / 配置解析
//!
//! Loads [`AgentConfig`] and fills in the platform data directory when the
//! file leaves `storage.data_dir` empty. Everything else is taken as loaded.

use std::path::Path;

use dlc_core::config::AgentConfig;
use dlc_infra::config::load_agent_config;
use dlc_infra::fs::agent_data_dir;

/// Load the configuration file (if any) plus `DLC_*` overrides.
pub fn resolve_config(config_path: Option<&Path>) -> anyhow::Result<AgentConfig> {
    let mut config = load_agent_config(config_path)?;
    if config.data_dir.as_os_str().is_empty() {
        config.data_dir = agent_data_dir()?;
    }
    Ok(config)
}
