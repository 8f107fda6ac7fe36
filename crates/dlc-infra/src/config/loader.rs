//! # Configuration Loader / 配置加载器
//!
//! Layers the TOML file under `DLC_*` environment overrides and maps the
//! result onto [`AgentConfig`]. No validation happens here; missing keys take
//! the DTO defaults.
//!
//! 仅负责加载与合并，不做校验。

use anyhow::Context;
use config::{Config, Environment, File, FileFormat};
use dlc_core::config::AgentConfig;
use std::path::Path;

/// Environment variables named `DLC_<SECTION>__<KEY>` override file values,
/// e.g. `DLC_SCHEDULE__PROVISION_PAUSE_MINUTES=5`.
pub const ENV_PREFIX: &str = "DLC";

/// Load configuration from an optional TOML file plus the environment.
///
/// # Errors / 错误
///
/// Fails if the file is given but cannot be read or is not valid TOML.
pub fn load_agent_config(config_path: Option<&Path>) -> anyhow::Result<AgentConfig> {
    let mut builder = Config::builder();
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
    }
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let layered = builder.build().with_context(|| match config_path {
        Some(path) => format!("Failed to load config file: {}", path.display()),
        None => "Failed to load config from environment".to_string(),
    })?;

    let toml_value: toml::Value = layered
        .try_deserialize()
        .context("Failed to map config onto TOML structure")?;

    AgentConfig::from_toml(&toml_value)
}
