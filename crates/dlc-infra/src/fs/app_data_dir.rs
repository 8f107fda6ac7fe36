use anyhow::{Context, Result};
use std::path::PathBuf;

const AGENT_DIR_NAME: &str = "dlc-agent";

/// Get the agent data root directory.
///
/// 获取代理数据根目录。
///
/// # Platform-specific Paths / 平台特定路径
/// - macOS: ~/Library/Application Support/dlc-agent
/// - Windows: %APPDATA%\dlc-agent
/// - Linux: $XDG_DATA_HOME/dlc-agent or ~/.local/share/dlc-agent
///
/// The directory is not created here; the stores create it on first write.
pub fn agent_data_dir() -> Result<PathBuf> {
    let base_dir =
        get_platform_data_dir().context("Failed to get platform-specific data directory")?;

    Ok(base_dir.join(AGENT_DIR_NAME))
}

/// 获取日志目录
pub fn agent_log_dir() -> Result<PathBuf> {
    Ok(agent_data_dir()?.join("logs"))
}

fn get_platform_data_dir() -> Result<PathBuf> {
    #[cfg(target_os = "linux")]
    {
        if let Some(xdg_data_home) = std::env::var_os("XDG_DATA_HOME") {
            return Ok(PathBuf::from(xdg_data_home));
        }
    }

    dirs::data_dir().ok_or_else(|| anyhow::anyhow!("Unable to get platform data directory"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_dir_ends_with_agent_name() {
        if let Ok(dir) = agent_data_dir() {
            assert!(dir.ends_with(AGENT_DIR_NAME));
        }
    }

    #[test]
    fn log_dir_is_under_data_dir() {
        if let (Ok(data), Ok(logs)) = (agent_data_dir(), agent_log_dir()) {
            assert_eq!(logs, data.join("logs"));
        }
    }
}
