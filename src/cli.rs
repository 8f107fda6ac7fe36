use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "dlc-agent", version, about = "Device lock provisioning agent")]
pub struct Args {
    /// TOML configuration file. `DLC_*` environment variables override it.
    #[arg(short, long, global = true, env = "DLC_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Run the agent: check in, schedule and react to operator commands on stdin
    Run,
    /// Print the stored parameters as JSON
    Dump,
    /// Clear stored parameters (requires `debug.allow_reset`)
    Reset,
}
