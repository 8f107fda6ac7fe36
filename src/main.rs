mod cli;

use std::process;

use clap::Parser;
use dlc_agent::bootstrap::tracing::init_tracing_subscriber;
use dlc_agent::bootstrap::{forward_commands, resolve_config, wire_dependencies, AgentRuntime};
use tokio::io::BufReader;
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::cli::{Args, Commands};

const COMMAND_CHANNEL_CAPACITY: usize = 16;

#[tokio::main]
async fn main() {
    let args = Args::parse();
    if let Err(e) = run(args).await {
        error!("Agent error: {e:#}");
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = resolve_config(args.config.as_deref())?;
    init_tracing_subscriber(config.log_dir.as_deref())?;
    info!(data_dir = %config.data_dir.display(), "configuration loaded");

    let wired = wire_dependencies(&config)?;
    let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
    let (runtime, channels) = AgentRuntime::from_wired(wired, config, command_rx);

    match args.command.unwrap_or(Commands::Run) {
        Commands::Dump => {
            let snapshot = runtime.usecases().dump_parameters().execute().await?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        Commands::Reset => {
            runtime.usecases().reset_parameters().execute().await?;
            println!("Parameters cleared");
        }
        Commands::Run => {
            runtime.start().await?;
            tokio::spawn(async move {
                let stdin = BufReader::new(tokio::io::stdin());
                if let Err(err) = forward_commands(stdin, command_tx).await {
                    error!(error = %err, "stdin command reader stopped");
                }
            });
            runtime.run(channels, shutdown_signal()).await?;
        }
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
