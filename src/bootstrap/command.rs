//! Operator commands read from stdin while the agent runs.
//!
//! They stand in for the provisioning UI: each maps onto one provisioning
//! event or an immediate check-in.

use std::str::FromStr;

use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentCommand {
    Start,
    Pause,
    Resume,
    KioskReady,
    Fail { mandatory: bool },
    Finalize,
    /// Run a check-in attempt now, outside the job queue.
    CheckIn,
    /// Print both parameter sets.
    Status,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseCommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command: {0}")]
    Unknown(String),
    #[error("unexpected argument for {command}: {argument}")]
    UnexpectedArgument { command: String, argument: String },
}

impl FromStr for AgentCommand {
    type Err = ParseCommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Err(ParseCommandError::Empty);
        };
        let argument = words.next();

        let command = match (head.to_ascii_lowercase().as_str(), argument) {
            ("start", None) => AgentCommand::Start,
            ("pause", None) => AgentCommand::Pause,
            ("resume", None) => AgentCommand::Resume,
            ("kiosk-ready", None) => AgentCommand::KioskReady,
            ("fail", None) => AgentCommand::Fail { mandatory: false },
            ("fail", Some("--mandatory")) => AgentCommand::Fail { mandatory: true },
            ("finalize", None) => AgentCommand::Finalize,
            ("check-in", None) => AgentCommand::CheckIn,
            ("status", None) => AgentCommand::Status,
            ("quit" | "exit", None) => AgentCommand::Quit,
            (
                "start" | "pause" | "resume" | "kiosk-ready" | "fail" | "finalize" | "check-in"
                | "status" | "quit" | "exit",
                Some(argument),
            ) => {
                return Err(ParseCommandError::UnexpectedArgument {
                    command: head.to_string(),
                    argument: argument.to_string(),
                })
            }
            _ => return Err(ParseCommandError::Unknown(head.to_string())),
        };
        Ok(command)
    }
}

/// Forward parsed lines from `reader` until EOF, a `quit` command or the
/// receiver going away. Unparseable lines are reported and skipped.
pub async fn forward_commands<R>(reader: R, commands: mpsc::Sender<AgentCommand>) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        match line.parse::<AgentCommand>() {
            Ok(command) => {
                if commands.send(command).await.is_err() || command == AgentCommand::Quit {
                    break;
                }
            }
            Err(err) => {
                warn!(error = %err, "ignoring operator input");
                eprintln!("{err}");
            }
        }
    }
    Ok(())
}
