//! Chat Commands
//!
//! `egghunt <subcommand>` parsing.

use std::str::FromStr;

use thiserror::Error;

/// Hunt subcommands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HuntCommand {
    /// Start a round.
    Start,
    /// Force-stop the round and cancel any auto-restart.
    Stop,
    /// Rescan the world for template objects.
    Load,
    /// Re-place template objects at every candidate.
    Insert,
    /// Clear every candidate region and force-stop.
    Delete,
    /// Report round progress to the speaker.
    Status,
}

/// Subcommand parse failures. Displayed to the speaker as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// No subcommand given.
    #[error("Specify a subcommand!")]
    Missing,
    /// Unrecognized subcommand.
    #[error("Unknown egg hunt command {0}.")]
    Unknown(String),
}

impl FromStr for HuntCommand {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" => Err(CommandError::Missing),
            "start" => Ok(HuntCommand::Start),
            "stop" => Ok(HuntCommand::Stop),
            "load" => Ok(HuntCommand::Load),
            "insert" => Ok(HuntCommand::Insert),
            "delete" => Ok(HuntCommand::Delete),
            "status" => Ok(HuntCommand::Status),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}
