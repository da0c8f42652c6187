use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::command::{CommandId, Scope};

pub type Result<T, E = NagiosError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum NagiosError {
    #[error("Failed to write to command file {}: {source}", .path.display())]
    WriteError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{failed} of {total} commands could not be submitted")]
    PartialFailure { failed: usize, total: usize },

    #[error("{0} needs at least one service")]
    MissingService(CommandId),

    #[error("{0} does not take a service")]
    UnexpectedService(CommandId),

    #[error("Invalid {field} {value:?}: line breaks are not allowed, nor `;` outside the comment")]
    InvalidField { field: &'static str, value: String },

    #[error("Downtime of {minutes} minutes is out of range")]
    DurationOutOfRange { minutes: i64 },

    #[error("There is no {action} command for scope {scope}")]
    UnsupportedScope { action: &'static str, scope: Scope },

    #[error("Unknown external command: {0}")]
    UnknownCommand(String),
}
