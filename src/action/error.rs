use thiserror::Error;

use crate::version::error::InstallError;

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("Input required and not supplied: {0}")]
    MissingInput(&'static str),

    #[error(transparent)]
    Install(#[from] InstallError),

    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("{command} failed with {status}")]
    CommandFailed { command: String, status: String },

    #[error("Failed to write workflow command: {0}")]
    Io(#[from] std::io::Error),
}
