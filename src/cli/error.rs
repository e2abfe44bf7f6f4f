//! Error types for CLI operations

use crate::checkpoint::CheckpointError;
use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur during CLI command execution
#[derive(Error, Debug)]
pub enum CliError {
    /// Checkpoint engine error
    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerdeError(String),

    /// Invalid argument or input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl CliError {
    /// Message shown to the user
    pub fn user_message(&self) -> String {
        match self {
            CliError::Checkpoint(e) => e.user_friendly_message(),
            other => other.to_string(),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::SerdeError(err.to_string())
    }
}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::ConfigError(format!("{:#}", err))
    }
}
