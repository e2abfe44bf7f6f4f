//! Error types for the checkpoint engine

use thiserror::Error;

/// Result type for checkpoint operations
pub type CheckpointResult<T> = Result<T, CheckpointError>;

/// Error types for checkpoint operations
#[derive(Error, Debug)]
pub enum CheckpointError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("session {session:?} does not exist")]
    SessionNotFound { session: String },

    #[error("no checkpoints found for session: {session}")]
    NoCheckpoints { session: String },

    #[error("Checkpoint not found: {checkpoint_id} in session {session}")]
    CheckpointNotFound {
        checkpoint_id: String,
        session: String,
    },

    #[error("Invalid session name: {session:?}")]
    InvalidSessionName { session: String },

    #[error("Invalid checkpoint ID format: {checkpoint_id:?}")]
    InvalidCheckpointId { checkpoint_id: String },

    #[error("invalid checkpoint reference: {reference}")]
    InvalidReference { reference: String },

    #[error("checkpoint index {index} out of range (1-{count})")]
    IndexOutOfRange { index: i64, count: usize },

    #[error("ambiguous checkpoint reference {reference:?} matches {count} checkpoints")]
    AmbiguousReference { reference: String, count: usize },

    #[error("no checkpoint found matching: {reference}")]
    NoMatch { reference: String },

    #[error("Multiplexer error: {message}")]
    Multiplexer { message: String },

    #[error("Git operation failed: {message}")]
    GitError { message: String },

    #[error("Atomic operation failed: {operation}")]
    AtomicOperationFailed { operation: String },
}

impl CheckpointError {
    /// Create a config error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a storage error
    pub fn storage<S: Into<String>>(message: S) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Create a multiplexer error
    pub fn multiplexer<S: Into<String>>(message: S) -> Self {
        Self::Multiplexer {
            message: message.into(),
        }
    }

    /// Create a git error
    pub fn git<S: Into<String>>(message: S) -> Self {
        Self::GitError {
            message: message.into(),
        }
    }

    /// Create an atomic operation error
    pub fn atomic<S: Into<String>>(operation: S) -> Self {
        Self::AtomicOperationFailed {
            operation: operation.into(),
        }
    }

    /// Check if this error is recoverable (user can potentially fix it)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CheckpointError::Config { .. }
                | CheckpointError::SessionNotFound { .. }
                | CheckpointError::NoCheckpoints { .. }
                | CheckpointError::CheckpointNotFound { .. }
                | CheckpointError::InvalidSessionName { .. }
                | CheckpointError::InvalidCheckpointId { .. }
                | CheckpointError::InvalidReference { .. }
                | CheckpointError::IndexOutOfRange { .. }
                | CheckpointError::AmbiguousReference { .. }
                | CheckpointError::NoMatch { .. }
        )
    }

    /// Get a user-friendly error message with recovery suggestions
    pub fn user_friendly_message(&self) -> String {
        match self {
            CheckpointError::SessionNotFound { session } => {
                format!(
                    "Session '{}' does not exist. Start it first, or check the name with 'tmux ls'.",
                    session
                )
            }
            CheckpointError::NoCheckpoints { session } => {
                format!(
                    "No checkpoints found for session '{}'. Use 'mux-checkpoint save {}' to create one.",
                    session, session
                )
            }
            CheckpointError::AmbiguousReference { reference, count } => {
                format!(
                    "'{}' matches {} checkpoints. Use a full checkpoint ID or '~N' to pick one.",
                    reference, count
                )
            }
            CheckpointError::NoMatch { reference } => {
                format!(
                    "No checkpoint matches '{}'. Use 'mux-checkpoint list <session>' to see available checkpoints.",
                    reference
                )
            }
            CheckpointError::IndexOutOfRange { index, count } if *count == 0 => {
                format!("Checkpoint index {} requested, but the session has no checkpoints.", index)
            }
            CheckpointError::Serialization(e) => {
                format!("Corrupted checkpoint data: {}. You may need to delete and recreate this checkpoint.", e)
            }
            _ => self.to_string(),
        }
    }
}
