//! Automatic checkpoints with rotation

use super::{
    Capturer, Checkpoint, CheckpointError, CheckpointOptions, CheckpointResult, Storage,
    AUTO_CHECKPOINT_PREFIX, AUTO_DESCRIPTION_MARKER,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// Why an auto-checkpoint was triggered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoCheckpointReason {
    /// Before sending to all agents
    Broadcast,
    /// Before adding many agents
    AddAgents,
    /// After spawning a session
    Spawn,
    /// Before another risky operation
    RiskyOp,
}

impl AutoCheckpointReason {
    pub const ALL: [AutoCheckpointReason; 4] = [
        AutoCheckpointReason::Broadcast,
        AutoCheckpointReason::AddAgents,
        AutoCheckpointReason::Spawn,
        AutoCheckpointReason::RiskyOp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AutoCheckpointReason::Broadcast => "broadcast",
            AutoCheckpointReason::AddAgents => "add_agents",
            AutoCheckpointReason::Spawn => "spawn",
            AutoCheckpointReason::RiskyOp => "risky_op",
        }
    }
}

impl fmt::Display for AutoCheckpointReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AutoCheckpointReason {
    type Err = CheckpointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|reason| reason.as_str() == s)
            .ok_or_else(|| CheckpointError::config(format!("unknown auto-checkpoint reason: {}", s)))
    }
}

/// Options for one auto-checkpoint
#[derive(Debug, Clone)]
pub struct AutoCheckpointOptions {
    pub session_name: String,
    pub reason: AutoCheckpointReason,
    /// Extra context appended to the description
    pub description: String,
    /// Scrollback lines per pane; `None` keeps the capturer default
    pub scrollback_lines: Option<usize>,
    pub include_git: bool,
    /// Auto-checkpoints to keep for the session; `None` or 0 disables rotation
    pub max_checkpoints: Option<usize>,
}

impl AutoCheckpointOptions {
    pub fn new<S: Into<String>>(session_name: S, reason: AutoCheckpointReason) -> Self {
        Self {
            session_name: session_name.into(),
            reason,
            description: String::new(),
            scrollback_lines: None,
            include_git: true,
            max_checkpoints: None,
        }
    }
}

/// Creates reason-named checkpoints and keeps their number bounded
pub struct AutoCheckpointer {
    capturer: Arc<Capturer>,
    storage: Storage,
}

impl AutoCheckpointer {
    pub fn new(capturer: Arc<Capturer>) -> Self {
        let storage = capturer.storage().clone();
        Self { capturer, storage }
    }

    /// Create an auto-checkpoint, then rotate old ones.
    ///
    /// Rotation problems are logged; they never fail the call once the
    /// checkpoint itself exists.
    pub async fn create(&self, opts: AutoCheckpointOptions) -> CheckpointResult<Checkpoint> {
        let name = auto_checkpoint_name(opts.reason);
        let description = auto_checkpoint_description(opts.reason, &opts.description);

        let mut cp_opts = CheckpointOptions::default()
            .with_description(description)
            .with_git_capture(opts.include_git);
        if let Some(lines) = opts.scrollback_lines.filter(|lines| *lines > 0) {
            cp_opts = cp_opts.with_scrollback_lines(lines);
        }

        let checkpoint = self
            .capturer
            .create(&opts.session_name, &name, cp_opts)
            .await?;

        if let Some(max) = opts.max_checkpoints.filter(|max| *max > 0) {
            if let Err(e) = self.rotate(&opts.session_name, max).await {
                tracing::warn!(
                    session = %opts.session_name,
                    error = %e,
                    "failed to rotate auto-checkpoints"
                );
            }
        }

        Ok(checkpoint)
    }

    /// Delete the oldest auto-checkpoints beyond `max_count`, returning how
    /// many were removed. Checkpoints that were not auto-generated are kept.
    pub async fn rotate(&self, session_name: &str, max_count: usize) -> CheckpointResult<usize> {
        let auto_checkpoints = self.list_auto_checkpoints(session_name).await?;
        if auto_checkpoints.len() <= max_count {
            return Ok(0);
        }

        let mut deleted = 0;
        for cp in &auto_checkpoints[max_count..] {
            match self.storage.delete(session_name, &cp.id).await {
                Ok(()) => {
                    deleted += 1;
                    tracing::debug!(session = %session_name, checkpoint_id = %cp.id, "rotated auto-checkpoint");
                }
                Err(e) => {
                    tracing::warn!(
                        session = %session_name,
                        checkpoint_id = %cp.id,
                        error = %e,
                        "failed to delete old auto-checkpoint"
                    );
                }
            }
        }

        Ok(deleted)
    }

    /// Most recent auto-checkpoint of a session
    pub async fn last_auto_checkpoint(&self, session_name: &str) -> CheckpointResult<Checkpoint> {
        self.list_auto_checkpoints(session_name)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| CheckpointError::NoCheckpoints {
                session: session_name.to_string(),
            })
    }

    /// Auto-checkpoints of a session, newest first
    pub async fn list_auto_checkpoints(&self, session_name: &str) -> CheckpointResult<Vec<Checkpoint>> {
        Ok(self
            .storage
            .list(session_name)
            .await?
            .into_iter()
            .filter(Checkpoint::is_auto)
            .collect())
    }

    /// Time since the last auto-checkpoint; zero if there is none
    pub async fn time_since_last_auto_checkpoint(&self, session_name: &str) -> Duration {
        match self.last_auto_checkpoint(session_name).await {
            Ok(cp) => cp.age(),
            Err(_) => Duration::ZERO,
        }
    }
}

/// Checkpoint name used for `reason`
pub fn auto_checkpoint_name(reason: AutoCheckpointReason) -> String {
    format!("{}-{}", AUTO_CHECKPOINT_PREFIX, reason)
}

/// Description used for `reason`, with optional extra context
pub fn auto_checkpoint_description(reason: AutoCheckpointReason, context: &str) -> String {
    if context.is_empty() {
        format!("{} {}", AUTO_DESCRIPTION_MARKER, reason)
    } else {
        format!("{} {} ({})", AUTO_DESCRIPTION_MARKER, reason, context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_round_trip() {
        for reason in AutoCheckpointReason::ALL {
            assert_eq!(reason.as_str().parse::<AutoCheckpointReason>().unwrap(), reason);
        }
        assert!("sometimes".parse::<AutoCheckpointReason>().is_err());
    }

    #[test]
    fn test_name_and_description() {
        assert_eq!(auto_checkpoint_name(AutoCheckpointReason::AddAgents), "auto-add_agents");
        assert_eq!(
            auto_checkpoint_description(AutoCheckpointReason::Broadcast, ""),
            "Auto-checkpoint: broadcast"
        );
        assert_eq!(
            auto_checkpoint_description(AutoCheckpointReason::RiskyOp, "git reset"),
            "Auto-checkpoint: risky_op (git reset)"
        );
    }

    #[test]
    fn test_reason_serializes_snake_case() {
        let json = serde_json::to_string(&AutoCheckpointReason::AddAgents).unwrap();
        assert_eq!(json, "\"add_agents\"");
    }
}
