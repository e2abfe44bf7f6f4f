//! Shared state for command handlers

use crate::checkpoint::{AutoCheckpointer, Capturer, Multiplexer, Storage, VcsInspector};
use crate::cli::error::{CliError, CliResult};
use crate::config::CheckpointConfig;
use crate::executor::CommandExecutor;
use crate::git::GitCli;
use crate::tmux::TmuxClient;
use serde::Serialize;
use std::sync::Arc;

/// Configuration plus the engine objects built from it
pub struct CliContext {
    pub config: CheckpointConfig,
    pub json: bool,
    capturer: Arc<Capturer>,
}

impl CliContext {
    /// Build the engine over the tmux and git command-line clients.
    pub fn from_config(config: CheckpointConfig, json: bool) -> CliResult<Self> {
        let executor = CommandExecutor::new(config.commands.timeout_seconds, None);
        let tmux = TmuxClient::new(config.commands.tmux_binary.clone(), executor.clone());
        let git = GitCli::new(config.commands.git_binary.clone(), executor);
        Self::with_collaborators(config, json, Arc::new(tmux), Arc::new(git))
    }

    pub fn with_collaborators(
        config: CheckpointConfig,
        json: bool,
        multiplexer: Arc<dyn Multiplexer>,
        vcs: Arc<dyn VcsInspector>,
    ) -> CliResult<Self> {
        config.validate()?;
        let base_dir = config.resolved_base_dir()?;
        tracing::debug!(base_dir = %base_dir.display(), "checkpoint storage");

        let capturer = Capturer::new(Storage::new(base_dir), multiplexer, vcs);
        Ok(Self {
            config,
            json,
            capturer: Arc::new(capturer),
        })
    }

    pub fn capturer(&self) -> &Capturer {
        &self.capturer
    }

    pub fn storage(&self) -> &Storage {
        self.capturer.storage()
    }

    pub fn auto_checkpointer(&self) -> AutoCheckpointer {
        AutoCheckpointer::new(Arc::clone(&self.capturer))
    }

    /// Print `value` as pretty JSON on stdout
    pub fn print_json<T: Serialize + ?Sized>(&self, value: &T) -> CliResult<()> {
        let json = serde_json::to_string_pretty(value).map_err(CliError::from)?;
        println!("{}", json);
        Ok(())
    }
}
