//! Command-line arguments

use crate::checkpoint::AutoCheckpointReason;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "mux-checkpoint", version)]
#[command(about = "Checkpoint tmux sessions: pane layout, scrollback and git state.")]
pub struct Cli {
    /// Config file (default: <config dir>/mux-checkpoint/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// .env file with MUX_CHECKPOINT_* overrides
    #[arg(long, global = true)]
    pub env_file: Option<PathBuf>,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a checkpoint of a session
    Save {
        session: String,

        /// Checkpoint name, used in the ID
        #[arg(long, default_value = "")]
        name: String,

        /// Checkpoint description
        #[arg(short = 'm', long = "message", default_value = "")]
        description: String,

        /// Lines of scrollback per pane (default from config)
        #[arg(long)]
        scrollback: Option<usize>,

        /// Skip capturing git state
        #[arg(long)]
        no_git: bool,
    },
    /// Create an auto-checkpoint and rotate old ones
    Auto {
        session: String,

        #[arg(long, value_enum)]
        reason: ReasonArg,

        /// Extra context appended to the description
        #[arg(short = 'm', long = "message", default_value = "")]
        context: String,
    },
    /// List checkpoints, optionally for one session
    List { session: Option<String> },
    /// Show a checkpoint (`latest`, `~N`, an ID, a name or a `*` pattern)
    Show {
        session: String,
        reference: String,
    },
    /// Delete a checkpoint
    Delete {
        session: String,
        reference: String,

        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "snake_case")]
pub enum ReasonArg {
    Broadcast,
    AddAgents,
    Spawn,
    RiskyOp,
}

impl From<ReasonArg> for AutoCheckpointReason {
    fn from(reason: ReasonArg) -> Self {
        match reason {
            ReasonArg::Broadcast => AutoCheckpointReason::Broadcast,
            ReasonArg::AddAgents => AutoCheckpointReason::AddAgents,
            ReasonArg::Spawn => AutoCheckpointReason::Spawn,
            ReasonArg::RiskyOp => AutoCheckpointReason::RiskyOp,
        }
    }
}
