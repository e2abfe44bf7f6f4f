//! mux-checkpoint - durable snapshots of terminal multiplexer sessions
//!
//! A checkpoint records a session's pane layout, each pane's recent
//! scrollback and, when the session works inside a git repository, the
//! repository state plus a patch of uncommitted tracked changes.
//!
//! - **`checkpoint`** - storage, capture, reference resolution and auto-checkpoint rotation
//! - **`config`** - TOML configuration and environment overrides
//! - **`executor`** - external program execution with timeouts
//! - **`tmux`** / **`git`** - command-line collaborators used during capture
//! - **`observability`** - log output setup (feature `observability`)
//! - **`cli`** - the `mux-checkpoint` command line (feature `cli`)
//!
//! # Features
//!
//! ```toml
//! [dependencies]
//! mux-checkpoint = "0.1"
//! # With log setup and the command-line front end:
//! mux-checkpoint = { version = "0.1", features = ["all"] }
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use mux_checkpoint::prelude::*;
//! use std::sync::Arc;
//!
//! async fn example() -> CheckpointResult<()> {
//!     let capturer = Arc::new(Capturer::new(
//!         Storage::new("/tmp/checkpoints"),
//!         Arc::new(TmuxClient::default()),
//!         Arc::new(GitCli::default()),
//!     ));
//!
//!     let auto = AutoCheckpointer::new(Arc::clone(&capturer));
//!     let mut opts = AutoCheckpointOptions::new("dev", AutoCheckpointReason::Broadcast);
//!     opts.max_checkpoints = Some(10);
//!     auto.create(opts).await?;
//!
//!     let latest = capturer.parse_checkpoint_ref("dev", "~1").await?;
//!     println!("{}", latest.summary());
//!     Ok(())
//! }
//! ```

pub mod checkpoint;
pub mod config;
pub mod executor;
pub mod git;
pub mod tmux;

/// Log output setup (enabled with the `observability` feature)
#[cfg(feature = "observability")]
pub mod observability;

/// Command-line front end (enabled with the `cli` feature)
#[cfg(feature = "cli")]
pub mod cli;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::checkpoint::{
        AutoCheckpointOptions, AutoCheckpointReason, AutoCheckpointer, Capturer, Checkpoint,
        CheckpointError, CheckpointOptions, CheckpointResult, GitState, Multiplexer, PaneInfo,
        PaneState, ReferenceResolver, SessionState, Storage, VcsInspector,
    };
    pub use crate::config::{CheckpointConfig, ConfigurationLoader, EnvironmentLoader};
    pub use crate::executor::CommandExecutor;
    pub use crate::git::GitCli;
    pub use crate::tmux::TmuxClient;
}
