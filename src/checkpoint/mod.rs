//! Session checkpoints
//!
//! A checkpoint is a point-in-time snapshot of a multiplexer session: its
//! pane layout, each pane's scrollback text and, when the session works
//! inside a git repository, the repository state plus a patch of
//! uncommitted tracked changes.
//!
//! Checkpoints live on disk under a per-session directory:
//!
//! ```text
//! <base_dir>/<session>/<checkpoint-id>/
//!     metadata.json
//!     session.json
//!     panes/pane_<index>.txt
//!     git.patch
//!     git-status.txt
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use mux_checkpoint::checkpoint::{Capturer, CheckpointOptions, CheckpointResult, Storage};
//! use mux_checkpoint::git::GitCli;
//! use mux_checkpoint::tmux::TmuxClient;
//! use std::sync::Arc;
//!
//! async fn example() -> CheckpointResult<()> {
//!     let storage = Storage::new("/tmp/checkpoints");
//!     let capturer = Capturer::new(
//!         storage,
//!         Arc::new(TmuxClient::default()),
//!         Arc::new(GitCli::default()),
//!     );
//!     let cp = capturer
//!         .create("dev", "before-refactor", CheckpointOptions::default())
//!         .await?;
//!     let same = capturer.parse_checkpoint_ref("dev", "latest").await?;
//!     assert_eq!(cp.id, same.id);
//!     Ok(())
//! }
//! ```

pub mod atomic;
pub mod auto;
pub mod capture;
pub mod collaborators;
pub mod errors;
pub mod models;
pub mod reference;
pub mod sanitize;
pub mod storage;

pub use atomic::{AtomicFileWriter, AtomicOps};
pub use auto::{
    auto_checkpoint_description, auto_checkpoint_name, AutoCheckpointOptions,
    AutoCheckpointReason, AutoCheckpointer,
};
pub use capture::{count_lines, parse_git_status, Capturer, StatusCounts};
pub use collaborators::{Multiplexer, PaneInfo, VcsInspector};
pub use errors::{CheckpointError, CheckpointResult};
pub use models::{
    Checkpoint, CheckpointOptions, GitState, PaneState, SessionState, AGENT_CLAUDE, AGENT_CODEX,
    AGENT_GEMINI, AGENT_USER, AUTO_CHECKPOINT_PREFIX, AUTO_DESCRIPTION_MARKER,
};
pub use reference::{match_wildcard, ReferenceResolver};
pub use sanitize::{generate_id, generate_id_at, sanitize_name, MAX_NAME_BYTES};
pub use storage::{
    scrollback_filename, Storage, GIT_PATCH_FILE, GIT_STATUS_FILE, METADATA_FILE, PANES_DIR,
    SESSION_FILE,
};
