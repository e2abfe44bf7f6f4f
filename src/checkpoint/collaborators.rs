//! External collaborators consulted during capture
//!
//! The capturer never talks to a terminal multiplexer or version control
//! directly; it goes through these traits. [`crate::tmux::TmuxClient`] and
//! [`crate::git::GitCli`] are the command-line implementations.

use super::CheckpointResult;
use async_trait::async_trait;
use std::path::Path;

/// A pane as reported by the multiplexer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaneInfo {
    pub window_index: u32,
    /// Index within its window; panes in different windows may share it
    pub index: u32,
    /// Stable identifier (e.g. `%3` for tmux)
    pub id: String,
    pub title: String,
    /// Agent label derived from the title (`cc`, `cod`, `gmi` or `user`)
    pub agent_type: String,
    pub command: String,
    pub width: u32,
    pub height: u32,
    pub active: bool,
}

/// Multiplexer session client
#[async_trait]
pub trait Multiplexer: Send + Sync {
    async fn session_exists(&self, session: &str) -> bool;

    /// Panes of every window in the session, ordered by window then pane.
    /// Only the active pane of the active window is marked active.
    async fn list_panes(&self, session: &str) -> CheckpointResult<Vec<PaneInfo>>;

    /// Up to `max_lines` lines of history for the pane addressed by `target`
    async fn capture_scrollback(&self, target: &str, max_lines: usize) -> CheckpointResult<String>;

    async fn working_directory(&self, session: &str) -> CheckpointResult<String>;

    /// Opaque descriptor that can recreate the session's pane layout
    async fn layout_descriptor(&self, session: &str) -> CheckpointResult<String>;
}

/// Version-control inspector
#[async_trait]
pub trait VcsInspector: Send + Sync {
    async fn is_repository(&self, path: &Path) -> bool;
    async fn current_branch(&self, path: &Path) -> CheckpointResult<String>;
    async fn current_commit(&self, path: &Path) -> CheckpointResult<String>;

    /// Script-friendly status, one `XY path` line per changed file
    async fn porcelain_status(&self, path: &Path) -> CheckpointResult<String>;

    /// Diff of staged and unstaged tracked changes against HEAD
    async fn diff_against_head(&self, path: &Path) -> CheckpointResult<String>;

    /// Human-readable status
    async fn full_status(&self, path: &Path) -> CheckpointResult<String>;
}
