//! Data models for the checkpoint engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Prefix carried by the names of automatically created checkpoints
pub const AUTO_CHECKPOINT_PREFIX: &str = "auto";

/// Marker placed in the description of automatically created checkpoints
pub const AUTO_DESCRIPTION_MARKER: &str = "Auto-checkpoint:";

/// Agent labels carried by pane titles of the form `<session>__<agent>_<n>`
pub const AGENT_CLAUDE: &str = "cc";
pub const AGENT_CODEX: &str = "cod";
pub const AGENT_GEMINI: &str = "gmi";
/// Any pane not running a recognised agent
pub const AGENT_USER: &str = "user";

/// A saved session state
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Checkpoint {
    /// Unique identifier within the session (timestamp-based)
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// The multiplexer session this checkpoint belongs to
    pub session_name: String,
    #[serde(default)]
    pub working_dir: String,
    pub created_at: DateTime<Utc>,
    pub session: SessionState,
    /// Present only when repository state was captured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git: Option<GitState>,
    #[serde(default)]
    pub pane_count: usize,
}

impl Checkpoint {
    /// Brief one-line summary: `name (id)`
    pub fn summary(&self) -> String {
        format!("{} ({})", self.name, self.id)
    }

    /// How long ago the checkpoint was created
    pub fn age(&self) -> std::time::Duration {
        (Utc::now() - self.created_at).to_std().unwrap_or_default()
    }

    /// True if a git patch file was captured
    pub fn has_git_patch(&self) -> bool {
        self.git
            .as_ref()
            .map_or(false, |git| !git.patch_file.is_empty())
    }

    /// True if this checkpoint was generated by the auto-checkpointer.
    ///
    /// Older records may lack the name prefix, so the description marker is
    /// accepted as well.
    pub fn is_auto(&self) -> bool {
        self.name.starts_with(AUTO_CHECKPOINT_PREFIX)
            || self.description.contains(AUTO_DESCRIPTION_MARKER)
    }
}

/// Layout and panes of a multiplexer session
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    /// Panes in session order at capture time
    #[serde(default)]
    pub panes: Vec<PaneState>,
    /// Opaque layout descriptor, stored verbatim
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub layout: String,
    #[serde(default)]
    pub active_pane_index: u32,
}

/// State of a single pane
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct PaneState {
    /// Position in the session-wide pane list; names the scrollback file
    pub index: u32,
    /// Stable multiplexer pane identifier (e.g. `%3`)
    pub id: String,
    #[serde(default)]
    pub window_index: u32,
    /// The multiplexer's own index of the pane within its window
    #[serde(default)]
    pub window_pane_index: u32,
    #[serde(default)]
    pub title: String,
    /// `cc`, `cod`, `gmi` or `user`; empty in records that predate it
    #[serde(default)]
    pub agent_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub command: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    /// Path relative to the checkpoint directory; empty if capture failed
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub scrollback_file: String,
    #[serde(default)]
    pub scrollback_lines: usize,
}

/// Repository state at checkpoint time
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct GitState {
    pub branch: String,
    pub commit: String,
    pub is_dirty: bool,
    /// Set only if a non-empty diff of tracked changes was captured
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub patch_file: String,
    pub staged_count: usize,
    pub unstaged_count: usize,
    pub untracked_count: usize,
}

impl GitState {
    /// Total number of changed paths
    pub fn change_count(&self) -> usize {
        self.staged_count + self.unstaged_count + self.untracked_count
    }
}

/// Options controlling checkpoint creation
#[derive(Debug, Clone, PartialEq)]
pub struct CheckpointOptions {
    pub description: String,
    pub capture_git: bool,
    /// Maximum scrollback lines captured per pane
    pub scrollback_lines: usize,
}

impl CheckpointOptions {
    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_git_capture(mut self, capture: bool) -> Self {
        self.capture_git = capture;
        self
    }

    pub fn with_scrollback_lines(mut self, lines: usize) -> Self {
        self.scrollback_lines = lines;
        self
    }
}

impl Default for CheckpointOptions {
    fn default() -> Self {
        Self {
            description: String::new(),
            capture_git: true,
            scrollback_lines: 1000,
        }
    }
}
