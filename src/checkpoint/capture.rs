//! Checkpoint creation: snapshotting a live multiplexer session

use super::{
    generate_id, Checkpoint, CheckpointError, CheckpointOptions, CheckpointResult, GitState,
    Multiplexer, PaneState, SessionState, Storage, VcsInspector, AGENT_USER, GIT_PATCH_FILE,
};
use chrono::Utc;
use std::path::Path;
use std::sync::Arc;

/// Per-category counts parsed from porcelain status output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub staged: usize,
    pub unstaged: usize,
    pub untracked: usize,
}

/// Repository state read before anything is written to the checkpoint
struct GitSnapshot {
    state: GitState,
    status_text: String,
    patch: String,
}

/// Captures session state into checkpoints
pub struct Capturer {
    storage: Storage,
    multiplexer: Arc<dyn Multiplexer>,
    vcs: Arc<dyn VcsInspector>,
}

impl Capturer {
    pub fn new(
        storage: Storage,
        multiplexer: Arc<dyn Multiplexer>,
        vcs: Arc<dyn VcsInspector>,
    ) -> Self {
        Self {
            storage,
            multiplexer,
            vcs,
        }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Create a checkpoint of `session_name`.
    ///
    /// The checkpoint is saved once right after the pane layout is captured,
    /// so its directory exists even if a later step fails, and saved again
    /// once scrollback and git state have been added. Only a storage failure
    /// or a missing session makes this fail; layout, scrollback and git
    /// command problems are logged and leave the corresponding fields empty.
    /// Failing to write `git.patch` or `git-status.txt` is a storage failure.
    pub async fn create(
        &self,
        session_name: &str,
        name: &str,
        options: CheckpointOptions,
    ) -> CheckpointResult<Checkpoint> {
        if !self.multiplexer.session_exists(session_name).await {
            return Err(CheckpointError::SessionNotFound {
                session: session_name.to_string(),
            });
        }

        let checkpoint_id = self.unique_id(session_name, name).await;

        let working_dir = match self.multiplexer.working_directory(session_name).await {
            Ok(dir) => dir.trim().to_string(),
            Err(e) => {
                tracing::debug!(session = %session_name, error = %e, "working directory unavailable");
                String::new()
            }
        };

        let session = self.capture_session_state(session_name).await?;

        let mut checkpoint = Checkpoint {
            id: checkpoint_id,
            name: name.to_string(),
            description: options.description.clone(),
            session_name: session_name.to_string(),
            working_dir,
            created_at: Utc::now(),
            pane_count: session.panes.len(),
            session,
            git: None,
        };

        self.storage.save(&checkpoint).await?;

        self.capture_scrollback(&mut checkpoint, options.scrollback_lines)
            .await?;

        if options.capture_git && !checkpoint.working_dir.is_empty() {
            let working_dir = checkpoint.working_dir.clone();
            match self.inspect_repository(Path::new(&working_dir), &checkpoint.id).await {
                Ok(Some(snapshot)) => {
                    checkpoint.git = Some(
                        self.write_git_artifacts(session_name, &checkpoint.id, snapshot)
                            .await?,
                    );
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(
                        session = %session_name,
                        checkpoint_id = %checkpoint.id,
                        error = %e,
                        "failed to capture git state"
                    );
                }
            }
        }

        self.storage.save(&checkpoint).await?;

        tracing::info!(
            session = %session_name,
            checkpoint_id = %checkpoint.id,
            panes = checkpoint.pane_count,
            git = checkpoint.git.is_some(),
            "checkpoint created"
        );
        Ok(checkpoint)
    }

    /// Generate an ID for `name`, adding a numeric suffix while the ID is
    /// already taken in the session.
    async fn unique_id(&self, session_name: &str, name: &str) -> String {
        let base = generate_id(name);
        let mut candidate = base.clone();
        let mut suffix = 2u32;
        while self.storage.exists(session_name, &candidate).await {
            candidate = format!("{}-{}", base, suffix);
            suffix += 1;
        }
        candidate
    }

    async fn capture_session_state(&self, session_name: &str) -> CheckpointResult<SessionState> {
        let panes = self.multiplexer.list_panes(session_name).await.map_err(|e| {
            CheckpointError::multiplexer(format!("listing panes of {}: {}", session_name, e))
        })?;

        // tmux restarts pane numbering in every window, so panes are keyed
        // by their position in the session instead
        let active_pane_index = panes
            .iter()
            .position(|p| p.active)
            .map(|pos| pos as u32)
            .unwrap_or(0);

        let panes = panes
            .into_iter()
            .enumerate()
            .map(|(pos, p)| PaneState {
                index: pos as u32,
                id: p.id,
                window_index: p.window_index,
                window_pane_index: p.index,
                title: p.title,
                agent_type: if p.agent_type.is_empty() {
                    AGENT_USER.to_string()
                } else {
                    p.agent_type
                },
                command: p.command,
                width: p.width,
                height: p.height,
                scrollback_file: String::new(),
                scrollback_lines: 0,
            })
            .collect();

        let layout = match self.multiplexer.layout_descriptor(session_name).await {
            Ok(layout) => layout.trim().to_string(),
            Err(e) => {
                tracing::warn!(session = %session_name, error = %e, "failed to capture session layout");
                String::new()
            }
        };

        Ok(SessionState {
            panes,
            layout,
            active_pane_index,
        })
    }

    /// Capture each pane's scrollback. Panes that cannot be captured are
    /// skipped; failing to persist a capture is an error.
    async fn capture_scrollback(
        &self,
        checkpoint: &mut Checkpoint,
        max_lines: usize,
    ) -> CheckpointResult<()> {
        for pane in checkpoint.session.panes.iter_mut() {
            let target = if pane.id.is_empty() {
                format!(
                    "{}:{}.{}",
                    checkpoint.session_name, pane.window_index, pane.window_pane_index
                )
            } else {
                pane.id.clone()
            };

            let content = match self
                .multiplexer
                .capture_scrollback(&target, max_lines)
                .await
            {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!(
                        session = %checkpoint.session_name,
                        pane = %target,
                        error = %e,
                        "failed to capture pane scrollback"
                    );
                    continue;
                }
            };

            let relative_path = self
                .storage
                .save_scrollback(&checkpoint.session_name, &checkpoint.id, pane.index, &content)
                .await?;

            pane.scrollback_file = relative_path;
            pane.scrollback_lines = count_lines(&content);
        }

        Ok(())
    }

    /// Capture repository state for `working_dir` into the checkpoint directory.
    ///
    /// Returns `Ok(None)` when the directory is not a repository.
    pub async fn capture_git_state(
        &self,
        working_dir: &Path,
        session_name: &str,
        checkpoint_id: &str,
    ) -> CheckpointResult<Option<GitState>> {
        match self.inspect_repository(working_dir, checkpoint_id).await? {
            Some(snapshot) => Ok(Some(
                self.write_git_artifacts(session_name, checkpoint_id, snapshot)
                    .await?,
            )),
            None => Ok(None),
        }
    }

    /// Run the git queries. Nothing is written here, so every error is a
    /// git error.
    async fn inspect_repository(
        &self,
        working_dir: &Path,
        checkpoint_id: &str,
    ) -> CheckpointResult<Option<GitSnapshot>> {
        if !self.vcs.is_repository(working_dir).await {
            return Ok(None);
        }

        let branch = self
            .vcs
            .current_branch(working_dir)
            .await
            .map_err(|e| CheckpointError::git(format!("getting git branch: {}", e)))?;
        let commit = self
            .vcs
            .current_commit(working_dir)
            .await
            .map_err(|e| CheckpointError::git(format!("getting git commit: {}", e)))?;

        let status = self
            .vcs
            .porcelain_status(working_dir)
            .await
            .map_err(|e| CheckpointError::git(format!("getting git status: {}", e)))?;
        let counts = parse_git_status(&status);

        let state = GitState {
            branch: branch.trim().to_string(),
            commit: commit.trim().to_string(),
            is_dirty: counts.staged + counts.unstaged + counts.untracked > 0,
            patch_file: String::new(),
            staged_count: counts.staged,
            unstaged_count: counts.unstaged,
            untracked_count: counts.untracked,
        };

        let status_text = match self.vcs.full_status(working_dir).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(checkpoint_id = %checkpoint_id, error = %e, "failed to read git status text");
                String::new()
            }
        };

        let mut patch = String::new();
        if state.is_dirty {
            if state.untracked_count > 0 {
                tracing::warn!(
                    checkpoint_id = %checkpoint_id,
                    untracked = state.untracked_count,
                    "untracked files are not captured in the git patch (only staged/unstaged tracked changes)"
                );
            }

            patch = self
                .vcs
                .diff_against_head(working_dir)
                .await
                .map_err(|e| CheckpointError::git(format!("getting git diff: {}", e)))?;
        }

        Ok(Some(GitSnapshot {
            state,
            status_text,
            patch,
        }))
    }

    async fn write_git_artifacts(
        &self,
        session_name: &str,
        checkpoint_id: &str,
        snapshot: GitSnapshot,
    ) -> CheckpointResult<GitState> {
        let GitSnapshot {
            mut state,
            status_text,
            patch,
        } = snapshot;

        if !status_text.is_empty() {
            self.storage
                .save_git_status(session_name, checkpoint_id, &status_text)
                .await?;
        }
        if !patch.is_empty() {
            self.storage
                .save_git_patch(session_name, checkpoint_id, &patch)
                .await?;
            state.patch_file = GIT_PATCH_FILE.to_string();
        }

        Ok(state)
    }
}

/// Classify porcelain status lines.
///
/// Byte 0 is the index status and byte 1 the worktree status. `??` is
/// untracked; otherwise a non-space, non-`?` index status is staged. A
/// non-space, non-`?` worktree status with a non-`?` index status is
/// unstaged, so one line can count as both staged and unstaged.
pub fn parse_git_status(status: &str) -> StatusCounts {
    let mut counts = StatusCounts::default();

    for line in status.trim_end_matches('\n').split('\n') {
        let bytes = line.as_bytes();
        if bytes.len() < 2 {
            continue;
        }
        let index_status = bytes[0];
        let worktree_status = bytes[1];

        if index_status == b'?' && worktree_status == b'?' {
            counts.untracked += 1;
        } else if index_status != b' ' && index_status != b'?' {
            counts.staged += 1;
        }

        if worktree_status != b' ' && worktree_status != b'?' && index_status != b'?' {
            counts.unstaged += 1;
        }
    }

    counts
}

/// Number of lines in captured text; empty text has none.
///
/// A trailing newline does not start another line. Scrollback arrives
/// with trailing whitespace trimmed, so this equals the newline count
/// plus one for any non-empty capture.
pub fn count_lines(content: &str) -> usize {
    content.lines().count()
}
