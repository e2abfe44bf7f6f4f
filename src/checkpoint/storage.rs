//! On-disk storage for checkpoints
//!
//! Layout under the base directory:
//!
//! ```text
//! <base>/<session>/<checkpoint id>/
//!     metadata.json        full checkpoint record
//!     session.json         session state only
//!     panes/pane_<index>.txt
//!     git.patch            only if a non-empty diff was captured
//!     git-status.txt       only if git-state capture ran
//! ```

use super::{AtomicOps, Checkpoint, CheckpointError, CheckpointResult};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Name of the checkpoint metadata file
pub const METADATA_FILE: &str = "metadata.json";
/// Name of the session state file
pub const SESSION_FILE: &str = "session.json";
/// Name of the git diff patch file
pub const GIT_PATCH_FILE: &str = "git.patch";
/// Name of the git status file
pub const GIT_STATUS_FILE: &str = "git-status.txt";
/// Subdirectory for pane scrollback captures
pub const PANES_DIR: &str = "panes";

/// Checkpoint storage rooted at one base directory holding every session
#[derive(Debug, Clone)]
pub struct Storage {
    base_dir: PathBuf,
}

impl Storage {
    /// Create a storage handle for `base_dir`. Nothing is created on disk
    /// until the first save.
    pub fn new<P: Into<PathBuf>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Directory holding all checkpoints of a session
    pub fn session_dir(&self, session_name: &str) -> CheckpointResult<PathBuf> {
        validate_session_name(session_name)?;
        Ok(self.base_dir.join(session_name))
    }

    /// Directory of a specific checkpoint
    pub fn checkpoint_dir(&self, session_name: &str, checkpoint_id: &str) -> CheckpointResult<PathBuf> {
        validate_checkpoint_id(checkpoint_id)?;
        Ok(self.session_dir(session_name)?.join(checkpoint_id))
    }

    /// Pane scrollback directory of a checkpoint
    pub fn panes_dir(&self, session_name: &str, checkpoint_id: &str) -> CheckpointResult<PathBuf> {
        Ok(self.checkpoint_dir(session_name, checkpoint_id)?.join(PANES_DIR))
    }

    /// Path of the git patch of a checkpoint
    pub fn git_patch_path(&self, session_name: &str, checkpoint_id: &str) -> CheckpointResult<PathBuf> {
        Ok(self
            .checkpoint_dir(session_name, checkpoint_id)?
            .join(GIT_PATCH_FILE))
    }

    /// Write a checkpoint's metadata and session state.
    ///
    /// Creates the checkpoint directory and its `panes/` subdirectory first.
    /// Both JSON files are written atomically; the save fails if either does.
    pub async fn save(&self, checkpoint: &Checkpoint) -> CheckpointResult<()> {
        let dir = self.checkpoint_dir(&checkpoint.session_name, &checkpoint.id)?;

        fs::create_dir_all(&dir).await.map_err(|e| {
            CheckpointError::storage(format!(
                "creating checkpoint directory {}: {}",
                dir.display(),
                e
            ))
        })?;

        let panes_dir = dir.join(PANES_DIR);
        fs::create_dir_all(&panes_dir).await.map_err(|e| {
            CheckpointError::storage(format!(
                "creating panes directory {}: {}",
                panes_dir.display(),
                e
            ))
        })?;

        AtomicOps::write_json(&dir.join(METADATA_FILE), checkpoint)?;
        AtomicOps::write_json(&dir.join(SESSION_FILE), &checkpoint.session)?;

        tracing::debug!(
            session = %checkpoint.session_name,
            checkpoint_id = %checkpoint.id,
            "checkpoint saved"
        );
        Ok(())
    }

    /// Read a checkpoint's metadata. Missing or malformed metadata is an error.
    pub async fn load(&self, session_name: &str, checkpoint_id: &str) -> CheckpointResult<Checkpoint> {
        let path = self
            .checkpoint_dir(session_name, checkpoint_id)?
            .join(METADATA_FILE);

        match load_json(&path).await {
            Err(CheckpointError::Io(e)) if e.kind() == ErrorKind::NotFound => {
                Err(CheckpointError::CheckpointNotFound {
                    checkpoint_id: checkpoint_id.to_string(),
                    session: session_name.to_string(),
                })
            }
            other => other,
        }
    }

    /// All readable checkpoints of a session, newest first.
    ///
    /// Subdirectories whose metadata fails to load are skipped. A session
    /// without a directory has no checkpoints.
    pub async fn list(&self, session_name: &str) -> CheckpointResult<Vec<Checkpoint>> {
        let session_dir = self.session_dir(session_name)?;

        let mut entries = match fs::read_dir(&session_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(CheckpointError::storage(format!(
                    "reading session directory {}: {}",
                    session_dir.display(),
                    e
                )))
            }
        };

        let mut checkpoints = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            let checkpoint_id = entry.file_name().to_string_lossy().to_string();
            match self.load(session_name, &checkpoint_id).await {
                Ok(checkpoint) => checkpoints.push(checkpoint),
                Err(e) => {
                    tracing::debug!(
                        session = %session_name,
                        checkpoint_id = %checkpoint_id,
                        error = %e,
                        "skipping unreadable checkpoint"
                    );
                }
            }
        }

        sort_newest_first(&mut checkpoints);
        Ok(checkpoints)
    }

    /// Checkpoints across every session, newest first
    pub async fn list_all(&self) -> CheckpointResult<Vec<Checkpoint>> {
        let mut all = Vec::new();
        for session_name in self.list_sessions().await? {
            match self.list(&session_name).await {
                Ok(mut checkpoints) => all.append(&mut checkpoints),
                Err(e) => {
                    tracing::debug!(session = %session_name, error = %e, "skipping session");
                }
            }
        }

        sort_newest_first(&mut all);
        Ok(all)
    }

    /// Names of the session directories under the base directory, sorted
    pub async fn list_sessions(&self) -> CheckpointResult<Vec<String>> {
        let mut entries = match fs::read_dir(&self.base_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(CheckpointError::storage(format!(
                    "reading checkpoints directory {}: {}",
                    self.base_dir.display(),
                    e
                )))
            }
        };

        let mut sessions = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_dir() {
                let name = entry.file_name().to_string_lossy().to_string();
                if validate_session_name(&name).is_ok() {
                    sessions.push(name);
                }
            }
        }

        sessions.sort();
        Ok(sessions)
    }

    /// Remove a checkpoint's directory tree. Deleting a missing checkpoint succeeds.
    pub async fn delete(&self, session_name: &str, checkpoint_id: &str) -> CheckpointResult<()> {
        let dir = self.checkpoint_dir(session_name, checkpoint_id)?;
        match fs::remove_dir_all(&dir).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CheckpointError::storage(format!(
                "deleting checkpoint {}: {}",
                dir.display(),
                e
            ))),
        }
    }

    /// Most recent checkpoint of a session
    pub async fn get_latest(&self, session_name: &str) -> CheckpointResult<Checkpoint> {
        self.list(session_name)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| CheckpointError::NoCheckpoints {
                session: session_name.to_string(),
            })
    }

    /// True iff the checkpoint directory exists and is a directory
    pub async fn exists(&self, session_name: &str, checkpoint_id: &str) -> bool {
        match self.checkpoint_dir(session_name, checkpoint_id) {
            Ok(dir) => fs::metadata(&dir)
                .await
                .map(|m| m.is_dir())
                .unwrap_or(false),
            Err(_) => false,
        }
    }

    /// Write a pane's scrollback and return its path relative to the checkpoint directory
    pub async fn save_scrollback(
        &self,
        session_name: &str,
        checkpoint_id: &str,
        pane_index: u32,
        content: &str,
    ) -> CheckpointResult<String> {
        let panes_dir = self.panes_dir(session_name, checkpoint_id)?;
        fs::create_dir_all(&panes_dir).await.map_err(|e| {
            CheckpointError::storage(format!(
                "creating panes directory {}: {}",
                panes_dir.display(),
                e
            ))
        })?;

        let filename = scrollback_filename(pane_index);
        AtomicOps::write_file(&panes_dir.join(&filename), content)?;

        Ok(format!("{}/{}", PANES_DIR, filename))
    }

    /// Read a pane's captured scrollback
    pub async fn load_scrollback(
        &self,
        session_name: &str,
        checkpoint_id: &str,
        pane_index: u32,
    ) -> CheckpointResult<String> {
        let path = self
            .panes_dir(session_name, checkpoint_id)?
            .join(scrollback_filename(pane_index));
        Ok(fs::read_to_string(&path).await?)
    }

    /// Write the git diff patch. An empty patch writes nothing.
    pub async fn save_git_patch(
        &self,
        session_name: &str,
        checkpoint_id: &str,
        patch: &str,
    ) -> CheckpointResult<()> {
        if patch.is_empty() {
            return Ok(());
        }
        let path = self.git_patch_path(session_name, checkpoint_id)?;
        AtomicOps::write_file(&path, patch)
    }

    /// Read the git diff patch; `None` if the checkpoint has none
    pub async fn load_git_patch(
        &self,
        session_name: &str,
        checkpoint_id: &str,
    ) -> CheckpointResult<Option<String>> {
        let path = self.git_patch_path(session_name, checkpoint_id)?;
        match fs::read_to_string(&path).await {
            Ok(patch) => Ok(Some(patch)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CheckpointError::storage(format!(
                "reading git patch {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// Write the plain-text git status dump
    pub async fn save_git_status(
        &self,
        session_name: &str,
        checkpoint_id: &str,
        status: &str,
    ) -> CheckpointResult<()> {
        let path = self
            .checkpoint_dir(session_name, checkpoint_id)?
            .join(GIT_STATUS_FILE);
        AtomicOps::write_file(&path, status)
    }
}

/// File name of a pane's scrollback capture
pub fn scrollback_filename(pane_index: u32) -> String {
    format!("pane_{}.txt", pane_index)
}

fn sort_newest_first(checkpoints: &mut [Checkpoint]) {
    checkpoints.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

async fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> CheckpointResult<T> {
    let content = fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&content)?)
}

fn is_safe_component(value: &str) -> bool {
    !value.is_empty()
        && value != "."
        && value != ".."
        && !value.contains(['/', '\\', '\0'])
}

fn validate_session_name(session_name: &str) -> CheckpointResult<()> {
    if is_safe_component(session_name) {
        Ok(())
    } else {
        Err(CheckpointError::InvalidSessionName {
            session: session_name.to_string(),
        })
    }
}

fn validate_checkpoint_id(checkpoint_id: &str) -> CheckpointResult<()> {
    if is_safe_component(checkpoint_id) {
        Ok(())
    } else {
        Err(CheckpointError::InvalidCheckpointId {
            checkpoint_id: checkpoint_id.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkpoint::{GitState, PaneState, SessionState};
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use tempfile::TempDir;

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 10, 9, 0, 0).unwrap()
    }

    fn create_test_checkpoint(session: &str, id: &str, created_at: DateTime<Utc>) -> Checkpoint {
        Checkpoint {
            id: id.to_string(),
            name: "test".to_string(),
            description: "Test checkpoint".to_string(),
            session_name: session.to_string(),
            working_dir: "/tmp/test".to_string(),
            created_at,
            session: SessionState {
                panes: vec![
                    PaneState {
                        index: 0,
                        id: "%0".to_string(),
                        title: "proj__cc_1".to_string(),
                        ..PaneState::default()
                    },
                    PaneState {
                        index: 1,
                        id: "%1".to_string(),
                        title: "proj__cod_1".to_string(),
                        ..PaneState::default()
                    },
                ],
                layout: "tiled".to_string(),
                active_pane_index: 1,
            },
            git: None,
            pane_count: 2,
        }
    }

    #[tokio::test]
    async fn test_save_creates_layout() {
        let temp_dir = TempDir::new().unwrap();
        let storage = Storage::new(temp_dir.path());
        let cp = create_test_checkpoint("proj", "20260110-090000.000-test", base_time());

        storage.save(&cp).await.unwrap();

        let dir = temp_dir.path().join("proj").join(&cp.id);
        assert!(dir.join(METADATA_FILE).is_file());
        assert!(dir.join(SESSION_FILE).is_file());
        assert!(dir.join(PANES_DIR).is_dir());
        assert!(!dir.join(GIT_PATCH_FILE).exists());

        let session: SessionState =
            serde_json::from_str(&std::fs::read_to_string(dir.join(SESSION_FILE)).unwrap())
                .unwrap();
        assert_eq!(session, cp.session);
    }

    #[tokio::test]
    async fn test_save_and_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let storage = Storage::new(temp_dir.path());
        let mut cp = create_test_checkpoint("proj", "20260110-090000.000-test", base_time());
        cp.git = Some(GitState {
            branch: "main".to_string(),
            commit: "abc123def456".to_string(),
            is_dirty: true,
            patch_file: GIT_PATCH_FILE.to_string(),
            staged_count: 1,
            unstaged_count: 2,
            untracked_count: 0,
        });

        storage.save(&cp).await.unwrap();
        let loaded = storage.load("proj", &cp.id).await.unwrap();

        assert_eq!(loaded, cp);
    }

    #[tokio::test]
    async fn test_load_missing_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let storage = Storage::new(temp_dir.path());

        let result = storage.load("proj", "nope").await;
        assert!(matches!(result, Err(CheckpointError::CheckpointNotFound { .. })));
    }

    #[tokio::test]
    async fn test_load_corrupt_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let storage = Storage::new(temp_dir.path());
        let dir = temp_dir.path().join("proj").join("broken");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(METADATA_FILE), "{not json").unwrap();

        let result = storage.load("proj", "broken").await;
        assert!(matches!(result, Err(CheckpointError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let temp_dir = TempDir::new().unwrap();
        let storage = Storage::new(temp_dir.path());

        for (offset, id) in [(2, "b"), (0, "a"), (5, "c"), (1, "d")] {
            let cp = create_test_checkpoint("proj", id, base_time() + Duration::minutes(offset));
            storage.save(&cp).await.unwrap();
        }

        let checkpoints = storage.list("proj").await.unwrap();
        let ids: Vec<&str> = checkpoints.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "d", "a"]);
        for pair in checkpoints.windows(2) {
            assert!(pair[0].created_at > pair[1].created_at);
        }
    }

    #[tokio::test]
    async fn test_list_skips_corrupt_checkpoint() {
        let temp_dir = TempDir::new().unwrap();
        let storage = Storage::new(temp_dir.path());

        storage
            .save(&create_test_checkpoint("proj", "one", base_time()))
            .await
            .unwrap();
        storage
            .save(&create_test_checkpoint("proj", "two", base_time() + Duration::seconds(1)))
            .await
            .unwrap();

        let corrupt = temp_dir.path().join("proj").join("corrupt");
        std::fs::create_dir_all(&corrupt).unwrap();
        std::fs::write(corrupt.join(METADATA_FILE), "garbage").unwrap();
        std::fs::create_dir_all(temp_dir.path().join("proj").join("empty")).unwrap();
        std::fs::write(temp_dir.path().join("proj").join("stray.txt"), "x").unwrap();

        let checkpoints = storage.list("proj").await.unwrap();
        let ids: Vec<&str> = checkpoints.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["two", "one"]);
    }

    #[tokio::test]
    async fn test_list_nonexistent_session_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let storage = Storage::new(temp_dir.path().join("never-created"));

        assert!(storage.list("ghost").await.unwrap().is_empty());
        assert!(storage.list_all().await.unwrap().is_empty());
        assert!(storage.list_sessions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_all_merges_sessions() {
        let temp_dir = TempDir::new().unwrap();
        let storage = Storage::new(temp_dir.path());

        storage
            .save(&create_test_checkpoint("alpha", "a1", base_time()))
            .await
            .unwrap();
        storage
            .save(&create_test_checkpoint("beta", "b1", base_time() + Duration::seconds(10)))
            .await
            .unwrap();
        storage
            .save(&create_test_checkpoint("alpha", "a2", base_time() + Duration::seconds(20)))
            .await
            .unwrap();

        let all = storage.list_all().await.unwrap();
        let ids: Vec<&str> = all.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a2", "b1", "a1"]);
        assert_eq!(
            storage.list_sessions().await.unwrap(),
            vec!["alpha".to_string(), "beta".to_string()]
        );
    }

    #[tokio::test]
    async fn test_delete_and_exists() {
        let temp_dir = TempDir::new().unwrap();
        let storage = Storage::new(temp_dir.path());
        let cp = create_test_checkpoint("proj", "to-delete", base_time());
        storage.save(&cp).await.unwrap();
        storage
            .save_scrollback("proj", &cp.id, 0, "line one\nline two\n")
            .await
            .unwrap();

        assert!(storage.exists("proj", &cp.id).await);
        storage.delete("proj", &cp.id).await.unwrap();
        assert!(!storage.exists("proj", &cp.id).await);

        // deleting again is not an error
        storage.delete("proj", &cp.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_exists_requires_directory() {
        let temp_dir = TempDir::new().unwrap();
        let storage = Storage::new(temp_dir.path());
        std::fs::create_dir_all(temp_dir.path().join("proj")).unwrap();
        std::fs::write(temp_dir.path().join("proj").join("file-not-dir"), "x").unwrap();

        assert!(!storage.exists("proj", "file-not-dir").await);
        assert!(!storage.exists("proj", "missing").await);
    }

    #[tokio::test]
    async fn test_get_latest() {
        let temp_dir = TempDir::new().unwrap();
        let storage = Storage::new(temp_dir.path());

        let result = storage.get_latest("proj").await;
        assert!(matches!(result, Err(CheckpointError::NoCheckpoints { .. })));

        storage
            .save(&create_test_checkpoint("proj", "old", base_time()))
            .await
            .unwrap();
        storage
            .save(&create_test_checkpoint("proj", "new", base_time() + Duration::hours(1)))
            .await
            .unwrap();

        assert_eq!(storage.get_latest("proj").await.unwrap().id, "new");
    }

    #[tokio::test]
    async fn test_scrollback_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let storage = Storage::new(temp_dir.path());
        let cp = create_test_checkpoint("proj", "cp", base_time());
        storage.save(&cp).await.unwrap();

        let rel = storage
            .save_scrollback("proj", "cp", 3, "hello\nworld\n")
            .await
            .unwrap();
        assert_eq!(rel, "panes/pane_3.txt");
        assert!(temp_dir.path().join("proj/cp/panes/pane_3.txt").is_file());

        let content = storage.load_scrollback("proj", "cp", 3).await.unwrap();
        assert_eq!(content, "hello\nworld\n");
    }

    #[tokio::test]
    async fn test_git_patch_and_status() {
        let temp_dir = TempDir::new().unwrap();
        let storage = Storage::new(temp_dir.path());
        let cp = create_test_checkpoint("proj", "cp", base_time());
        storage.save(&cp).await.unwrap();

        assert_eq!(storage.load_git_patch("proj", "cp").await.unwrap(), None);

        storage.save_git_patch("proj", "cp", "").await.unwrap();
        assert!(!storage.git_patch_path("proj", "cp").unwrap().exists());

        let patch = "diff --git a/f b/f\n+added\n";
        storage.save_git_patch("proj", "cp", patch).await.unwrap();
        assert_eq!(
            storage.load_git_patch("proj", "cp").await.unwrap().as_deref(),
            Some(patch)
        );

        storage
            .save_git_status("proj", "cp", "On branch main\n")
            .await
            .unwrap();
        let status_path = temp_dir.path().join("proj/cp").join(GIT_STATUS_FILE);
        assert_eq!(std::fs::read_to_string(status_path).unwrap(), "On branch main\n");
    }

    #[tokio::test]
    async fn test_rejects_path_traversal() {
        let temp_dir = TempDir::new().unwrap();
        let storage = Storage::new(temp_dir.path());

        assert!(matches!(
            storage.load("proj", "../other").await,
            Err(CheckpointError::InvalidCheckpointId { .. })
        ));
        assert!(matches!(
            storage.list("..").await,
            Err(CheckpointError::InvalidSessionName { .. })
        ));
        assert!(matches!(
            storage.delete("proj", "").await,
            Err(CheckpointError::InvalidCheckpointId { .. })
        ));
        assert!(!storage.exists("proj", "..").await);
    }
}
