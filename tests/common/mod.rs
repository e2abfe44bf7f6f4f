//! In-memory collaborators shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use mux_checkpoint::checkpoint::{
    Checkpoint, CheckpointError, CheckpointResult, Multiplexer, PaneInfo, PaneState,
    SessionState, Storage, VcsInspector, GIT_STATUS_FILE,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Multiplexer serving one fixed session
pub struct FakeMultiplexer {
    pub session: String,
    pub panes: Vec<PaneInfo>,
    /// Scrollback per capture target; a missing target fails to capture
    pub scrollback: HashMap<String, String>,
    pub working_dir: Option<String>,
    pub layout: Option<String>,
    pub fail_list_panes: bool,
    pub captured: Arc<Mutex<Vec<(String, usize)>>>,
}

impl FakeMultiplexer {
    /// Session with two panes; pane 1 is active
    pub fn new(session: &str) -> Self {
        let panes = vec![
            PaneInfo {
                window_index: 0,
                index: 0,
                id: "%0".to_string(),
                title: format!("{}__cc_1", session),
                agent_type: "cc".to_string(),
                command: "claude".to_string(),
                width: 120,
                height: 40,
                active: false,
            },
            PaneInfo {
                window_index: 0,
                index: 1,
                id: "%1".to_string(),
                title: format!("{}__cod_1", session),
                agent_type: "cod".to_string(),
                command: "codex".to_string(),
                width: 80,
                height: 40,
                active: true,
            },
        ];
        let scrollback = HashMap::from([
            ("%0".to_string(), "line one\nline two\nline three".to_string()),
            ("%1".to_string(), "$ cargo test\nok".to_string()),
        ]);

        Self {
            session: session.to_string(),
            panes,
            scrollback,
            working_dir: None,
            layout: Some("b25f,200x50,0,0{120x50,0,0,0,79x50,121,0,1}".to_string()),
            fail_list_panes: false,
            captured: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a pane in a second window; its tmux index restarts at 0
    pub fn with_second_window(mut self) -> Self {
        self.panes.push(PaneInfo {
            window_index: 1,
            index: 0,
            id: "%5".to_string(),
            title: "logs".to_string(),
            command: "tail".to_string(),
            width: 200,
            height: 50,
            ..PaneInfo::default()
        });
        self.scrollback
            .insert("%5".to_string(), "window two output".to_string());
        self
    }

    pub fn with_working_dir(mut self, dir: &Path) -> Self {
        self.working_dir = Some(dir.to_string_lossy().to_string());
        self
    }

    pub fn captured(&self) -> Vec<(String, usize)> {
        self.captured.lock().unwrap().clone()
    }
}

#[async_trait]
impl Multiplexer for FakeMultiplexer {
    async fn session_exists(&self, session: &str) -> bool {
        session == self.session
    }

    async fn list_panes(&self, _session: &str) -> CheckpointResult<Vec<PaneInfo>> {
        if self.fail_list_panes {
            return Err(CheckpointError::multiplexer("list-panes: server exited"));
        }
        Ok(self.panes.clone())
    }

    async fn capture_scrollback(&self, target: &str, max_lines: usize) -> CheckpointResult<String> {
        self.captured
            .lock()
            .unwrap()
            .push((target.to_string(), max_lines));
        self.scrollback
            .get(target)
            .cloned()
            .ok_or_else(|| CheckpointError::multiplexer(format!("can't find pane: {}", target)))
    }

    async fn working_directory(&self, _session: &str) -> CheckpointResult<String> {
        self.working_dir
            .clone()
            .ok_or_else(|| CheckpointError::multiplexer("no current path"))
    }

    async fn layout_descriptor(&self, _session: &str) -> CheckpointResult<String> {
        self.layout
            .clone()
            .ok_or_else(|| CheckpointError::multiplexer("no layout"))
    }
}

/// Version control with canned answers
pub struct FakeVcs {
    pub repository: bool,
    pub branch: String,
    pub commit: String,
    pub porcelain: String,
    pub diff: String,
    pub full_status: String,
    pub fail_branch: bool,
    /// When set, `full_status` puts a directory where each checkpoint under
    /// this session directory would get its `git-status.txt`
    pub block_status_file: Option<PathBuf>,
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl FakeVcs {
    pub fn clean() -> Self {
        Self {
            repository: true,
            branch: "main".to_string(),
            commit: "0123456789abcdef0123456789abcdef01234567".to_string(),
            porcelain: String::new(),
            diff: String::new(),
            full_status: "On branch main\nnothing to commit, working tree clean\n".to_string(),
            fail_branch: false,
            block_status_file: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// One staged, one unstaged and one untracked file
    pub fn dirty() -> Self {
        Self {
            porcelain: "M  src/lib.rs\n M README.md\n?? notes.txt\n".to_string(),
            diff: "diff --git a/src/lib.rs b/src/lib.rs\n+// change\n".to_string(),
            full_status: "On branch main\nChanges to be committed:\n\tmodified: src/lib.rs\n"
                .to_string(),
            ..Self::clean()
        }
    }

    pub fn not_a_repository() -> Self {
        Self {
            repository: false,
            ..Self::clean()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }
}

#[async_trait]
impl VcsInspector for FakeVcs {
    async fn is_repository(&self, _path: &Path) -> bool {
        self.record("is_repository");
        self.repository
    }

    async fn current_branch(&self, _path: &Path) -> CheckpointResult<String> {
        self.record("current_branch");
        if self.fail_branch {
            return Err(CheckpointError::git("rev-parse --abbrev-ref HEAD: exit status 128"));
        }
        Ok(format!("{}\n", self.branch))
    }

    async fn current_commit(&self, _path: &Path) -> CheckpointResult<String> {
        self.record("current_commit");
        Ok(format!("{}\n", self.commit))
    }

    async fn porcelain_status(&self, _path: &Path) -> CheckpointResult<String> {
        self.record("porcelain_status");
        Ok(self.porcelain.clone())
    }

    async fn diff_against_head(&self, _path: &Path) -> CheckpointResult<String> {
        self.record("diff_against_head");
        Ok(self.diff.clone())
    }

    async fn full_status(&self, _path: &Path) -> CheckpointResult<String> {
        self.record("full_status");
        if let Some(session_dir) = &self.block_status_file {
            for entry in std::fs::read_dir(session_dir).unwrap() {
                std::fs::create_dir(entry.unwrap().path().join(GIT_STATUS_FILE)).unwrap();
            }
        }
        Ok(self.full_status.clone())
    }
}

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2020, 3, 1, 12, 0, 0).unwrap()
}

/// Checkpoint record saved straight to storage, bypassing capture
pub fn stored_checkpoint(
    session: &str,
    name: &str,
    description: &str,
    minutes_after_base: i64,
) -> Checkpoint {
    let created_at = base_time() + Duration::minutes(minutes_after_base);
    let id = mux_checkpoint::checkpoint::generate_id_at(name, created_at);
    Checkpoint {
        id,
        name: name.to_string(),
        description: description.to_string(),
        session_name: session.to_string(),
        working_dir: "/work".to_string(),
        created_at,
        session: SessionState {
            panes: vec![PaneState {
                index: 0,
                id: "%0".to_string(),
                ..PaneState::default()
            }],
            layout: String::new(),
            active_pane_index: 0,
        },
        git: None,
        pane_count: 1,
    }
}

/// Save `names` in order, one minute apart, so the last one is newest
pub async fn seed(storage: &Storage, session: &str, names: &[&str]) -> Vec<Checkpoint> {
    let mut saved = Vec::new();
    for (i, name) in names.iter().enumerate() {
        let cp = stored_checkpoint(session, name, "", i as i64);
        storage.save(&cp).await.unwrap();
        saved.push(cp);
    }
    saved
}
