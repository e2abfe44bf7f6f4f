//! git command-line inspector

use crate::checkpoint::{CheckpointError, CheckpointResult, VcsInspector};
use crate::executor::CommandExecutor;
use async_trait::async_trait;
use std::path::Path;

/// Reads repository state through the `git` binary. Every command runs
/// with `-C <dir>`, so the executor's own working directory is unused.
#[derive(Debug, Clone)]
pub struct GitCli {
    binary: String,
    executor: CommandExecutor,
}

impl GitCli {
    pub fn new<S: Into<String>>(binary: S, executor: CommandExecutor) -> Self {
        Self {
            binary: binary.into(),
            executor,
        }
    }

    /// Run `git -C <dir> <args>` and return stdout untouched
    async fn run(&self, dir: &Path, args: &[&str]) -> CheckpointResult<String> {
        let dir_arg = dir.to_string_lossy();
        let mut argv = vec!["-C", dir_arg.as_ref()];
        argv.extend_from_slice(args);

        self.executor
            .output(&self.binary, &argv)
            .await
            .map_err(|e| CheckpointError::git(format!("git {}: {:#}", args.join(" "), e)))
    }
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new("git", CommandExecutor::default())
    }
}

#[async_trait]
impl VcsInspector for GitCli {
    async fn is_repository(&self, path: &Path) -> bool {
        if self.run(path, &["rev-parse", "--git-dir"]).await.is_ok() {
            return true;
        }
        tokio::fs::metadata(path.join(".git")).await.is_ok()
    }

    async fn current_branch(&self, path: &Path) -> CheckpointResult<String> {
        Ok(self
            .run(path, &["rev-parse", "--abbrev-ref", "HEAD"])
            .await?
            .trim()
            .to_string())
    }

    async fn current_commit(&self, path: &Path) -> CheckpointResult<String> {
        Ok(self.run(path, &["rev-parse", "HEAD"]).await?.trim().to_string())
    }

    async fn porcelain_status(&self, path: &Path) -> CheckpointResult<String> {
        self.run(path, &["status", "--porcelain"]).await
    }

    async fn diff_against_head(&self, path: &Path) -> CheckpointResult<String> {
        self.run(path, &["diff", "HEAD"]).await
    }

    async fn full_status(&self, path: &Path) -> CheckpointResult<String> {
        self.run(path, &["status"]).await
    }
}
