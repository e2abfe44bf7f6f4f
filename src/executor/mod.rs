//! External program execution with timeout handling.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;

/// Default per-command timeout in seconds
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Execution result containing command output and metadata.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub stdout: String,
    pub stderr: String,
    pub return_code: i32,
    pub success: bool,
}

impl ExecutionResult {
    /// Stdout of a successful run, or an error carrying stderr.
    pub fn into_stdout(self, program: &str) -> Result<String> {
        if self.success {
            return Ok(self.stdout);
        }
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            bail!("{} exited with status {}", program, self.return_code);
        }
        bail!("{} exited with status {}: {}", program, self.return_code, stderr)
    }
}

/// Runs programs directly (argv, no shell) with a timeout.
#[derive(Debug, Clone)]
pub struct CommandExecutor {
    timeout_seconds: u64,
    working_dir: Option<PathBuf>,
}

impl CommandExecutor {
    /// Initialize command executor.
    ///
    /// # Arguments
    /// * `timeout_seconds` - Default timeout for each command.
    /// * `working_dir` - Working directory for commands; inherits the current one if `None`.
    pub fn new(timeout_seconds: u64, working_dir: Option<&Path>) -> Self {
        Self {
            timeout_seconds,
            working_dir: working_dir.map(Path::to_path_buf),
        }
    }

    pub fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }

    /// Execute `program` with `args`.
    ///
    /// A non-zero exit status is not an error here; check
    /// [`ExecutionResult::success`]. Spawn failures and timeouts are errors.
    pub async fn execute(
        &self,
        program: &str,
        args: &[&str],
        timeout_override: Option<u64>,
    ) -> Result<ExecutionResult> {
        let timeout_secs = timeout_override.unwrap_or(self.timeout_seconds);

        let mut cmd = TokioCommand::new(program);
        cmd.args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .stdin(Stdio::null())
            .kill_on_drop(true);
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        tracing::trace!(program, ?args, "executing command");

        let output = match timeout(Duration::from_secs(timeout_secs), cmd.output()).await {
            Ok(output) => output.with_context(|| format!("Failed to execute {}", program))?,
            Err(_) => bail!("{} timed out after {} seconds", program, timeout_secs),
        };

        Ok(ExecutionResult {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            return_code: output.status.code().unwrap_or(-1),
            success: output.status.success(),
        })
    }

    /// Execute and return stdout, failing on a non-zero exit status.
    pub async fn output(&self, program: &str, args: &[&str]) -> Result<String> {
        self.execute(program, args, None).await?.into_stdout(program)
    }

    /// Get the working directory.
    pub fn working_dir(&self) -> Option<&Path> {
        self.working_dir.as_deref()
    }

    /// Set the working directory.
    pub fn set_working_dir(&mut self, working_dir: &Path) -> Result<()> {
        if !working_dir.is_dir() {
            bail!("Working directory does not exist: {}", working_dir.display());
        }
        self.working_dir = Some(working_dir.to_path_buf());
        Ok(())
    }
}

impl Default for CommandExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT_SECONDS, None)
    }
}
