//! Environment variable loading and management.

use std::env;
use std::path::Path;

/// Overrides the checkpoint base directory
pub const ENV_BASE_DIR: &str = "MUX_CHECKPOINT_DIR";
/// Overrides `capture.scrollback_lines`
pub const ENV_SCROLLBACK: &str = "MUX_CHECKPOINT_SCROLLBACK";
/// Overrides `logging.level`
pub const ENV_LOG_LEVEL: &str = "MUX_CHECKPOINT_LOG";

/// Configuration values taken from the environment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentOverrides {
    pub base_dir: Option<String>,
    pub scrollback_lines: Option<usize>,
    pub log_level: Option<String>,
}

/// Loads environment variables from .env file and system environment.
#[derive(Debug, Clone)]
pub struct EnvironmentLoader {
    env_file: Option<String>,
}

impl EnvironmentLoader {
    /// Initialize the environment loader.
    ///
    /// # Arguments
    /// * `env_file` - Path to a .env file. Nothing is loaded when `None`.
    pub fn new(env_file: Option<&Path>) -> Self {
        // Only an explicit path is loaded, so a stray .env in the working
        // directory never changes where checkpoints go.
        if let Some(path) = env_file {
            if path.exists() {
                if let Err(e) = dotenv::from_path(path) {
                    tracing::warn!(path = %path.display(), error = %e, "failed to load .env file");
                }
            }
        }

        Self {
            env_file: env_file.map(|p| p.to_string_lossy().to_string()),
        }
    }

    pub fn env_file(&self) -> Option<&str> {
        self.env_file.as_deref()
    }

    pub fn base_dir(&self) -> Option<String> {
        non_empty_var(ENV_BASE_DIR)
    }

    /// Scrollback line count; unparseable or zero values are ignored.
    pub fn scrollback_lines(&self) -> Option<usize> {
        let raw = non_empty_var(ENV_SCROLLBACK)?;
        match raw.trim().parse::<usize>() {
            Ok(lines) if lines > 0 => Some(lines),
            _ => {
                tracing::warn!(variable = ENV_SCROLLBACK, value = %raw, "ignoring invalid scrollback override");
                None
            }
        }
    }

    pub fn log_level(&self) -> Option<String> {
        non_empty_var(ENV_LOG_LEVEL)
    }

    pub fn overrides(&self) -> EnvironmentOverrides {
        EnvironmentOverrides {
            base_dir: self.base_dir(),
            scrollback_lines: self.scrollback_lines(),
            log_level: self.log_level(),
        }
    }
}

impl Default for EnvironmentLoader {
    fn default() -> Self {
        Self::new(None)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}
