//! TOML configuration parsing and management.

use super::environment::EnvironmentOverrides;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Application directory name under the user's config and data dirs
pub const APP_DIR_NAME: &str = "mux-checkpoint";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckpointConfig {
    pub storage: StorageConfig,
    pub capture: CaptureConfig,
    pub auto: AutoConfig,
    pub commands: CommandsConfig,
    pub logging: LoggingConfig,
}

/// Where checkpoints are stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Base directory; `~` and `$VAR` are expanded
    pub base_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_dir: format!("~/.local/share/{}/checkpoints", APP_DIR_NAME),
        }
    }
}

/// Manual checkpoint capture defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub scrollback_lines: usize,
    pub capture_git: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            scrollback_lines: 1000,
            capture_git: true,
        }
    }
}

/// Auto-checkpoint defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoConfig {
    /// Auto-checkpoints kept per session; 0 disables rotation
    pub max_checkpoints: usize,
    pub scrollback_lines: usize,
    pub include_git: bool,
}

impl Default for AutoConfig {
    fn default() -> Self {
        Self {
            max_checkpoints: 10,
            scrollback_lines: 500,
            include_git: true,
        }
    }
}

/// External command settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandsConfig {
    pub timeout_seconds: u64,
    pub tmux_binary: String,
    pub git_binary: String,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            tmux_binary: "tmux".to_string(),
            git_binary: "git".to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter directive, e.g. `info` or `mux_checkpoint=debug`
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl CheckpointConfig {
    /// Apply environment overrides; they win over file values.
    pub fn apply_overrides(&mut self, overrides: &EnvironmentOverrides) {
        if let Some(dir) = &overrides.base_dir {
            self.storage.base_dir = dir.clone();
        }
        if let Some(lines) = overrides.scrollback_lines {
            self.capture.scrollback_lines = lines;
        }
        if let Some(level) = &overrides.log_level {
            self.logging.level = level.clone();
        }
    }

    /// Check values that would make capture impossible.
    pub fn validate(&self) -> Result<()> {
        if self.storage.base_dir.trim().is_empty() {
            bail!("storage.base_dir must not be empty");
        }
        if self.capture.scrollback_lines == 0 {
            bail!("capture.scrollback_lines must be greater than zero");
        }
        if self.commands.timeout_seconds == 0 {
            bail!("commands.timeout_seconds must be greater than zero");
        }
        if self.commands.tmux_binary.trim().is_empty() || self.commands.git_binary.trim().is_empty() {
            bail!("commands.tmux_binary and commands.git_binary must not be empty");
        }
        Ok(())
    }

    /// Base directory with `~` and environment variables expanded.
    pub fn resolved_base_dir(&self) -> Result<PathBuf> {
        expand_path(&self.storage.base_dir)
    }
}

/// Expand `~` and `$VAR` in a path string.
pub fn expand_path(path: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(path)
        .with_context(|| format!("Failed to expand path: {}", path))?;
    Ok(PathBuf::from(expanded.as_ref()))
}

/// Default config file location (`<config dir>/mux-checkpoint/config.toml`)
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
        .join("config.toml")
}

/// Configuration loader
#[derive(Debug, Clone)]
pub struct ConfigurationLoader {
    pub config_path: PathBuf,
    pub config: CheckpointConfig,
}

impl ConfigurationLoader {
    /// Initialize configuration loader.
    ///
    /// # Arguments
    /// * `config_path` - Path to TOML config file. If None, uses the default
    ///   location. A missing file yields the default configuration.
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let config_path = config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(default_config_path);

        let config = if config_path.exists() {
            Self::load_config(&config_path)?
        } else {
            tracing::debug!(path = %config_path.display(), "config file not found, using defaults");
            CheckpointConfig::default()
        };

        Ok(Self {
            config_path,
            config,
        })
    }

    /// Create a configuration loader from a pre-parsed configuration.
    pub fn from_config(config: CheckpointConfig) -> Self {
        Self {
            config_path: default_config_path(),
            config,
        }
    }

    /// Load configuration from TOML file.
    fn load_config(path: &Path) -> Result<CheckpointConfig> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
    }

    /// Get configuration value by dot-notation key.
    pub fn get_string(&self, key: &str) -> Option<String> {
        match key {
            "storage.base_dir" => Some(self.config.storage.base_dir.clone()),
            "commands.tmux_binary" => Some(self.config.commands.tmux_binary.clone()),
            "commands.git_binary" => Some(self.config.commands.git_binary.clone()),
            "logging.level" => Some(self.config.logging.level.clone()),
            _ => None,
        }
    }

    /// Get numeric configuration value.
    pub fn get_u64(&self, key: &str) -> Option<u64> {
        match key {
            "capture.scrollback_lines" => Some(self.config.capture.scrollback_lines as u64),
            "auto.max_checkpoints" => Some(self.config.auto.max_checkpoints as u64),
            "auto.scrollback_lines" => Some(self.config.auto.scrollback_lines as u64),
            "commands.timeout_seconds" => Some(self.config.commands.timeout_seconds),
            _ => None,
        }
    }

    /// Get boolean configuration value.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match key {
            "capture.capture_git" => Some(self.config.capture.capture_git),
            "auto.include_git" => Some(self.config.auto.include_git),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = CheckpointConfig::default();
        assert_eq!(config.storage.base_dir, "~/.local/share/mux-checkpoint/checkpoints");
        assert_eq!(config.capture.scrollback_lines, 1000);
        assert!(config.capture.capture_git);
        assert_eq!(config.auto.max_checkpoints, 10);
        assert_eq!(config.auto.scrollback_lines, 500);
        assert!(config.auto.include_git);
        assert_eq!(config.commands.timeout_seconds, 30);
        assert_eq!(config.commands.tmux_binary, "tmux");
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let loader = ConfigurationLoader::new(Some(&temp.path().join("absent.toml"))).unwrap();
        assert_eq!(loader.config, CheckpointConfig::default());
    }

    #[test]
    fn test_partial_toml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            r#"
[storage]
base_dir = "/var/tmp/checkpoints"

[auto]
max_checkpoints = 3
"#,
        )
        .unwrap();

        let loader = ConfigurationLoader::new(Some(&path)).unwrap();
        assert_eq!(loader.config.storage.base_dir, "/var/tmp/checkpoints");
        assert_eq!(loader.config.auto.max_checkpoints, 3);
        // unspecified keys keep their defaults
        assert_eq!(loader.config.auto.scrollback_lines, 500);
        assert_eq!(loader.config.capture.scrollback_lines, 1000);
        assert_eq!(loader.get_u64("auto.max_checkpoints"), Some(3));
        assert_eq!(loader.get_bool("auto.include_git"), Some(true));
        assert_eq!(loader.get_string("unknown.key"), None);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[capture\nscrollback_lines = ").unwrap();

        let err = ConfigurationLoader::new(Some(&path)).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse TOML config"));
    }

    #[test]
    fn test_overrides_win() {
        let mut config = CheckpointConfig::default();
        config.apply_overrides(&EnvironmentOverrides {
            base_dir: Some("/srv/cp".to_string()),
            scrollback_lines: Some(42),
            log_level: None,
        });
        assert_eq!(config.storage.base_dir, "/srv/cp");
        assert_eq!(config.capture.scrollback_lines, 42);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let mut config = CheckpointConfig::default();
        config.capture.scrollback_lines = 0;
        assert!(config.validate().is_err());

        let mut config = CheckpointConfig::default();
        config.commands.timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_expand_path() {
        assert_eq!(expand_path("/abs/path").unwrap(), PathBuf::from("/abs/path"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_path("~/cp").unwrap(), home.join("cp"));
        }
        assert!(expand_path("$MUX_CHECKPOINT_SURELY_UNSET_VAR/x").is_err());
    }
}
