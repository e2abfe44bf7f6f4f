//! Configuration management.
//!
//! Configuration is read from a TOML file and then overridden by a few
//! environment variables, optionally seeded from an explicit `.env` file.
//!
//! # Example
//!
//! ```no_run
//! use mux_checkpoint::config::{ConfigurationLoader, EnvironmentLoader};
//! use std::path::Path;
//!
//! let env = EnvironmentLoader::new(None);
//! let mut loader = ConfigurationLoader::new(Some(Path::new("mux-checkpoint.toml"))).unwrap();
//! loader.config.apply_overrides(&env.overrides());
//!
//! println!("Checkpoints in: {}", loader.config.resolved_base_dir().unwrap().display());
//! ```

pub mod config;
pub mod environment;

pub use self::config::{
    default_config_path, expand_path, AutoConfig, CaptureConfig, CheckpointConfig,
    CommandsConfig, ConfigurationLoader, LoggingConfig, StorageConfig,
};
pub use self::environment::{EnvironmentLoader, EnvironmentOverrides};
