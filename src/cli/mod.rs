//! Command-line front end
//!
//! A thin layer over the engine: argument parsing, configuration loading and
//! output formatting. Every operation is delegated to [`crate::checkpoint`].
//!
//! # Example
//!
//! ```rust,no_run
//! use clap::Parser;
//! use mux_checkpoint::cli::{run, Cli};
//!
//! # async fn example() -> mux_checkpoint::cli::CliResult<()> {
//! let cli = Cli::parse_from(["mux-checkpoint", "list"]);
//! run(cli).await
//! # }
//! ```

pub mod args;
pub mod commands;
pub mod context;
pub mod error;
pub mod utils;

pub use args::{Cli, Command, ReasonArg};
pub use context::CliContext;
pub use error::{CliError, CliResult};

use crate::config::{CheckpointConfig, ConfigurationLoader, EnvironmentLoader};
use commands::checkpoints::{DeleteOptions, ListOptions, ShowOptions};
use commands::save::{AutoOptions, SaveOptions};

/// Load configuration for `cli`: TOML file first, then environment overrides.
pub fn load_config(cli: &Cli) -> CliResult<CheckpointConfig> {
    let env = EnvironmentLoader::new(cli.env_file.as_deref());
    let mut loader = ConfigurationLoader::new(cli.config.as_deref())?;
    loader.config.apply_overrides(&env.overrides());
    Ok(loader.config)
}

/// Run a parsed command line with configuration loaded from disk
pub async fn run(cli: Cli) -> CliResult<()> {
    let config = load_config(&cli)?;
    let ctx = CliContext::from_config(config, cli.json)?;
    dispatch(&ctx, cli.command).await
}

/// Route a command to its handler
pub async fn dispatch(ctx: &CliContext, command: Command) -> CliResult<()> {
    match command {
        Command::Save {
            session,
            name,
            description,
            scrollback,
            no_git,
        } => {
            commands::save::save(
                ctx,
                SaveOptions {
                    session,
                    name,
                    description,
                    scrollback_lines: scrollback,
                    capture_git: !no_git,
                },
            )
            .await?;
        }
        Command::Auto {
            session,
            reason,
            context,
        } => {
            commands::save::auto(
                ctx,
                AutoOptions {
                    session,
                    reason: reason.into(),
                    context,
                },
            )
            .await?;
        }
        Command::List { session } => {
            commands::checkpoints::list_checkpoints(ctx, ListOptions { session }).await?;
        }
        Command::Show { session, reference } => {
            commands::checkpoints::show_checkpoint(ctx, ShowOptions { session, reference }).await?;
        }
        Command::Delete {
            session,
            reference,
            force,
        } => {
            commands::checkpoints::delete_checkpoint(
                ctx,
                DeleteOptions {
                    session,
                    reference,
                    force,
                },
            )
            .await?;
        }
    }
    Ok(())
}
