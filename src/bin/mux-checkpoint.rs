use clap::Parser;
use mux_checkpoint::cli::{self, utils::display_error_with_suggestions, Cli, CliContext};
use mux_checkpoint::observability::init_tracing;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Cli::parse();

    let config = match cli::load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            display_error_with_suggestions(&e.user_message(), "loading configuration");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_tracing(&config.logging.level) {
        eprintln!("{:#}", e);
    }

    let result = match CliContext::from_config(config, args.json) {
        Ok(ctx) => cli::dispatch(&ctx, args.command).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            display_error_with_suggestions(&e.user_message(), "command failed");
            ExitCode::FAILURE
        }
    }
}
