//! Checkpoint creation commands

use crate::checkpoint::{AutoCheckpointOptions, AutoCheckpointReason, Checkpoint, CheckpointOptions};
use crate::cli::context::CliContext;
use crate::cli::error::CliResult;
use crate::cli::utils::short_commit;
use colored::*;
use serde_json::json;

/// Save command options
#[derive(Debug, Clone)]
pub struct SaveOptions {
    pub session: String,
    pub name: String,
    pub description: String,
    pub scrollback_lines: Option<usize>,
    pub capture_git: bool,
}

/// Auto command options
#[derive(Debug, Clone)]
pub struct AutoOptions {
    pub session: String,
    pub reason: AutoCheckpointReason,
    pub context: String,
}

/// Create a checkpoint
pub async fn save(ctx: &CliContext, opts: SaveOptions) -> CliResult<Checkpoint> {
    let scrollback = opts
        .scrollback_lines
        .filter(|lines| *lines > 0)
        .unwrap_or(ctx.config.capture.scrollback_lines);
    let options = CheckpointOptions::default()
        .with_description(opts.description)
        .with_scrollback_lines(scrollback)
        .with_git_capture(opts.capture_git && ctx.config.capture.capture_git);

    let cp = ctx
        .capturer()
        .create(&opts.session, &opts.name, options)
        .await?;

    report_created(ctx, &cp, None)?;
    Ok(cp)
}

/// Create an auto-checkpoint with the configured rotation
pub async fn auto(ctx: &CliContext, opts: AutoOptions) -> CliResult<Checkpoint> {
    let auto_config = &ctx.config.auto;
    let mut options = AutoCheckpointOptions::new(&opts.session, opts.reason);
    options.description = opts.context;
    options.scrollback_lines = Some(auto_config.scrollback_lines);
    options.include_git = auto_config.include_git;
    options.max_checkpoints = Some(auto_config.max_checkpoints);

    let cp = ctx.auto_checkpointer().create(options).await?;

    report_created(ctx, &cp, Some(opts.reason))?;
    Ok(cp)
}

fn report_created(
    ctx: &CliContext,
    cp: &Checkpoint,
    reason: Option<AutoCheckpointReason>,
) -> CliResult<()> {
    if ctx.json {
        return ctx.print_json(&json!({
            "id": cp.id,
            "session": cp.session_name,
            "created_at": cp.created_at,
            "description": cp.description,
            "pane_count": cp.pane_count,
            "has_git": cp.git.is_some(),
            "reason": reason.map(|r| r.as_str()),
        }));
    }

    println!("{} Checkpoint created: {}", "✓".green(), cp.id.bold());
    println!("  Session: {}", cp.session_name);
    println!("  Panes: {}", cp.pane_count);
    if let Some(git) = &cp.git {
        println!("  Git: {} @ {}", git.branch, short_commit(&git.commit));
        if git.is_dirty {
            println!(
                "  Uncommitted: {} staged, {} unstaged, {} untracked",
                git.staged_count, git.unstaged_count, git.untracked_count
            );
        }
    }
    if !cp.description.is_empty() {
        println!("  Description: {}", cp.description);
    }
    Ok(())
}
