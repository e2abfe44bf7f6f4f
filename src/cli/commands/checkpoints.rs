//! Checkpoint inspection commands: list, show and delete

use crate::checkpoint::{Checkpoint, AGENT_USER};
use crate::cli::context::CliContext;
use crate::cli::error::CliResult;
use crate::cli::utils::{checkpoint_table, confirm, format_time_ago};
use colored::*;
use serde_json::json;

/// List checkpoints options
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub session: Option<String>,
}

/// Show checkpoint options
#[derive(Debug, Clone)]
pub struct ShowOptions {
    pub session: String,
    pub reference: String,
}

/// Delete checkpoint options
#[derive(Debug, Clone)]
pub struct DeleteOptions {
    pub session: String,
    pub reference: String,
    pub force: bool,
}

/// List checkpoints of one session, or of every session
pub async fn list_checkpoints(ctx: &CliContext, opts: ListOptions) -> CliResult<()> {
    match opts.session {
        Some(session) => list_session(ctx, &session).await,
        None => list_all(ctx).await,
    }
}

async fn list_session(ctx: &CliContext, session: &str) -> CliResult<()> {
    let checkpoints = ctx.capturer().list(session).await?;

    if ctx.json {
        return ctx.print_json(&json!({
            "session": session,
            "checkpoints": checkpoints,
            "count": checkpoints.len(),
        }));
    }

    if checkpoints.is_empty() {
        println!("No checkpoints for session {:?}.", session);
        return Ok(());
    }

    println!("{}", format!("Checkpoints for {}", session).bold());
    println!("{}", checkpoint_table(&checkpoints));
    Ok(())
}

async fn list_all(ctx: &CliContext) -> CliResult<()> {
    let sessions = ctx.storage().list_sessions().await?;

    let mut grouped = Vec::new();
    for session in sessions {
        let checkpoints = ctx.storage().list(&session).await?;
        if !checkpoints.is_empty() {
            grouped.push((session, checkpoints));
        }
    }

    if ctx.json {
        let sessions: Vec<_> = grouped
            .iter()
            .map(|(session, checkpoints)| json!({ "session": session, "checkpoints": checkpoints }))
            .collect();
        return ctx.print_json(&json!({ "sessions": sessions, "count": grouped.len() }));
    }

    if grouped.is_empty() {
        println!("No checkpoints found.");
        return Ok(());
    }

    for (session, checkpoints) in &grouped {
        println!(
            "{} ({} checkpoint(s))",
            session.cyan().bold(),
            checkpoints.len()
        );
        println!("{}", checkpoint_table(checkpoints));
    }
    Ok(())
}

/// Show one checkpoint in detail
pub async fn show_checkpoint(ctx: &CliContext, opts: ShowOptions) -> CliResult<Checkpoint> {
    let cp = ctx
        .capturer()
        .parse_checkpoint_ref(&opts.session, &opts.reference)
        .await?;

    if ctx.json {
        ctx.print_json(&cp)?;
        return Ok(cp);
    }

    println!("{}", format!("Checkpoint: {}", cp.id).bold());
    if !cp.name.is_empty() {
        println!("  Name: {}", cp.name);
    }
    println!("  Session: {}", cp.session_name);
    println!(
        "  Created: {} ({})",
        cp.created_at.to_rfc3339(),
        format_time_ago(cp.created_at)
    );
    println!("  Working Dir: {}", cp.working_dir);
    if !cp.description.is_empty() {
        println!("  Description: {}", cp.description);
    }

    println!();
    println!("  {}", format!("Panes ({}):", cp.session.panes.len()).bold());
    for pane in &cp.session.panes {
        let marker = if pane.index == cp.session.active_pane_index { "*" } else { " " };
        let scrollback = if pane.scrollback_lines > 0 {
            format!(" [{} lines]", pane.scrollback_lines)
        } else {
            String::new()
        };
        let agent = if pane.agent_type.is_empty() {
            AGENT_USER
        } else {
            pane.agent_type.as_str()
        };
        println!(
            "   {}{}: {} [{}] ({}) {}x{} window {}.{}{}",
            marker,
            pane.index,
            pane.title,
            agent,
            pane.command,
            pane.width,
            pane.height,
            pane.window_index,
            pane.window_pane_index,
            scrollback
        );
    }

    if let Some(git) = &cp.git {
        println!();
        println!("  {}", "Git State:".bold());
        println!("    Branch: {}", git.branch);
        println!("    Commit: {}", git.commit);
        if git.is_dirty {
            println!(
                "    Status: {} ({} staged, {} unstaged, {} untracked)",
                "dirty".yellow(),
                git.staged_count,
                git.unstaged_count,
                git.untracked_count
            );
            if cp.has_git_patch() {
                println!("    Patch: captured");
            }
        } else {
            println!("    Status: {}", "clean".green());
        }
    }

    Ok(cp)
}

/// Delete one checkpoint. Returns false if the user declined.
pub async fn delete_checkpoint(ctx: &CliContext, opts: DeleteOptions) -> CliResult<bool> {
    let cp = ctx
        .capturer()
        .parse_checkpoint_ref(&opts.session, &opts.reference)
        .await?;

    if !opts.force && !ctx.json && !confirm(&format!("Delete checkpoint {}?", cp.id))? {
        println!("Aborted.");
        return Ok(false);
    }

    ctx.storage().delete(&opts.session, &cp.id).await?;
    tracing::info!(session = %opts.session, checkpoint_id = %cp.id, "checkpoint deleted");

    if ctx.json {
        ctx.print_json(&json!({
            "deleted": true,
            "session": opts.session,
            "id": cp.id,
        }))?;
    } else {
        println!("{} Deleted checkpoint: {}", "✓".green(), cp.id);
    }
    Ok(true)
}
