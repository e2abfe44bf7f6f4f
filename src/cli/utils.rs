//! Shared formatting helpers for CLI commands

use crate::checkpoint::Checkpoint;
use chrono::{DateTime, Utc};
use colored::*;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use std::io::{self, Write};

/// Display a user-friendly error message with suggestions
pub fn display_error_with_suggestions<E: std::fmt::Display>(error: &E, context: &str) {
    eprintln!("{} {}", "Error:".red().bold(), context);
    eprintln!("   {}", error.to_string().red());

    let error_str = error.to_string().to_lowercase();
    if error_str.contains("permission denied") {
        eprintln!("{}", "Suggestions:".blue());
        eprintln!("   • Check permissions of the checkpoint directory");
        eprintln!("   • Point storage.base_dir or MUX_CHECKPOINT_DIR somewhere writable");
    } else if error_str.contains("tmux") && error_str.contains("no server") {
        eprintln!("{}", "Suggestions:".blue());
        eprintln!("   • Start tmux, or check the socket with 'tmux ls'");
    }
}

/// Truncate text with ellipsis if it exceeds max length in characters
pub fn truncate_with_ellipsis(text: &str, max_length: usize) -> String {
    if text.chars().count() <= max_length {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max_length.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Format timestamp as "X time ago"
pub fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    format_time_ago_from(timestamp, Utc::now())
}

pub fn format_time_ago_from(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let duration = now.signed_duration_since(timestamp);

    if duration.num_days() > 0 {
        format!("{}d ago", duration.num_days())
    } else if duration.num_hours() > 0 {
        format!("{}h ago", duration.num_hours())
    } else if duration.num_minutes() > 0 {
        format!("{}m ago", duration.num_minutes())
    } else {
        "just now".to_string()
    }
}

/// First 8 characters of a commit hash
pub fn short_commit(commit: &str) -> &str {
    match commit.char_indices().nth(8) {
        Some((idx, _)) => &commit[..idx],
        None => commit,
    }
}

/// Table of checkpoints, newest first, with `~N` positions
pub fn checkpoint_table(checkpoints: &[Checkpoint]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["#", "ID", "Age", "Panes", "Git", "Description"]);

    for (position, cp) in checkpoints.iter().enumerate() {
        let git = match &cp.git {
            Some(git) if git.is_dirty => format!("{} (dirty)", git.branch),
            Some(git) => git.branch.clone(),
            None => String::new(),
        };
        table.add_row(vec![
            format!("~{}", position + 1),
            cp.id.clone(),
            format_time_ago(cp.created_at),
            cp.pane_count.to_string(),
            git,
            truncate_with_ellipsis(&cp.description, 40),
        ]);
    }

    table
}

/// Ask a yes/no question on stdin; anything but `y`/`yes` means no.
pub fn confirm(question: &str) -> io::Result<bool> {
    print!("{} [y/N]: ", question);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let answer = input.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}
