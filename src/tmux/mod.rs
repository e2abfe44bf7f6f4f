//! tmux command-line client

use crate::checkpoint::{
    CheckpointError, CheckpointResult, Multiplexer, PaneInfo, AGENT_CLAUDE, AGENT_CODEX,
    AGENT_GEMINI, AGENT_USER,
};
use crate::executor::CommandExecutor;
use async_trait::async_trait;
use regex::Regex;
use std::sync::OnceLock;

/// Field separator for `list-panes -F`; pane titles may contain `|` or `:`
pub const FIELD_SEPARATOR: &str = "|===|";

/// `<session>__<agent>_<n>`, optionally followed by `_<variant>` and `[tags]`
const PANE_TITLE_PATTERN: &str = r"^.+__(\w+)_\d+(?:_[A-Za-z0-9._/@:+-]+)?(?:\[[^\]]*\])?$";

/// Talks to a tmux server through the `tmux` binary
#[derive(Debug, Clone)]
pub struct TmuxClient {
    binary: String,
    executor: CommandExecutor,
}

impl TmuxClient {
    pub fn new<S: Into<String>>(binary: S, executor: CommandExecutor) -> Self {
        Self {
            binary: binary.into(),
            executor,
        }
    }

    /// Run a tmux subcommand and return its stdout
    async fn run(&self, args: &[&str]) -> CheckpointResult<String> {
        self.executor
            .output(&self.binary, args)
            .await
            .map_err(|e| CheckpointError::multiplexer(format!("tmux {}: {:#}", args.join(" "), e)))
    }

    async fn display(&self, session: &str, format: &str) -> CheckpointResult<String> {
        Ok(self
            .run(&["display-message", "-p", "-t", session, format])
            .await?
            .trim()
            .to_string())
    }
}

impl Default for TmuxClient {
    fn default() -> Self {
        Self::new("tmux", CommandExecutor::default())
    }
}

#[async_trait]
impl Multiplexer for TmuxClient {
    async fn session_exists(&self, session: &str) -> bool {
        match self
            .executor
            .execute(&self.binary, &["has-session", "-t", session], None)
            .await
        {
            Ok(result) => result.success,
            Err(e) => {
                tracing::debug!(session, error = %e, "tmux has-session failed");
                false
            }
        }
    }

    async fn list_panes(&self, session: &str) -> CheckpointResult<Vec<PaneInfo>> {
        let format = list_panes_format();
        let output = self
            .run(&["list-panes", "-s", "-t", session, "-F", &format])
            .await?;
        Ok(parse_list_panes(&output))
    }

    async fn capture_scrollback(&self, target: &str, max_lines: usize) -> CheckpointResult<String> {
        let start = format!("-{}", max_lines);
        let output = self
            .run(&["capture-pane", "-t", target, "-p", "-S", &start])
            .await?;
        Ok(output.trim_end().to_string())
    }

    async fn working_directory(&self, session: &str) -> CheckpointResult<String> {
        self.display(session, "#{pane_current_path}").await
    }

    async fn layout_descriptor(&self, session: &str) -> CheckpointResult<String> {
        self.display(session, "#{window_layout}").await
    }
}

fn list_panes_format() -> String {
    [
        "#{pane_id}",
        "#{window_index}",
        "#{pane_index}",
        "#{pane_title}",
        "#{pane_current_command}",
        "#{pane_width}",
        "#{pane_height}",
        // a pane only counts as active inside the active window
        "#{?window_active,#{pane_active},0}",
    ]
    .join(FIELD_SEPARATOR)
}

/// Parse `list-panes` output produced with [`FIELD_SEPARATOR`].
///
/// Lines with fewer than eight fields are skipped. Unparseable numbers
/// become zero.
pub fn parse_list_panes(output: &str) -> Vec<PaneInfo> {
    output
        .lines()
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let parts: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
            if parts.len() < 8 {
                return None;
            }
            Some(PaneInfo {
                id: parts[0].to_string(),
                window_index: parts[1].trim().parse().unwrap_or(0),
                index: parts[2].trim().parse().unwrap_or(0),
                title: parts[3].to_string(),
                agent_type: parse_agent_type(parts[3]).to_string(),
                command: parts[4].to_string(),
                width: parts[5].trim().parse().unwrap_or(0),
                height: parts[6].trim().parse().unwrap_or(0),
                active: parts[7].trim() == "1",
            })
        })
        .collect()
}

fn pane_title_regex() -> Option<&'static Regex> {
    static PANE_TITLE: OnceLock<Option<Regex>> = OnceLock::new();
    PANE_TITLE
        .get_or_init(|| Regex::new(PANE_TITLE_PATTERN).ok())
        .as_ref()
}

/// Agent label of a pane title such as `proj__cc_1` or `proj__cod_2_fast[review]`.
///
/// Titles that do not follow the convention, or name an unknown agent,
/// belong to the user.
pub fn parse_agent_type(title: &str) -> &'static str {
    let agent = pane_title_regex()
        .and_then(|re| re.captures(title))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str());

    match agent {
        Some(AGENT_CLAUDE) => AGENT_CLAUDE,
        Some(AGENT_CODEX) => AGENT_CODEX,
        Some(AGENT_GEMINI) => AGENT_GEMINI,
        _ => AGENT_USER,
    }
}
