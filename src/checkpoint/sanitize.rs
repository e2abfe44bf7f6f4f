//! Checkpoint ID generation and filesystem-safe name handling

use chrono::{DateTime, Utc};

/// Maximum length in bytes of a sanitized name
pub const MAX_NAME_BYTES: usize = 50;

/// Millisecond-precision timestamp format used as the ID prefix
pub const ID_TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S%.3f";

/// Generate a checkpoint ID for `name` at the current time.
pub fn generate_id(name: &str) -> String {
    generate_id_at(name, Utc::now())
}

/// Generate a checkpoint ID for `name` at `at`.
///
/// The result is `<timestamp>-<sanitized name>`, or just the timestamp when
/// the name sanitizes to nothing.
pub fn generate_id_at(name: &str, at: DateTime<Utc>) -> String {
    let timestamp = at.format(ID_TIMESTAMP_FORMAT).to_string();
    let safe_name = sanitize_name(name);
    if safe_name.is_empty() {
        timestamp
    } else {
        format!("{}-{}", timestamp, safe_name)
    }
}

/// Make a name safe for use as a path component.
///
/// Surrounding whitespace is trimmed, spaces become `_`, and the characters
/// `/ \ : * ? " < > |` become `-`. The result is cut to at most
/// [`MAX_NAME_BYTES`] bytes on a character boundary. Applying it twice gives
/// the same result as applying it once.
pub fn sanitize_name(name: &str) -> String {
    let safe: String = name
        .trim()
        .chars()
        .map(|c| match c {
            ' ' => '_',
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            other => other,
        })
        .collect();

    let truncated = truncate_to_char_boundary(&safe, MAX_NAME_BYTES);
    // a cut can expose inner whitespace at the end
    truncated.trim_end().to_string()
}

/// Longest prefix of `s` that is at most `max_bytes` long and ends on a
/// character boundary.
fn truncate_to_char_boundary(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
