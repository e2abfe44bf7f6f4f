//! Resolution of user-supplied checkpoint references
//!
//! A reference is matched in this order:
//!
//! 1. `last`, `latest`, `~1` or `~` (case-insensitive): the newest checkpoint
//! 2. `~N`: the Nth most recent checkpoint, 1-indexed
//! 3. an exact checkpoint ID
//! 4. a pattern: ID prefix, case-insensitive name, or `*` wildcard over the name
//!
//! A pattern must match exactly one checkpoint.

use super::{Capturer, Checkpoint, CheckpointError, CheckpointResult, Storage};

/// Resolves references against the checkpoints of a [`Storage`]
#[derive(Debug, Clone)]
pub struct ReferenceResolver {
    storage: Storage,
}

impl ReferenceResolver {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Resolve `reference` to a checkpoint of `session_name`
    pub async fn resolve(&self, session_name: &str, reference: &str) -> CheckpointResult<Checkpoint> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(CheckpointError::InvalidReference {
                reference: reference.to_string(),
            });
        }

        match reference.to_lowercase().as_str() {
            "last" | "latest" | "~1" | "~" => return self.storage.get_latest(session_name).await,
            _ => {}
        }

        if let Some(index) = reference.strip_prefix('~') {
            let index: i64 = index.parse().map_err(|_| CheckpointError::InvalidReference {
                reference: reference.to_string(),
            })?;
            return self.get_by_index(session_name, index).await;
        }

        if self.storage.exists(session_name, reference).await {
            return self.storage.load(session_name, reference).await;
        }

        let mut matches = self.find_by_pattern(session_name, reference).await?;
        match matches.len() {
            0 => Err(CheckpointError::NoMatch {
                reference: reference.to_string(),
            }),
            1 => Ok(matches.remove(0)),
            count => Err(CheckpointError::AmbiguousReference {
                reference: reference.to_string(),
                count,
            }),
        }
    }

    /// The Nth most recent checkpoint (1 = latest)
    pub async fn get_by_index(&self, session_name: &str, index: i64) -> CheckpointResult<Checkpoint> {
        let mut checkpoints = self.storage.list(session_name).await?;
        let count = checkpoints.len();

        if index < 1 || index as u64 > count as u64 {
            return Err(CheckpointError::IndexOutOfRange { index, count });
        }

        Ok(checkpoints.swap_remove(index as usize - 1))
    }

    /// Checkpoints whose ID starts with `pattern` or whose name matches it
    pub async fn find_by_pattern(
        &self,
        session_name: &str,
        pattern: &str,
    ) -> CheckpointResult<Vec<Checkpoint>> {
        let checkpoints = self.storage.list(session_name).await?;
        let lowered = pattern.to_lowercase();

        Ok(checkpoints
            .into_iter()
            .filter(|cp| {
                cp.id.starts_with(pattern)
                    || cp.name.to_lowercase() == lowered
                    || match_wildcard(&cp.name, pattern)
            })
            .collect())
    }
}

impl Capturer {
    /// Reference resolver over this capturer's storage
    pub fn resolver(&self) -> ReferenceResolver {
        ReferenceResolver::new(self.storage().clone())
    }

    /// Resolve a checkpoint reference; see [`ReferenceResolver::resolve`]
    pub async fn parse_checkpoint_ref(
        &self,
        session_name: &str,
        reference: &str,
    ) -> CheckpointResult<Checkpoint> {
        self.resolver().resolve(session_name, reference).await
    }

    /// All checkpoints of a session, newest first
    pub async fn list(&self, session_name: &str) -> CheckpointResult<Vec<Checkpoint>> {
        self.storage().list(session_name).await
    }

    pub async fn get_latest(&self, session_name: &str) -> CheckpointResult<Checkpoint> {
        self.storage().get_latest(session_name).await
    }

    pub async fn get_by_index(&self, session_name: &str, index: i64) -> CheckpointResult<Checkpoint> {
        self.resolver().get_by_index(session_name, index).await
    }

    pub async fn find_by_pattern(
        &self,
        session_name: &str,
        pattern: &str,
    ) -> CheckpointResult<Vec<Checkpoint>> {
        self.resolver().find_by_pattern(session_name, pattern).await
    }
}

/// Case-insensitive, fully anchored match where `*` matches any sequence.
///
/// Without a `*` this is a case-insensitive equality check.
pub fn match_wildcard(text: &str, pattern: &str) -> bool {
    let text = text.to_lowercase();
    let pattern = pattern.to_lowercase();

    if !pattern.contains('*') {
        return text == pattern;
    }

    let segments: Vec<&str> = pattern.split('*').collect();
    let first = segments[0];
    let last = segments[segments.len() - 1];

    let Some(mut rest) = text.strip_prefix(first) else {
        return false;
    };

    for segment in &segments[1..segments.len() - 1] {
        if segment.is_empty() {
            continue;
        }
        match rest.find(segment) {
            Some(pos) => rest = &rest[pos + segment.len()..],
            None => return false,
        }
    }

    rest.ends_with(last)
}
