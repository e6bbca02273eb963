// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Snapshot names and the freeform tags derived from them.

use std::fmt;

use thiserror::Error;

/// Prefix of the freeform tag key carried by snapshotted resources
pub const TAG_PREFIX: &str = "snapshot_";

/// Freeform tag keys are limited to 100 characters, prefix included.
pub const MAX_NAME_LEN: usize = 100 - TAG_PREFIX.len();

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("snapshot name is empty")]
    Empty,
    #[error("snapshot name is {len} characters long (max {max})")]
    TooLong { len: usize, max: usize },
    #[error("snapshot name contains '{0}' (allowed: letters, digits, '-' and '_')")]
    InvalidChar(char),
}

/// A validated snapshot name.
///
/// Names end up inside tag keys and volume display names, so only
/// `[A-Za-z0-9_-]` is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SnapshotName(String);

impl SnapshotName {
    pub fn parse(name: &str) -> Result<Self, NameError> {
        if name.is_empty() {
            return Err(NameError::Empty);
        }
        let len = name.chars().count();
        if len > MAX_NAME_LEN {
            return Err(NameError::TooLong { len, max: MAX_NAME_LEN });
        }
        if let Some(c) = name.chars().find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(NameError::InvalidChar(c));
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn tag_key(&self) -> String {
        tag_key(&self.0)
    }
}

impl fmt::Display for SnapshotName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SnapshotName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Freeform tag key for a snapshot: `snapshot_<name>`
pub fn tag_key(name: &str) -> String {
    format!("{TAG_PREFIX}{name}")
}

/// Display name given to a cloned volume: `<source name>_snapshot_<name>`
pub fn snapshot_volume_name(source_name: &str, snapshot: &str) -> String {
    format!("{source_name}_{TAG_PREFIX}{snapshot}")
}

#[cfg(test)]
#[path = "name_tests.rs"]
mod tests;
