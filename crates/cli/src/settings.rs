// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ocisnap.toml`: bucket, polling and HTTP settings.
//!
//! Command-line flags (and their environment variables, handled by clap)
//! win over the file, which wins over built-in defaults.

use ocisnap_adapters::DEFAULT_MAX_ATTEMPTS;
use ocisnap_core::Backoff;
use ocisnap_engine::EngineConfig;
use ocisnap_storage::DEFAULT_BUCKET;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot read settings file {}: {source}", path.display())]
    Read { path: PathBuf, source: std::io::Error },
    #[error("invalid settings file {}: {source}", path.display())]
    Parse { path: PathBuf, source: toml::de::Error },
    #[error("invalid settings file {}: {key} must be at least 1", path.display())]
    Zero { path: PathBuf, key: &'static str },
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SettingsFile {
    pub bucket: Option<String>,
    pub region: Option<String>,
    pub poll: PollSection,
    pub http: HttpSection,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PollSection {
    pub initial_secs: Option<u64>,
    pub max_secs: Option<u64>,
    pub clone_timeout_secs: Option<u64>,
    pub instance_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpSection {
    pub timeout_secs: Option<u64>,
    pub max_attempts: Option<u32>,
}

impl SettingsFile {
    pub fn parse(path: &Path, text: &str) -> Result<Self, SettingsError> {
        let file: Self = toml::from_str(text)
            .map_err(|source| SettingsError::Parse { path: path.to_path_buf(), source })?;
        // A zero delay or deadline ends every wait after a single poll
        let counts = [
            ("poll.initial_secs", file.poll.initial_secs),
            ("poll.max_secs", file.poll.max_secs),
            ("poll.clone_timeout_secs", file.poll.clone_timeout_secs),
            ("poll.instance_timeout_secs", file.poll.instance_timeout_secs),
            ("http.timeout_secs", file.http.timeout_secs),
            ("http.max_attempts", file.http.max_attempts.map(u64::from)),
        ];
        match counts.into_iter().find(|(_, value)| *value == Some(0)) {
            Some((key, _)) => Err(SettingsError::Zero { path: path.to_path_buf(), key }),
            None => Ok(file),
        }
    }

    /// Load the settings file. An explicitly named file must exist; the
    /// default one is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self, SettingsError> {
        let (path, required) = match explicit {
            Some(path) => (path.to_path_buf(), true),
            None => match default_path() {
                Some(path) => (path, false),
                None => return Ok(Self::default()),
            },
        };
        match std::fs::read_to_string(&path) {
            Ok(text) => Self::parse(&path, &text),
            Err(e) if !required && e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(SettingsError::Read { path, source }),
        }
    }
}

/// `~/.config/ocisnap/ocisnap.toml`
pub fn default_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("ocisnap").join("ocisnap.toml"))
}

/// Effective settings for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub bucket: String,
    /// Region override; the profile's region otherwise
    pub region: Option<String>,
    pub engine: EngineConfig,
    pub http_timeout: Duration,
    pub http_retry: Backoff,
    pub max_attempts: u32,
}

impl Settings {
    pub fn resolve(file: SettingsFile, bucket: Option<String>, region: Option<String>) -> Self {
        let defaults = EngineConfig::default();
        let poll = &file.poll;
        let secs = |value: Option<u64>, default: Duration| value.map_or(default, Duration::from_secs);
        let initial = secs(poll.initial_secs, defaults.instance_wait.initial);
        let max = secs(poll.max_secs, defaults.instance_wait.max);
        let engine = EngineConfig::default()
            .clone_wait(Backoff::new(
                initial,
                max,
                secs(poll.clone_timeout_secs, defaults.clone_wait.deadline),
            ))
            .instance_wait(Backoff::new(
                initial,
                max,
                secs(poll.instance_timeout_secs, defaults.instance_wait.deadline),
            ));

        Self {
            bucket: bucket.or(file.bucket).unwrap_or_else(|| DEFAULT_BUCKET.to_string()),
            region: region.or(file.region),
            engine,
            http_timeout: secs(file.http.timeout_secs, Duration::from_secs(60)),
            http_retry: Backoff::new(
                Duration::from_secs(1),
                Duration::from_secs(8),
                Duration::from_secs(60),
            ),
            max_attempts: file.http.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS),
        }
    }
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
