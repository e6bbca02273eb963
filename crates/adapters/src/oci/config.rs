// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! OCI CLI/SDK configuration file (`~/.oci/config`).
//!
//! INI format: `[PROFILE]` sections of `key=value` lines, `#`/`;` comments.
//! Keys of the `DEFAULT` section are inherited by every other profile.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Name of the profile every other profile inherits from
pub const DEFAULT_PROFILE: &str = "DEFAULT";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {}: {source}", path.display())]
    Read { path: PathBuf, source: std::io::Error },
    #[error("profile '{profile}' not found in config file {}", path.display())]
    ProfileNotFound { profile: String, path: PathBuf },
    #[error("profile '{profile}' has no '{key}' entry")]
    MissingKey { profile: String, key: &'static str },
    #[error("profile '{profile}' uses a passphrase-protected key, which is not supported")]
    EncryptedKey { profile: String },
    #[error("cannot read private key {}: {source}", path.display())]
    KeyFile { path: PathBuf, source: std::io::Error },
    #[error("invalid private key: {0}")]
    InvalidKey(String),
    #[error("no home directory to locate ~/.oci/config")]
    NoHome,
}

/// A resolved API-key profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OciProfile {
    pub name: String,
    pub user: String,
    pub tenancy: String,
    pub fingerprint: String,
    pub key_file: PathBuf,
    pub region: String,
}

impl OciProfile {
    /// `keyId` of the HTTP signature: `<tenancy>/<user>/<fingerprint>`
    pub fn key_id(&self) -> String {
        format!("{}/{}/{}", self.tenancy, self.user, self.fingerprint)
    }

    /// Read the PEM private key referenced by `key_file`
    pub fn read_key(&self) -> Result<String, ConfigError> {
        std::fs::read_to_string(&self.key_file)
            .map_err(|source| ConfigError::KeyFile { path: self.key_file.clone(), source })
    }
}

/// `~/.oci/config`
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().map(|h| h.join(".oci").join("config")).ok_or(ConfigError::NoHome)
}

/// Load and resolve one profile from the config file at `path`.
pub fn load_profile(path: &Path, profile: &str) -> Result<OciProfile, ConfigError> {
    let text = std::fs::read_to_string(path)
        .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
    resolve_profile(&parse_ini(&text), path, profile)
}

fn resolve_profile(
    sections: &BTreeMap<String, BTreeMap<String, String>>,
    path: &Path,
    profile: &str,
) -> Result<OciProfile, ConfigError> {
    let Some(section) = sections.get(profile) else {
        return Err(ConfigError::ProfileNotFound {
            profile: profile.to_string(),
            path: path.to_path_buf(),
        });
    };
    let defaults = sections.get(DEFAULT_PROFILE);
    let lookup = |key: &'static str| -> Result<String, ConfigError> {
        section
            .get(key)
            .or_else(|| defaults.and_then(|d| d.get(key)))
            .filter(|v| !v.is_empty())
            .cloned()
            .ok_or_else(|| ConfigError::MissingKey { profile: profile.to_string(), key })
    };

    if section.contains_key("pass_phrase")
        || defaults.is_some_and(|d| d.contains_key("pass_phrase"))
    {
        return Err(ConfigError::EncryptedKey { profile: profile.to_string() });
    }

    Ok(OciProfile {
        name: profile.to_string(),
        user: lookup("user")?,
        tenancy: lookup("tenancy")?,
        fingerprint: lookup("fingerprint")?,
        key_file: expand_home(&lookup("key_file")?),
        region: lookup("region")?,
    })
}

/// Parse INI text into section -> key -> value. Keys outside any section
/// are dropped.
pub(crate) fn parse_ini(text: &str) -> BTreeMap<String, BTreeMap<String, String>> {
    let mut sections: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
    let mut current: Option<String> = None;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            let name = name.trim().to_string();
            sections.entry(name.clone()).or_default();
            current = Some(name);
            continue;
        }
        let (Some(section), Some((key, value))) = (&current, line.split_once('=')) else {
            continue;
        };
        sections
            .entry(section.clone())
            .or_default()
            .insert(key.trim().to_string(), value.trim().to_string());
    }
    sections
}

fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
