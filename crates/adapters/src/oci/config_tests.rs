// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::io::Write;

const CONFIG: &str = r#"
# shared settings
[DEFAULT]
user=ocid1.user.oc1..alice
fingerprint=aa:bb:cc
key_file=/keys/oci_api_key.pem
tenancy=ocid1.tenancy.oc1..acme
region=eu-frankfurt-1

[PHOENIX]
region = us-phoenix-1
; comment
key_file = /keys/phx.pem

[BROKEN]
user=
"#;

fn write_config(text: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file
}

#[test]
fn parse_ini_sections_and_comments() {
    let sections = parse_ini(CONFIG);
    assert_eq!(sections.len(), 3);
    assert_eq!(sections["PHOENIX"]["region"], "us-phoenix-1");
    assert!(!sections["PHOENIX"].contains_key("; comment"));
}

#[test]
fn default_profile_resolves() {
    let file = write_config(CONFIG);
    let profile = load_profile(file.path(), "DEFAULT").unwrap();
    assert_eq!(profile.region, "eu-frankfurt-1");
    assert_eq!(profile.key_id(), "ocid1.tenancy.oc1..acme/ocid1.user.oc1..alice/aa:bb:cc");
}

#[test]
fn named_profile_inherits_defaults() {
    let file = write_config(CONFIG);
    let profile = load_profile(file.path(), "PHOENIX").unwrap();
    assert_eq!(profile.region, "us-phoenix-1");
    assert_eq!(profile.key_file, PathBuf::from("/keys/phx.pem"));
    assert_eq!(profile.user, "ocid1.user.oc1..alice");
}

#[test]
fn empty_value_is_not_inherited() {
    let file = write_config(CONFIG);
    let err = load_profile(file.path(), "BROKEN").unwrap_err();
    assert!(matches!(err, ConfigError::MissingKey { key: "user", .. }), "{err}");
}

#[test]
fn unknown_profile_is_reported() {
    let file = write_config(CONFIG);
    let err = load_profile(file.path(), "LONDON").unwrap_err();
    assert!(matches!(err, ConfigError::ProfileNotFound { ref profile, .. } if profile == "LONDON"));
}

#[test]
fn missing_file_is_reported() {
    let err = load_profile(Path::new("/nonexistent/oci/config"), "DEFAULT").unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}

#[test]
fn passphrase_is_rejected() {
    let file = write_config(&format!("{CONFIG}\n[SECURE]\npass_phrase=secret\n"));
    let err = load_profile(file.path(), "SECURE").unwrap_err();
    assert!(matches!(err, ConfigError::EncryptedKey { .. }));
}

#[test]
fn home_is_expanded_in_key_file() {
    let Some(home) = dirs::home_dir() else { return };
    assert_eq!(expand_home("~/.oci/key.pem"), home.join(".oci/key.pem"));
    assert_eq!(expand_home("/abs/key.pem"), PathBuf::from("/abs/key.pem"));
}
