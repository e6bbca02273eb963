// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration problems exit with code 2 before any network call

use crate::prelude::*;

const WEB01: &str = "ocid1.instance.oc1.phx.web01";

const PROFILE: &str = "\
[DEFAULT]
user=ocid1.user.oc1..alice
fingerprint=12:34:56
tenancy=ocid1.tenancy.oc1..acme
region=us-phoenix-1
key_file=~/.oci/missing_key.pem
";

#[test]
fn missing_oci_config_exits_two() {
    let home = Home::empty();

    home.ocisnap().args(&["list", WEB01]).exits(2).stderr_has("cannot read config file");
}

#[test]
fn unknown_profile_exits_two() {
    let home = Home::empty();
    home.file(".oci/config", PROFILE);

    home.ocisnap()
        .args(&["list", WEB01, "--profile", "STAGING"])
        .exits(2)
        .stderr_has("profile 'STAGING' not found");
}

#[test]
fn profile_from_environment() {
    let home = Home::empty();
    home.file(".oci/config", PROFILE);

    home.ocisnap()
        .env("OCI_CLI_PROFILE", "QA")
        .args(&["list", WEB01])
        .exits(2)
        .stderr_has("profile 'QA' not found");
}

#[test]
fn explicit_config_file_is_used() {
    let home = Home::empty();
    let path = home.file("elsewhere/config", "[DEFAULT]\nuser=ocid1.user.oc1..alice\n");

    home.ocisnap()
        .args(&["list", WEB01, "--config-file"])
        .args(&[path.to_str().unwrap()])
        .exits(2)
        .stderr_has("profile 'DEFAULT' has no 'tenancy' entry");
}

#[test]
fn passphrase_protected_key_is_refused() {
    let home = Home::empty();
    home.file(".oci/config", &format!("{PROFILE}pass_phrase=secret\n"));

    home.ocisnap().args(&["list", WEB01]).exits(2).stderr_has("passphrase-protected");
}

#[test]
fn unreadable_key_file_exits_two() {
    let home = Home::empty();
    home.file(".oci/config", PROFILE);

    home.ocisnap().args(&["list", WEB01]).exits(2).stderr_has("cannot read private key");
}

#[test]
fn unknown_settings_key_exits_two() {
    let home = Home::empty();
    home.file(".oci/config", PROFILE);
    let settings = home.file("ocisnap.toml", "bukket = \"typo\"\n");

    home.ocisnap()
        .env("OCISNAP_SETTINGS", &settings)
        .args(&["list", WEB01])
        .exits(2)
        .stderr_has("invalid settings file");
}

#[test]
fn missing_explicit_settings_file_exits_two() {
    let home = Home::empty();

    home.ocisnap()
        .args(&["list", WEB01, "--settings", "/nonexistent/ocisnap.toml"])
        .exits(2)
        .stderr_has("cannot read settings file");
}

#[test]
fn zero_poll_delay_exits_two() {
    let home = Home::empty();
    home.file(".oci/config", PROFILE);
    let settings = home.file("ocisnap.toml", "[poll]\ninitial_secs = 0\n");

    home.ocisnap()
        .args(&["list", WEB01, "--settings"])
        .args(&[settings.to_str().unwrap()])
        .exits(2)
        .stderr_has("poll.initial_secs must be at least 1");
}
