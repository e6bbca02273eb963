// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Arguments rejected before any cloud call

use crate::prelude::*;

const WEB01: &str = "ocid1.instance.oc1.phx.web01";

#[test]
fn non_instance_ocid_is_a_usage_error() {
    cli()
        .args(&["list", "ocid1.volume.oc1.phx.abc"])
        .exits(2)
        .stderr_has("is not an instance OCID");
}

#[test]
fn create_multi_needs_an_instance() {
    cli().args(&["create-multi", "nightly"]).exits(2).stderr_has("required");
}

#[test]
fn invalid_snapshot_name_exits_four() {
    cli()
        .args(&["create", WEB01, "pre upgrade"])
        .exits(4)
        .stderr_has("snapshot name contains ' '")
        .stdout_is_empty();
}

#[test]
fn empty_rename_target_exits_four() {
    cli().args(&["rename", WEB01, "old", ""]).exits(4).stderr_has("snapshot name is empty");
}

#[test]
fn unknown_output_format_is_rejected() {
    cli().args(&["list", WEB01, "--output", "yaml"]).exits(2).stderr_has("yaml");
}
