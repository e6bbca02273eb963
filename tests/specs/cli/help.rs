// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Help and version output

use crate::prelude::*;

#[test]
fn no_args_prints_usage_and_exits_two() {
    cli().exits(2).stderr_has("Usage:");
}

#[test]
fn help_lists_every_subcommand() {
    let run = cli().args(&["--help"]).passes().stdout_has("Usage:");
    for sub in [
        "create",
        "create-multi",
        "list",
        "list-all",
        "rollback",
        "delete",
        "delete-all",
        "rename",
        "change-desc",
        "unlock",
    ] {
        assert!(run.stdout.contains(sub), "help lacks {sub}:\n{}", run.stdout);
    }
}

#[test]
fn create_help_shows_description_flag() {
    cli().args(&["create", "--help"]).passes().stdout_has("--description");
}

#[test]
fn global_flags_are_documented() {
    cli()
        .args(&["list", "--help"])
        .passes()
        .stdout_has("--profile")
        .stdout_has("--config-file")
        .stdout_has("--bucket")
        .stdout_has("--output");
}

#[test]
fn version_matches_the_package() {
    cli()
        .args(&["--version"])
        .passes()
        .stdout_has(&format!("ocisnap {}", env!("CARGO_PKG_VERSION")));
}
