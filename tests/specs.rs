// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Behavioral specs for the `ocisnap` binary

#[path = "specs/prelude.rs"]
mod prelude;

#[path = "specs/cli/config.rs"]
mod cli_config;
#[path = "specs/cli/help.rs"]
mod cli_help;
#[path = "specs/cli/validation.rs"]
mod cli_validation;
