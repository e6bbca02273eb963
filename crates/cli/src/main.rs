// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ocisnap: snapshots of OCI compute instances

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod color;
mod commands;
mod exit_error;
mod logging;
mod output;
mod settings;

use clap::Parser;
use std::process::ExitCode;

use crate::commands::{Command, GlobalArgs};
use crate::exit_error::{codes, ExitError};

#[derive(Parser, Debug)]
#[command(
    name = "ocisnap",
    version,
    about = "Snapshot, roll back and manage OCI compute instances",
    styles = color::styles()
)]
pub(crate) struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Command,
}

fn report(error: &anyhow::Error) -> u8 {
    let (code, message) = match error.downcast_ref::<ExitError>() {
        Some(e) => (e.code, e.message.clone()),
        None => (codes::CLOUD, format!("{error:#}")),
    };
    eprintln!("{} {message}", color::warning("error:"));
    u8::try_from(code).unwrap_or(1)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if cli.global.no_color {
        std::env::set_var("NO_COLOR", "1");
    }
    logging::init(cli.global.verbose);

    match commands::run(cli.command, &cli.global).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => ExitCode::from(report(&e)),
    }
}
