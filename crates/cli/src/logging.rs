// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set
pub fn default_directive(verbose: u8) -> &'static str {
    match verbose {
        0 => "ocisnap=info",
        1 => "ocisnap=debug",
        _ => "ocisnap=trace,reqwest=debug",
    }
}

/// Progress lines on stderr, keeping stdout for results.
pub fn init(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
