// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory fakes of the cloud seams for tests in this and dependent crates.

mod cloud;
mod object_store;

pub use cloud::{CloudCall, FakeCloud, InstanceSeed, SeededInstance};
pub use object_store::FakeObjectStore;

use crate::error::AdapterError;

/// A queued failure: the next call of `op` (optionally only for `target`)
/// returns `error` instead of doing anything.
#[derive(Debug, Clone)]
struct Failure {
    op: &'static str,
    target: Option<String>,
    error: AdapterError,
}

#[derive(Debug, Default)]
struct Failures(Vec<Failure>);

impl Failures {
    fn push(&mut self, op: &'static str, target: Option<String>, error: AdapterError) {
        self.0.push(Failure { op, target, error });
    }

    /// Take the first queued failure matching this call
    fn take(&mut self, op: &str, target: &str) -> Result<(), AdapterError> {
        let hit = self
            .0
            .iter()
            .position(|f| f.op == op && f.target.as_deref().map_or(true, |t| t == target));
        match hit {
            Some(i) => Err(self.0.remove(i).error),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
