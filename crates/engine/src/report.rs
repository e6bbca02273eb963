// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! What a lifecycle operation did, and what it left behind.

use ocisnap_core::{InstanceId, Snapshot};
use serde::{Serialize, Serializer};
use std::time::Duration;

/// A step that failed after the essential work was done. The operator
/// has to finish it by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Residue {
    pub step: String,
    pub resource: String,
    pub error: String,
}

impl Residue {
    pub fn new(step: impl Into<String>, resource: impl Into<String>, error: impl Into<String>) -> Self {
        Self { step: step.into(), resource: resource.into(), error: error.into() }
    }
}

impl std::fmt::Display for Residue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.step, self.resource, self.error)
    }
}

/// A snapshot entry written to one instance's record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedSnapshot {
    pub instance_id: InstanceId,
    pub snapshot: Snapshot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Created { snapshots: Vec<CreatedSnapshot> },
    RolledBack { instance_id: InstanceId, new_instance_id: InstanceId, snapshot: String },
    Deleted { instance_id: InstanceId, snapshots: Vec<String> },
    Renamed { instance_id: InstanceId, old_name: String, new_name: String },
    DescriptionChanged { instance_id: InstanceId, snapshot: String, description: String },
}

/// Result of a lifecycle operation that reached its end
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub operation: &'static str,
    #[serde(flatten)]
    pub outcome: Outcome,
    pub residue: Vec<Residue>,
    #[serde(rename = "elapsed_secs", serialize_with = "as_secs")]
    pub elapsed: Duration,
}

impl Report {
    /// Succeeded with nothing left to clean up
    pub fn is_clean(&self) -> bool {
        self.residue.is_empty()
    }
}

fn as_secs<S: Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(elapsed.as_secs())
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
