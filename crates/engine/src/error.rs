// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use ocisnap_adapters::AdapterError;
use ocisnap_core::{
    format_elapsed, InstanceId, InstanceState, NameError, VolumeGroupId, VolumeGroupState,
};
use ocisnap_storage::{LockError, StoreError};
use std::time::Duration;
use thiserror::Error;

use crate::report::Residue;

/// A check that failed before anything was changed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Precondition {
    #[error("invalid snapshot name: {0}")]
    InvalidName(#[from] NameError),
    #[error("a snapshot named '{name}' already exists on instance {instance_id}")]
    NameInUse { instance_id: InstanceId, name: String },
    #[error("no snapshot named '{name}' on instance {instance_id}")]
    SnapshotNotFound { instance_id: InstanceId, name: String },
    #[error("compute instance {0} not found")]
    InstanceNotFound(InstanceId),
    #[error("compute instance {instance_id} is {state}")]
    InstanceTerminated { instance_id: InstanceId, state: InstanceState },
    #[error("compute instance {instance_id} has {count} VNICs; only single-VNIC instances can be rolled back")]
    MultipleVnics { instance_id: InstanceId, count: usize },
    #[error("instances must share one compartment and availability domain ({0} differs)")]
    MixedPlacement(InstanceId),
    #[error("no instance given")]
    NoInstances,
    #[error("compute instance {0} uses an ephemeral public IP; use a reserved public IP instead")]
    EphemeralPublicIp(InstanceId),
    #[error("bucket {0} does not exist")]
    BucketMissing(String),
}

/// Failure of a lifecycle operation
#[derive(Debug, Error)]
pub enum OpError {
    #[error(transparent)]
    Precondition(#[from] Precondition),
    #[error(transparent)]
    Lock(#[from] LockError),
    #[error(transparent)]
    Store(StoreError),
    #[error("cannot match volume {0} with its clone or source")]
    SourceUnresolved(String),
    #[error("volume group clone {volume_group} ended {state}")]
    CloneFailed { volume_group: VolumeGroupId, state: VolumeGroupState },
    #[error("timed out after {} waiting for {what}", compact(.waited))]
    Timeout { what: String, waited: Duration },
    #[error("cannot {step}: {source}")]
    Cloud { step: &'static str, source: AdapterError },
    /// A step failed after the operation had already changed resources.
    #[error("aborted at '{step}' after changes were made: {source}")]
    Aborted { step: &'static str, source: Box<OpError>, residue: Vec<Residue> },
}

fn compact(waited: &Duration) -> String {
    format_elapsed(*waited)
}

impl From<StoreError> for OpError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::BucketMissing(bucket) => Precondition::BucketMissing(bucket).into(),
            other => Self::Store(other),
        }
    }
}

impl From<NameError> for OpError {
    fn from(e: NameError) -> Self {
        Precondition::InvalidName(e).into()
    }
}

impl OpError {
    /// Cleanup left to the operator, if the operation was aborted midway
    pub fn residue(&self) -> &[Residue] {
        match self {
            Self::Aborted { residue, .. } => residue,
            _ => &[],
        }
    }

    /// The underlying failure, looking through `Aborted`
    pub fn root(&self) -> &OpError {
        match self {
            Self::Aborted { source, .. } => source.root(),
            other => other,
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
