// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error type carrying the process exit code.
//!
//! Commands return `ExitError` instead of calling `std::process::exit()`,
//! so `main()` alone decides how the process ends.

use ocisnap_adapters::{ConfigError, ConnectError};
use ocisnap_engine::{OpError, Precondition};
use ocisnap_storage::{LockError, StoreError};
use std::fmt;

/// Process exit codes
pub mod codes {
    pub const NAME_IN_USE: i32 = 1;
    pub const CONFIG: i32 = 2;
    pub const SNAPSHOT_NOT_FOUND: i32 = 3;
    pub const INVALID_NAME: i32 = 4;
    pub const UNSUPPORTED_INSTANCE: i32 = 5;
    pub const EPHEMERAL_PUBLIC_IP: i32 = 6;
    pub const RECORD_NOT_SAVED: i32 = 7;
    pub const INSTANCE_TERMINATED: i32 = 8;
    pub const INSTANCE_NOT_FOUND: i32 = 9;
    pub const SOURCE_UNRESOLVED: i32 = 10;
    pub const BUCKET_NOT_FOUND: i32 = 11;
    pub const LOCK_HELD: i32 = 12;
    pub const LOCK_FAILED: i32 = 13;
    pub const TIMEOUT: i32 = 15;
    pub const ABORTED: i32 = 16;
    pub const CLOUD: i32 = 20;
}

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExitError {}

/// Exit code for an operation failure.
///
/// An aborted operation keeps the code of its cause when the cause has a
/// specific one (timeout, unresolved clone, unsaved record); otherwise 16.
pub fn exit_code(error: &OpError) -> i32 {
    match error {
        OpError::Precondition(p) => precondition_code(p),
        OpError::Lock(LockError::Held { .. }) => codes::LOCK_HELD,
        OpError::Lock(_) => codes::LOCK_FAILED,
        OpError::Store(StoreError::Write { .. } | StoreError::Encode(_)) => codes::RECORD_NOT_SAVED,
        OpError::Store(StoreError::BucketMissing(_)) => codes::BUCKET_NOT_FOUND,
        OpError::Store(_) => codes::CLOUD,
        OpError::SourceUnresolved(_) => codes::SOURCE_UNRESOLVED,
        OpError::Timeout { .. } => codes::TIMEOUT,
        OpError::CloneFailed { .. } | OpError::Cloud { .. } => codes::CLOUD,
        OpError::Aborted { source, .. } => match exit_code(source) {
            codes::CLOUD => codes::ABORTED,
            code => code,
        },
    }
}

fn precondition_code(p: &Precondition) -> i32 {
    match p {
        Precondition::InvalidName(_) => codes::INVALID_NAME,
        Precondition::NameInUse { .. } => codes::NAME_IN_USE,
        Precondition::SnapshotNotFound { .. } => codes::SNAPSHOT_NOT_FOUND,
        Precondition::InstanceNotFound(_) => codes::INSTANCE_NOT_FOUND,
        Precondition::InstanceTerminated { .. } => codes::INSTANCE_TERMINATED,
        Precondition::MultipleVnics { .. }
        | Precondition::MixedPlacement(_)
        | Precondition::NoInstances => codes::UNSUPPORTED_INSTANCE,
        Precondition::EphemeralPublicIp(_) => codes::EPHEMERAL_PUBLIC_IP,
        Precondition::BucketMissing(_) => codes::BUCKET_NOT_FOUND,
    }
}

impl From<OpError> for ExitError {
    fn from(error: OpError) -> Self {
        let code = exit_code(&error);
        let mut message = error.to_string();
        let residue = error.residue();
        if !residue.is_empty() {
            message.push_str("\nleft behind:");
            for r in residue {
                message.push_str(&format!("\n  - {r}"));
            }
        }
        Self::new(code, message)
    }
}

impl From<ConfigError> for ExitError {
    fn from(error: ConfigError) -> Self {
        Self::new(codes::CONFIG, error.to_string())
    }
}

impl From<ConnectError> for ExitError {
    fn from(error: ConnectError) -> Self {
        match error {
            ConnectError::Config(e) => e.into(),
            ConnectError::Adapter(e) => Self::new(codes::CLOUD, e.to_string()),
        }
    }
}

#[cfg(test)]
#[path = "exit_error_tests.rs"]
mod tests;
