// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use ocisnap_core::InstanceId;

/// Bucket used when no other is configured
pub const DEFAULT_BUCKET: &str = "compute_snapshots";

pub const LOCK_PREFIX: &str = "lock.";

/// Every record key starts with an instance OCID
pub(crate) const RECORD_PREFIX: &str = "ocid1.instance";
const RECORD_SUFFIX: &str = ".json";

pub fn record_key(instance_id: &InstanceId) -> String {
    format!("{instance_id}{RECORD_SUFFIX}")
}

pub fn lock_key(instance_id: &InstanceId) -> String {
    format!("{LOCK_PREFIX}{instance_id}")
}

/// Instance id of a record key; `None` for any other object
pub fn instance_id_from_key(key: &str) -> Option<InstanceId> {
    key.strip_suffix(RECORD_SUFFIX)
        .filter(|id| id.starts_with(RECORD_PREFIX))
        .map(InstanceId::from)
}

#[cfg(test)]
#[path = "keys_tests.rs"]
mod tests;
