// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Snapshot records, one JSON object per instance.

use ocisnap_adapters::{AdapterError, ObjectStore};
use ocisnap_core::{InstanceId, SnapshotRecord};
use thiserror::Error;

use crate::keys::{instance_id_from_key, record_key, RECORD_PREFIX};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("bucket {0} does not exist")]
    BucketMissing(String),
    #[error("cannot read {key}: {source}")]
    Read { key: String, source: AdapterError },
    #[error("cannot save {key}: {source}")]
    Write { key: String, source: AdapterError },
    #[error("cannot encode snapshot record: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("cannot list snapshot records: {0}")]
    List(AdapterError),
}

/// Loads and saves [`SnapshotRecord`]s in the bucket.
#[derive(Debug, Clone)]
pub struct RecordStore<S> {
    objects: S,
}

impl<S: ObjectStore> RecordStore<S> {
    pub fn new(objects: S) -> Self {
        Self { objects }
    }

    pub fn objects(&self) -> &S {
        &self.objects
    }

    /// Fail early when the bucket is missing.
    pub async fn check_bucket(&self) -> Result<(), StoreError> {
        match self.objects.bucket_exists().await {
            Ok(true) => Ok(()),
            Ok(false) => Err(StoreError::BucketMissing(self.objects.bucket().to_string())),
            Err(source) => Err(StoreError::Read { key: self.objects.bucket().to_string(), source }),
        }
    }

    /// Record of one instance. A missing object gives an empty record; so
    /// does one that is not valid JSON, after a warning.
    pub async fn load(&self, instance_id: &InstanceId) -> Result<SnapshotRecord, StoreError> {
        let key = record_key(instance_id);
        let bytes = match self.objects.get(&key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return Ok(SnapshotRecord::empty(instance_id.clone())),
            Err(source) => return Err(StoreError::Read { key, source }),
        };
        match serde_json::from_slice::<SnapshotRecord>(&bytes) {
            Ok(record) => Ok(record.reassign(instance_id.clone())),
            Err(e) => {
                tracing::warn!(%key, error = %e, "ignoring malformed snapshot record");
                Ok(SnapshotRecord::empty(instance_id.clone()))
            }
        }
    }

    /// Persist a record. An empty record deletes the object instead.
    pub async fn save(&self, record: &SnapshotRecord) -> Result<(), StoreError> {
        if record.is_empty() {
            self.delete(&record.instance_id).await;
            return Ok(());
        }
        let key = record_key(&record.instance_id);
        let body = serde_json::to_vec_pretty(record)?;
        self.objects.put(&key, body).await.map_err(|source| StoreError::Write { key, source })?;
        tracing::debug!(instance = %record.instance_id, snapshots = record.snapshots.len(), "saved snapshot record");
        Ok(())
    }

    /// Remove an instance's record. Failures (including "already gone")
    /// are only logged.
    pub async fn delete(&self, instance_id: &InstanceId) {
        let key = record_key(instance_id);
        match self.objects.delete(&key).await {
            Ok(()) => tracing::debug!(%key, "deleted snapshot record"),
            Err(e) if e.is_not_found() => {}
            Err(e) => tracing::warn!(%key, error = %e, "cannot delete snapshot record"),
        }
    }

    /// Instances that have a record in the bucket
    pub async fn list_instance_ids(&self) -> Result<Vec<InstanceId>, StoreError> {
        let keys = self.objects.list(RECORD_PREFIX).await.map_err(StoreError::List)?;
        Ok(keys.iter().filter_map(|k| instance_id_from_key(k)).collect())
    }
}

#[cfg(test)]
#[path = "record_store_tests.rs"]
mod tests;
