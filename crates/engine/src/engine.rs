// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use ocisnap_adapters::{CloudAdapter, ObjectStore};
use ocisnap_core::{Clock, InstanceId};
use ocisnap_storage::{LockPayload, Locker, RecordStore};
use std::future::Future;

use crate::config::EngineConfig;
use crate::error::OpError;

/// Runs snapshot lifecycle operations.
///
/// Operations are split across modules by command (`create`, `rollback`,
/// `delete`, `rename`, `list`); this type holds what they share.
pub struct SnapshotEngine<Cl, S, C> {
    pub(crate) cloud: Cl,
    pub(crate) records: RecordStore<S>,
    pub(crate) locker: Locker<S, C>,
    pub(crate) clock: C,
    pub(crate) config: EngineConfig,
}

impl<Cl, S, C> SnapshotEngine<Cl, S, C>
where
    Cl: CloudAdapter,
    S: ObjectStore,
    C: Clock,
{
    pub fn new(cloud: Cl, objects: S, clock: C, config: EngineConfig) -> Self {
        Self {
            cloud,
            records: RecordStore::new(objects.clone()),
            locker: Locker::new(objects, clock.clone()),
            clock,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run `op` holding the locks of `instance_ids`.
    ///
    /// The bucket is checked first, then all locks are taken as one batch.
    /// They are released whether `op` succeeds or fails.
    pub(crate) async fn locked<T>(
        &self,
        instance_ids: &[InstanceId],
        op: impl Future<Output = Result<T, OpError>>,
    ) -> Result<T, OpError> {
        self.records.check_bucket().await?;
        self.locker.lock(instance_ids).await?;
        let result = op.await;
        self.locker.unlock(instance_ids).await;
        result
    }

    /// Remove a lock left behind by a crashed run; returns its holder.
    pub async fn unlock(&self, instance_id: &InstanceId) -> Result<LockPayload, OpError> {
        self.records.check_bucket().await?;
        Ok(self.locker.force_unlock(instance_id).await?)
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
