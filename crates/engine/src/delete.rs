// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use ocisnap_adapters::{CloudAdapter, ObjectStore};
use ocisnap_core::{Clock, InstanceId, Snapshot};

use crate::engine::SnapshotEngine;
use crate::error::{OpError, Precondition};
use crate::flow::Flow;
use crate::inspect::VolumeRef;
use crate::report::{Outcome, Report};

impl<Cl, S, C> SnapshotEngine<Cl, S, C>
where
    Cl: CloudAdapter,
    S: ObjectStore,
    C: Clock,
{
    /// Delete one snapshot: its cloned volumes, its instance tag and its
    /// record entry.
    pub async fn delete(&self, instance_id: &InstanceId, name: &str) -> Result<Report, OpError> {
        let instance_ids = [instance_id.clone()];
        let op = self.delete_snapshots("delete", instance_id, Some(name));
        self.locked(&instance_ids, op).await
    }

    /// Delete every snapshot of an instance, in creation order.
    pub async fn delete_all(&self, instance_id: &InstanceId) -> Result<Report, OpError> {
        let instance_ids = [instance_id.clone()];
        let op = self.delete_snapshots("delete-all", instance_id, None);
        self.locked(&instance_ids, op).await
    }

    async fn delete_snapshots(
        &self,
        operation: &'static str,
        instance_id: &InstanceId,
        name: Option<&str>,
    ) -> Result<Report, OpError> {
        let mut flow = Flow::new(operation);

        let instance = self.live_instance(instance_id).await?;
        let mut record = self.load_record(instance_id).await?;
        let doomed: Vec<Snapshot> = match name {
            Some(name) => {
                let snapshot = record.find(name).cloned().ok_or_else(|| {
                    Precondition::SnapshotNotFound {
                        instance_id: instance_id.clone(),
                        name: name.to_string(),
                    }
                })?;
                vec![snapshot]
            }
            None => record.snapshots.clone(),
        };

        for snapshot in &doomed {
            tracing::info!(instance = %instance_id, snapshot = %snapshot.name, "deleting snapshot");
            // Block volumes first, boot volume last
            let mut volumes = VolumeRef::all_of(snapshot);
            volumes.rotate_left(1);
            for (volume, _) in volumes {
                flow.mutated();
                match self.delete_volume(&volume).await {
                    Ok(()) => tracing::info!(volume = %volume, "deleted cloned volume"),
                    Err(e) => flow.residue("delete cloned volume", &volume, e),
                }
            }
        }

        let mut tags = instance.freeform_tags.clone();
        let tagged = tags.len();
        for snapshot in &doomed {
            tags.remove(&snapshot.tag_key());
        }
        if tags.len() != tagged {
            flow.mutated();
            match self.cloud.update_instance_tags(instance_id, &tags).await {
                Ok(()) => tracing::info!(instance = %instance_id, "removed snapshot tags"),
                Err(e) => flow.residue("untag instance", instance_id, e),
            }
        }

        for snapshot in &doomed {
            record.remove(&snapshot.name);
        }
        self.records
            .save(&record)
            .await
            .map_err(|e| flow.fail("save snapshot record", e.into()))?;

        Ok(flow.finish(Outcome::Deleted {
            instance_id: instance_id.clone(),
            snapshots: doomed.into_iter().map(|s| s.name).collect(),
        }))
    }
}

#[cfg(test)]
#[path = "delete_tests.rs"]
mod tests;
