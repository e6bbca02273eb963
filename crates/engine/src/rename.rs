// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use ocisnap_adapters::{CloudAdapter, ObjectStore};
use ocisnap_core::{snapshot_volume_name, tag_key, Clock, InstanceId, SnapshotName};

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
    /// Rename a snapshot, moving its tags and renaming its cloned volumes.
    pub async fn rename(
        &self,
        instance_id: &InstanceId,
        old_name: &str,
        new_name: &str,
    ) -> Result<Report, OpError> {
        let new_name = SnapshotName::parse(new_name)?;
        let instance_ids = [instance_id.clone()];
        let op = self.rename_snapshot(instance_id, old_name, &new_name);
        self.locked(&instance_ids, op).await
    }

    /// Replace a snapshot's description. Only the record changes.
    pub async fn change_description(
        &self,
        instance_id: &InstanceId,
        name: &str,
        description: &str,
    ) -> Result<Report, OpError> {
        let instance_ids = [instance_id.clone()];
        let op = self.describe_snapshot(instance_id, name, description);
        self.locked(&instance_ids, op).await
    }

    async fn rename_snapshot(
        &self,
        instance_id: &InstanceId,
        old_name: &str,
        new_name: &SnapshotName,
    ) -> Result<Report, OpError> {
        let mut flow = Flow::new("rename");

        let mut record = self.load_record(instance_id).await?;
        if record.contains(new_name.as_str()) {
            return Err(Precondition::NameInUse {
                instance_id: instance_id.clone(),
                name: new_name.to_string(),
            }
            .into());
        }
        let snapshot = record.find(old_name).cloned().ok_or_else(|| Precondition::SnapshotNotFound {
            instance_id: instance_id.clone(),
            name: old_name.to_string(),
        })?;
        let instance = self.live_instance(instance_id).await?;

        let old_key = tag_key(old_name);
        let new_key = new_name.tag_key();
        let mut tags = instance.freeform_tags.clone();
        // A missing instance tag is recreated from the record
        let value = tags.remove(&old_key).unwrap_or_else(|| snapshot.date_time.clone());
        tags.insert(new_key.clone(), value.clone());

        flow.mutated();
        match self.cloud.update_instance_tags(instance_id, &tags).await {
            Ok(()) => tracing::info!(instance = %instance_id, tag = %new_key, "retagged instance"),
            Err(e) => flow.residue("retag instance", instance_id, e),
        }

        for (volume, source_name) in VolumeRef::all_of(&snapshot) {
            let display_name = snapshot_volume_name(source_name, new_name.as_str());
            let result = self
                .update_volume(&volume, Some(display_name.clone()), |tags| {
                    tags.remove(&old_key);
                    tags.insert(new_key.clone(), value.clone());
                })
                .await;
            match result {
                Ok(()) => tracing::info!(volume = %volume, name = %display_name, "renamed clone"),
                Err(e) => flow.residue("rename cloned volume", &volume, e),
            }
        }

        record.rename(old_name, new_name.as_str()).map_err(|e| {
            flow.fail(
                "save snapshot record",
                Precondition::NameInUse { instance_id: instance_id.clone(), name: e.0 }.into(),
            )
        })?;
        self.records
            .save(&record)
            .await
            .map_err(|e| flow.fail("save snapshot record", e.into()))?;

        Ok(flow.finish(Outcome::Renamed {
            instance_id: instance_id.clone(),
            old_name: old_name.to_string(),
            new_name: new_name.to_string(),
        }))
    }

    async fn describe_snapshot(
        &self,
        instance_id: &InstanceId,
        name: &str,
        description: &str,
    ) -> Result<Report, OpError> {
        let flow = Flow::new("change-description");

        let mut record = self.load_record(instance_id).await?;
        let snapshot = record.find_mut(name).ok_or_else(|| Precondition::SnapshotNotFound {
            instance_id: instance_id.clone(),
            name: name.to_string(),
        })?;
        snapshot.description = description.to_string();
        self.records.save(&record).await?;
        tracing::info!(instance = %instance_id, snapshot = name, "changed description");

        Ok(flow.finish(Outcome::DescriptionChanged {
            instance_id: instance_id.clone(),
            snapshot: name.to_string(),
            description: description.to_string(),
        }))
    }
}

#[cfg(test)]
#[path = "rename_tests.rs"]
mod tests;
