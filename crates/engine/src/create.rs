// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! create and create-multi.
//!
//! The volumes of every instance go into one temporary volume group
//! (`snapshot_<name>_tempo_source`), which is cloned in one go
//! (`snapshot_<name>_tempo_cloned`) so all clones share a point in time.
//! Both groups are deleted afterwards; the cloned volumes stay.

use ocisnap_adapters::{
    AdapterError, CloudAdapter, CreateVolumeGroupDetails, ObjectStore, VolumeGroup,
    VolumeGroupSource,
};
use ocisnap_core::{
    format_date_time, snapshot_volume_name, BlockVolumeRef, BootVolumeId, BootVolumeRef, Clock,
    InstanceId, Snapshot, SnapshotName, SnapshotRecord, VolumeGroupId, VolumeGroupState, VolumeId,
};
use std::collections::BTreeMap;

use crate::engine::SnapshotEngine;
use crate::error::{OpError, Precondition};
use crate::flow::Flow;
use crate::inspect::{Subject, VolumeRef};
use crate::report::{CreatedSnapshot, Outcome, Report};
use crate::wait::{poll_until, retry_while_busy};

/// Clones of one instance's volumes, in the order of its [`Subject`]
struct Clones {
    boot: BootVolumeId,
    blocks: Vec<VolumeId>,
}

impl<Cl, S, C> SnapshotEngine<Cl, S, C>
where
    Cl: CloudAdapter,
    S: ObjectStore,
    C: Clock,
{
    /// Snapshot the boot volume and attached block volumes of an instance.
    pub async fn create(
        &self,
        instance_id: &InstanceId,
        name: &str,
        description: &str,
    ) -> Result<Report, OpError> {
        let name = SnapshotName::parse(name)?;
        let instance_ids = [instance_id.clone()];
        let op = self.create_snapshots("create", &instance_ids, &name, description);
        self.locked(&instance_ids, op).await
    }

    /// Snapshot several instances at one consistent point in time. They
    /// must share a compartment and an availability domain.
    pub async fn create_multi(
        &self,
        instance_ids: &[InstanceId],
        name: &str,
        description: &str,
    ) -> Result<Report, OpError> {
        let name = SnapshotName::parse(name)?;
        let mut unique: Vec<InstanceId> = Vec::with_capacity(instance_ids.len());
        for id in instance_ids {
            if !unique.contains(id) {
                unique.push(id.clone());
            }
        }
        if unique.is_empty() {
            return Err(Precondition::NoInstances.into());
        }
        let op = self.create_snapshots("create-multi", &unique, &name, description);
        self.locked(&unique, op).await
    }

    async fn create_snapshots(
        &self,
        operation: &'static str,
        instance_ids: &[InstanceId],
        name: &SnapshotName,
        description: &str,
    ) -> Result<Report, OpError> {
        let mut flow = Flow::new(operation);

        let mut records: Vec<SnapshotRecord> = Vec::with_capacity(instance_ids.len());
        for instance_id in instance_ids {
            let record = self.load_record(instance_id).await?;
            if record.contains(name.as_str()) {
                return Err(Precondition::NameInUse {
                    instance_id: instance_id.clone(),
                    name: name.to_string(),
                }
                .into());
            }
            records.push(record);
        }

        let mut instances = Vec::with_capacity(instance_ids.len());
        for instance_id in instance_ids {
            instances.push(self.live_instance(instance_id).await?);
        }
        if let Some((first, rest)) = instances.split_first() {
            if let Some(other) = rest.iter().find(|i| {
                i.compartment_id != first.compartment_id
                    || i.availability_domain != first.availability_domain
            }) {
                return Err(Precondition::MixedPlacement(other.id.clone()).into());
            }
        }
        let mut subjects = Vec::with_capacity(instances.len());
        for instance in instances {
            subjects.push(self.inspect(instance).await?);
        }

        let mut groups = Vec::new();
        let cloned = self.clone_volumes(&mut flow, &mut groups, &subjects, name).await;
        self.delete_groups(&mut flow, &groups).await;
        let (clones, date_time) = cloned.map_err(|e| flow.absorb(e))?;

        let tag_key = name.tag_key();
        let mut tagged = Vec::with_capacity(subjects.len());
        for subject in &subjects {
            let instance = &subject.instance;
            let mut tags = instance.freeform_tags.clone();
            tags.insert(tag_key.clone(), date_time.clone());
            match self.cloud.update_instance_tags(&instance.id, &tags).await {
                Ok(()) => {
                    tracing::info!(instance = %instance.id, snapshot = %name, "tagged instance");
                    tagged.push(true);
                }
                Err(e) => {
                    flow.residue("tag instance", &instance.id, e);
                    tagged.push(false);
                }
            }
        }

        let mut pending: Vec<(SnapshotRecord, Snapshot, bool)> = Vec::with_capacity(subjects.len());
        for (((subject, clones), record), tagged) in
            subjects.iter().zip(clones).zip(records).zip(tagged)
        {
            let snapshot = Snapshot {
                name: name.to_string(),
                description: description.to_string(),
                date_time: date_time.clone(),
                boot_volume: BootVolumeRef {
                    name: subject.boot_volume.display_name.clone(),
                    cloned_id: clones.boot,
                },
                block_volumes: subject
                    .block_volumes
                    .iter()
                    .zip(clones.blocks)
                    .map(|((attachment, volume), cloned_id)| BlockVolumeRef {
                        name: volume.display_name.clone(),
                        cloned_id,
                        device: attachment.device.clone(),
                        attachment_type: attachment.attachment_type.clone(),
                        display_name: attachment.display_name.clone(),
                        is_read_only: attachment.is_read_only.unwrap_or(false),
                        is_shareable: attachment.is_shareable.unwrap_or(false),
                    })
                    .collect(),
            };
            pending.push((record, snapshot, tagged));
        }

        let mut created = Vec::with_capacity(pending.len());
        for i in 0..pending.len() {
            let (record, snapshot, _) = &mut pending[i];
            let saved = match record.push(snapshot.clone()) {
                Ok(()) => self.records.save(record).await.map_err(OpError::from),
                Err(e) => Err(Precondition::NameInUse {
                    instance_id: record.instance_id.clone(),
                    name: e.0,
                }
                .into()),
            };
            if let Err(e) = saved {
                for (record, snapshot, tagged) in &pending[i..] {
                    unrecorded(&mut flow, &record.instance_id, snapshot, *tagged, &tag_key);
                }
                return Err(flow.fail("save snapshot record", e));
            }
            tracing::info!(instance = %record.instance_id, snapshot = %name, "saved snapshot");
            created.push(CreatedSnapshot {
                instance_id: record.instance_id.clone(),
                snapshot: snapshot.clone(),
            });
        }

        Ok(flow.finish(Outcome::Created { snapshots: created }))
    }

    /// Clone every subject's volumes through temporary volume groups, then
    /// rename and tag the clones. Returns the clones and the tag value.
    ///
    /// Groups created along the way are pushed onto `groups`, also on error.
    async fn clone_volumes(
        &self,
        flow: &mut Flow,
        groups: &mut Vec<VolumeGroupId>,
        subjects: &[Subject],
        name: &SnapshotName,
    ) -> Result<(Vec<Clones>, String), OpError> {
        let Some(first) = subjects.first() else {
            return Err(Precondition::NoInstances.into());
        };
        let placement = |display_name: String, source_details: VolumeGroupSource| {
            CreateVolumeGroupDetails {
                availability_domain: first.instance.availability_domain.clone(),
                compartment_id: first.instance.compartment_id.clone(),
                display_name,
                source_details,
            }
        };

        let volume_ids: Vec<String> = subjects
            .iter()
            .flat_map(|s| {
                std::iter::once(s.boot_volume.id.to_string())
                    .chain(s.block_volumes.iter().map(|(a, _)| a.volume_id.to_string()))
            })
            .collect();
        tracing::info!(snapshot = %name, volumes = volume_ids.len(), "creating temporary volume group");
        let source = self
            .cloud
            .create_volume_group(&placement(
                format!("{}_tempo_source", name.tag_key()),
                VolumeGroupSource::Volumes { volume_ids },
            ))
            .await
            .map_err(|e| flow.cloud("create volume group", e))?;
        flow.mutated();
        groups.push(source.id.clone());

        tracing::info!(snapshot = %name, volume_group = %source.id, "cloning temporary volume group");
        let details = placement(
            format!("{}_tempo_cloned", name.tag_key()),
            VolumeGroupSource::Clone { volume_group_id: source.id.clone() },
        );
        let cloud = &self.cloud;
        let details = &details;
        let cloned = retry_while_busy(self.config.clone_wait, move || async move {
            cloud.create_volume_group(details).await
        })
        .await
        .map_err(|e| flow.wait("clone volume group", "the volume group clone to start", e))?;
        groups.push(cloned.id.clone());

        tracing::info!(volume_group = %cloned.id, "waiting for clone to complete");
        let group_id = &cloned.id;
        let settled: VolumeGroup = poll_until(self.config.clone_wait, move || async move {
            let group = cloud.get_volume_group(group_id).await?;
            Ok::<_, AdapterError>(
                (group.lifecycle_state != VolumeGroupState::Provisioning).then_some(group),
            )
        })
        .await
        .map_err(|e| flow.wait("wait for clone", "the volume group clone to complete", e))?;
        if settled.lifecycle_state != VolumeGroupState::Available {
            return Err(flow.fail(
                "wait for clone",
                OpError::CloneFailed {
                    volume_group: settled.id.clone(),
                    state: settled.lifecycle_state,
                },
            ));
        }
        tracing::info!(volume_group = %cloned.id, "clone completed");

        let cloned_ids =
            if settled.volume_ids.is_empty() { &cloned.volume_ids } else { &settled.volume_ids };
        let mut by_source: BTreeMap<String, VolumeRef> = BTreeMap::new();
        for cloned_id in cloned_ids {
            let volume = VolumeRef::parse(cloned_id);
            let source_id = match self.source_of(&volume).await {
                Ok(id) => id,
                Err(e) => return Err(unresolved(flow, cloned_ids, e)),
            };
            by_source.insert(source_id, volume);
        }

        let date_time = format_date_time(self.clock.utc_now());
        let tag_key = name.tag_key();
        let mut all = Vec::with_capacity(subjects.len());
        for subject in subjects {
            let boot = match by_source.get(subject.boot_volume.id.as_str()) {
                Some(VolumeRef::Boot(id)) => id.clone(),
                _ => {
                    let e = OpError::SourceUnresolved(subject.boot_volume.id.to_string());
                    return Err(unresolved(flow, cloned_ids, e));
                }
            };
            let boot_ref = VolumeRef::Boot(boot.clone());
            let boot_name = &subject.boot_volume.display_name;
            self.tag_clone(flow, &boot_ref, boot_name, name, &tag_key, &date_time).await;

            let mut blocks = Vec::with_capacity(subject.block_volumes.len());
            for (attachment, volume) in &subject.block_volumes {
                let clone = match by_source.get(attachment.volume_id.as_str()) {
                    Some(VolumeRef::Block(id)) => id.clone(),
                    _ => {
                        let e = OpError::SourceUnresolved(attachment.volume_id.to_string());
                        return Err(unresolved(flow, cloned_ids, e));
                    }
                };
                let clone_ref = VolumeRef::Block(clone.clone());
                self.tag_clone(flow, &clone_ref, &volume.display_name, name, &tag_key, &date_time)
                    .await;
                blocks.push(clone);
            }
            all.push(Clones { boot, blocks });
        }
        Ok((all, date_time))
    }

    async fn tag_clone(
        &self,
        flow: &mut Flow,
        volume: &VolumeRef,
        source_name: &str,
        name: &SnapshotName,
        tag_key: &str,
        date_time: &str,
    ) {
        let new_name = snapshot_volume_name(source_name, name.as_str());
        let result = self
            .update_volume(volume, Some(new_name.clone()), |tags| {
                tags.insert(tag_key.to_string(), date_time.to_string());
            })
            .await;
        match result {
            Ok(()) => tracing::info!(volume = %volume, name = %new_name, "renamed and tagged clone"),
            Err(e) => flow.residue("tag cloned volume", volume, e),
        }
    }

    /// Delete temporary volume groups; their member volumes are kept.
    async fn delete_groups(&self, flow: &mut Flow, groups: &[VolumeGroupId]) {
        for group in groups {
            match self.cloud.delete_volume_group(group).await {
                Ok(()) => tracing::info!(volume_group = %group, "deleted temporary volume group"),
                Err(e) => flow.residue("delete volume group", group, e),
            }
        }
    }
}

const UNRECORDED: &str = "no snapshot record refers to it";

/// Abort while resolving clones. Every clone is left behind.
fn unresolved(flow: &mut Flow, cloned_ids: &[String], error: OpError) -> OpError {
    for cloned_id in cloned_ids {
        flow.residue("delete unrecorded clone", cloned_id, UNRECORDED);
    }
    flow.fail("resolve cloned volumes", error)
}

/// Residue for a snapshot whose record could not be saved: its clones and
/// the instance tag, if set.
fn unrecorded(
    flow: &mut Flow,
    instance_id: &InstanceId,
    snapshot: &Snapshot,
    tagged: bool,
    tag_key: &str,
) {
    flow.residue("delete unrecorded clone", &snapshot.boot_volume.cloned_id, UNRECORDED);
    for block in &snapshot.block_volumes {
        flow.residue("delete unrecorded clone", &block.cloned_id, UNRECORDED);
    }
    if tagged {
        flow.residue("remove instance tag", format!("{instance_id} ({tag_key})"), UNRECORDED);
    }
}

#[cfg(test)]
#[path = "create_tests.rs"]
mod tests;
