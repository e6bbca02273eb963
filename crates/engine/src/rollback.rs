// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! rollback: replace an instance by a new one booted from a snapshot.
//!
//! The instance is terminated together with its boot volume, relaunched
//! from the cloned boot volume with the same shape, placement and primary
//! VNIC settings, and the cloned block volumes are attached in place of
//! the old ones. The new instance has a new OCID, so the record moves.

use ocisnap_adapters::{
    AdapterError, AttachVolumeDetails, CloudAdapter, CreateVnicDetails, Instance,
    InstanceSourceDetails, LaunchInstanceDetails, ObjectStore, PublicIp, Vnic,
};
use ocisnap_core::{Clock, InstanceId, InstanceState, Snapshot};

use crate::engine::SnapshotEngine;
use crate::error::{OpError, Precondition};
use crate::flow::Flow;
use crate::inspect::VolumeRef;
use crate::report::{Outcome, Report};
use crate::wait::poll_until;

impl<Cl, S, C> SnapshotEngine<Cl, S, C>
where
    Cl: CloudAdapter,
    S: ObjectStore,
    C: Clock,
{
    /// Roll an instance back to a snapshot. Returns a report naming the
    /// replacement instance.
    pub async fn rollback(&self, instance_id: &InstanceId, name: &str) -> Result<Report, OpError> {
        let instance_ids = [instance_id.clone()];
        let op = self.rollback_instance(instance_id, name);
        self.locked(&instance_ids, op).await
    }

    async fn rollback_instance(
        &self,
        instance_id: &InstanceId,
        name: &str,
    ) -> Result<Report, OpError> {
        let mut flow = Flow::new("rollback");

        let instance = self.live_instance(instance_id).await?;
        let mut record = self.load_record(instance_id).await?;
        let snapshot = record.find(name).cloned().ok_or_else(|| Precondition::SnapshotNotFound {
            instance_id: instance_id.clone(),
            name: name.to_string(),
        })?;
        let (vnic, vnic_count) = self.primary_vnic(&instance).await?;
        if vnic_count != 1 {
            return Err(Precondition::MultipleVnics {
                instance_id: instance_id.clone(),
                count: vnic_count,
            }
            .into());
        }
        let public_ip = self.reserved_public_ip(instance_id, &vnic).await?;
        let old_volumes = self.attached_volumes(&instance).await?;

        tracing::info!(instance = %instance_id, snapshot = name, "terminating instance");
        self.cloud
            .terminate_instance(instance_id, false)
            .await
            .map_err(|e| flow.cloud("terminate instance", e))?;
        flow.mutated();
        self.wait_for_state(&mut flow, instance_id, InstanceState::Terminated).await?;

        let boot = VolumeRef::Boot(snapshot.boot_volume.cloned_id.clone());
        if let Err(e) = self.rename_volume(&boot, &snapshot.boot_volume.name).await {
            flow.residue("rename boot volume", &boot, e);
        }

        tracing::info!(boot_volume = %boot, "launching instance from cloned boot volume");
        let launched = self
            .cloud
            .launch_instance(&launch_details(&instance, &vnic, &snapshot))
            .await
            .map_err(|e| flow.cloud("launch instance", e))?;
        let new_instance_id = launched.id.clone();
        self.wait_for_state(&mut flow, &new_instance_id, InstanceState::Running).await?;
        tracing::info!(instance = %new_instance_id, "new instance running");

        for block in &snapshot.block_volumes {
            let volume = VolumeRef::Block(block.cloned_id.clone());
            let details = AttachVolumeDetails {
                attachment_type: block.attachment_type.clone(),
                instance_id: new_instance_id.clone(),
                volume_id: block.cloned_id.clone(),
                device: block.device.clone(),
                display_name: block.display_name.clone(),
                is_read_only: block.is_read_only,
                is_shareable: block.is_shareable,
            };
            match self.cloud.attach_volume(&details).await {
                Ok(_) => tracing::info!(volume = %volume, instance = %new_instance_id, "attached"),
                Err(e) => flow.residue("attach block volume", &volume, e),
            }
            if let Err(e) = self.rename_volume(&volume, &block.name).await {
                flow.residue("rename block volume", &volume, e);
            }
        }

        for (attachment, _) in &old_volumes {
            let volume = VolumeRef::Block(attachment.volume_id.clone());
            match self.delete_volume(&volume).await {
                Ok(()) => tracing::info!(volume = %volume, "deleted previous block volume"),
                Err(e) => flow.residue("delete previous block volume", &volume, e),
            }
        }

        let tag_key = snapshot.tag_key();
        for (volume, _) in VolumeRef::all_of(&snapshot) {
            let untagged = self
                .update_volume(&volume, None, |tags| {
                    tags.remove(&tag_key);
                })
                .await;
            if let Err(e) = untagged {
                flow.residue("untag cloned volume", &volume, e);
            }
        }

        if let Some(public_ip) = &public_ip {
            match self.move_public_ip(&launched, public_ip).await {
                Ok(()) => {
                    tracing::info!(public_ip = %public_ip.ip_address, "moved reserved public IP")
                }
                Err(e) => flow.residue("move reserved public IP", &public_ip.id, e),
            }
        }

        record.remove(name);
        let record = record.reassign(new_instance_id.clone());
        self.records
            .save(&record)
            .await
            .map_err(|e| flow.fail("save snapshot record", e.into()))?;
        self.records.delete(instance_id).await;

        Ok(flow.finish(Outcome::RolledBack {
            instance_id: instance_id.clone(),
            new_instance_id,
            snapshot: name.to_string(),
        }))
    }

    /// Poll an instance until it reaches `target`. A vanished instance
    /// counts as terminated.
    async fn wait_for_state(
        &self,
        flow: &mut Flow,
        instance_id: &InstanceId,
        target: InstanceState,
    ) -> Result<(), OpError> {
        tracing::info!(instance = %instance_id, state = %target, "waiting for instance");
        let cloud = &self.cloud;
        poll_until(self.config.instance_wait, move || async move {
            match cloud.get_instance(instance_id).await {
                Ok(instance) => Ok((instance.lifecycle_state == target).then_some(())),
                Err(e) if e.is_not_found() && target == InstanceState::Terminated => Ok(Some(())),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(|e| {
            flow.wait("wait for instance", format!("instance {instance_id} to be {target}"), e)
        })
    }

    /// Point a reserved public IP at the primary private IP of `instance`.
    async fn move_public_ip(&self, instance: &Instance, public_ip: &PublicIp) -> Result<(), OpError> {
        let (vnic, _) = self.primary_vnic(instance).await?;
        let cloud = |source| OpError::Cloud { step: "move reserved public IP", source };
        let private_ips = self.cloud.list_private_ips(&vnic.id).await.map_err(cloud)?;
        let private_ip = private_ips
            .iter()
            .find(|p| p.is_primary == Some(true))
            .or_else(|| private_ips.first())
            .ok_or_else(|| {
                cloud(AdapterError::NotFound(format!("private IP of VNIC {}", vnic.id)))
            })?;
        self.cloud.assign_public_ip(&public_ip.id, &private_ip.id).await.map_err(cloud)
    }
}

/// Launch request reproducing `instance` from the snapshot's boot volume.
/// The snapshot's own tag is dropped; no ephemeral public IP is assigned.
pub(crate) fn launch_details(
    instance: &Instance,
    vnic: &Vnic,
    snapshot: &Snapshot,
) -> LaunchInstanceDetails {
    let mut freeform_tags = instance.freeform_tags.clone();
    freeform_tags.remove(&snapshot.tag_key());
    LaunchInstanceDetails {
        availability_domain: instance.availability_domain.clone(),
        compartment_id: instance.compartment_id.clone(),
        display_name: instance.display_name.clone(),
        fault_domain: instance.fault_domain.clone(),
        shape: instance.shape.clone(),
        shape_config: instance.shape_config.clone(),
        metadata: instance.metadata.clone(),
        extended_metadata: instance.extended_metadata.clone(),
        freeform_tags,
        defined_tags: instance.defined_tags.clone(),
        create_vnic_details: CreateVnicDetails {
            assign_public_ip: false,
            subnet_id: vnic.subnet_id.clone(),
            display_name: vnic.display_name.clone(),
            hostname_label: vnic.hostname_label.clone(),
            private_ip: vnic.private_ip.clone(),
            nsg_ids: vnic.nsg_ids.clone(),
            skip_source_dest_check: vnic.skip_source_dest_check,
            freeform_tags: vnic.freeform_tags.clone(),
            defined_tags: vnic.defined_tags.clone(),
        },
        source_details: InstanceSourceDetails::BootVolume {
            boot_volume_id: snapshot.boot_volume.cloned_id.clone(),
        },
    }
}

#[cfg(test)]
#[path = "rollback_tests.rs"]
mod tests;
