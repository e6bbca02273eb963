// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read-only lookups shared by the operations, and the volume updates they
//! all perform on cloned volumes.

use ocisnap_adapters::{
    AdapterError, BootVolume, CloudAdapter, FreeformTags, Instance, ObjectStore, PublicIp,
    UpdateVolumeDetails, Vnic, Volume, VolumeAttachment,
};
use ocisnap_core::{
    ocid_kind, AttachmentState, BootVolumeId, Clock, InstanceId, IpLifetime, Snapshot,
    SnapshotRecord, VolumeId,
};
use std::fmt;

use crate::engine::SnapshotEngine;
use crate::error::{OpError, Precondition};

/// An instance and everything needed to snapshot or rebuild it
#[derive(Debug, Clone)]
pub(crate) struct Subject {
    pub instance: Instance,
    pub vnic: Vnic,
    /// Reserved public IP of the primary VNIC
    pub public_ip: Option<PublicIp>,
    pub boot_volume: BootVolume,
    /// Block volumes in state ATTACHED, with their attachment
    pub block_volumes: Vec<(VolumeAttachment, Volume)>,
}

/// A boot or block volume, told apart by its OCID kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum VolumeRef {
    Boot(BootVolumeId),
    Block(VolumeId),
}

impl VolumeRef {
    pub(crate) fn parse(id: &str) -> Self {
        if ocid_kind(id) == Some(BootVolumeId::KIND) {
            Self::Boot(BootVolumeId::new(id))
        } else {
            Self::Block(VolumeId::new(id))
        }
    }

    /// Cloned volumes of a snapshot, boot volume first
    pub(crate) fn all_of(snapshot: &Snapshot) -> Vec<(Self, &str)> {
        let boot = &snapshot.boot_volume;
        std::iter::once((Self::Boot(boot.cloned_id.clone()), boot.name.as_str()))
            .chain(
                snapshot
                    .block_volumes
                    .iter()
                    .map(|b| (Self::Block(b.cloned_id.clone()), b.name.as_str())),
            )
            .collect()
    }
}

impl fmt::Display for VolumeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boot(id) => f.write_str(id),
            Self::Block(id) => f.write_str(id),
        }
    }
}

impl<Cl, S, C> SnapshotEngine<Cl, S, C>
where
    Cl: CloudAdapter,
    S: ObjectStore,
    C: Clock,
{
    /// The instance, refusing missing and terminating/terminated ones.
    pub(crate) async fn live_instance(&self, instance_id: &InstanceId) -> Result<Instance, OpError> {
        let instance = match self.cloud.get_instance(instance_id).await {
            Ok(instance) => instance,
            Err(e) if e.is_not_found() => {
                return Err(Precondition::InstanceNotFound(instance_id.clone()).into())
            }
            Err(source) => return Err(OpError::Cloud { step: "get instance", source }),
        };
        if instance.lifecycle_state.is_gone() {
            return Err(Precondition::InstanceTerminated {
                instance_id: instance_id.clone(),
                state: instance.lifecycle_state,
            }
            .into());
        }
        Ok(instance)
    }

    pub(crate) async fn load_record(&self, instance_id: &InstanceId) -> Result<SnapshotRecord, OpError> {
        Ok(self.records.load(instance_id).await?)
    }

    /// The primary VNIC and the number of attached VNICs.
    pub(crate) async fn primary_vnic(&self, instance: &Instance) -> Result<(Vnic, usize), OpError> {
        let cloud = |source| OpError::Cloud { step: "get primary VNIC", source };
        let attachments = self
            .cloud
            .list_vnic_attachments(&instance.compartment_id, &instance.id)
            .await
            .map_err(cloud)?;
        let vnic_ids: Vec<_> = attachments
            .into_iter()
            .filter(|a| a.lifecycle_state == AttachmentState::Attached)
            .filter_map(|a| a.vnic_id)
            .collect();

        let mut first = None;
        for vnic_id in &vnic_ids {
            let vnic = self.cloud.get_vnic(vnic_id).await.map_err(cloud)?;
            if vnic.is_primary == Some(true) {
                return Ok((vnic, vnic_ids.len()));
            }
            first.get_or_insert(vnic);
        }
        match first {
            Some(vnic) => Ok((vnic, vnic_ids.len())),
            None => Err(cloud(AdapterError::NotFound(format!("VNIC of instance {}", instance.id)))),
        }
    }

    /// The public IP of a VNIC if it is reserved; ephemeral ones are refused.
    pub(crate) async fn reserved_public_ip(
        &self,
        instance_id: &InstanceId,
        vnic: &Vnic,
    ) -> Result<Option<PublicIp>, OpError> {
        let Some(address) = &vnic.public_ip else {
            return Ok(None);
        };
        let public_ip = self
            .cloud
            .get_public_ip_by_address(address)
            .await
            .map_err(|source| OpError::Cloud { step: "get public IP", source })?;
        if public_ip.lifetime == IpLifetime::Ephemeral {
            return Err(Precondition::EphemeralPublicIp(instance_id.clone()).into());
        }
        Ok(Some(public_ip))
    }

    pub(crate) async fn boot_volume(&self, instance: &Instance) -> Result<BootVolume, OpError> {
        let cloud = |source| OpError::Cloud { step: "get boot volume", source };
        let attachments = self
            .cloud
            .list_boot_volume_attachments(
                &instance.availability_domain,
                &instance.compartment_id,
                &instance.id,
            )
            .await
            .map_err(cloud)?;
        let attachment = attachments
            .into_iter()
            .find(|a| a.lifecycle_state == AttachmentState::Attached)
            .ok_or_else(|| {
                cloud(AdapterError::NotFound(format!("boot volume of instance {}", instance.id)))
            })?;
        self.cloud.get_boot_volume(&attachment.boot_volume_id).await.map_err(cloud)
    }

    /// Block volumes currently attached to the instance.
    pub(crate) async fn attached_volumes(
        &self,
        instance: &Instance,
    ) -> Result<Vec<(VolumeAttachment, Volume)>, OpError> {
        let cloud = |source| OpError::Cloud { step: "get block volumes", source };
        let attachments = self
            .cloud
            .list_volume_attachments(&instance.compartment_id, &instance.id)
            .await
            .map_err(cloud)?;
        let mut volumes = Vec::new();
        for attachment in attachments {
            if attachment.lifecycle_state != AttachmentState::Attached {
                continue;
            }
            let volume = self.cloud.get_volume(&attachment.volume_id).await.map_err(cloud)?;
            volumes.push((attachment, volume));
        }
        Ok(volumes)
    }

    /// Everything `create` needs about one instance, checking preconditions.
    pub(crate) async fn inspect(&self, instance: Instance) -> Result<Subject, OpError> {
        let (vnic, _) = self.primary_vnic(&instance).await?;
        let public_ip = self.reserved_public_ip(&instance.id, &vnic).await?;
        let boot_volume = self.boot_volume(&instance).await?;
        let block_volumes = self.attached_volumes(&instance).await?;
        tracing::info!(
            instance = %instance.id,
            boot_volume = %boot_volume.id,
            block_volumes = block_volumes.len(),
            "inspected instance"
        );
        Ok(Subject { instance, vnic, public_ip, boot_volume, block_volumes })
    }

    /// OCID of the volume a cloned volume was made from
    pub(crate) async fn source_of(&self, volume: &VolumeRef) -> Result<String, OpError> {
        let source = match volume {
            VolumeRef::Boot(id) => self.cloud.get_boot_volume(id).await.map(|v| v.source_details),
            VolumeRef::Block(id) => self.cloud.get_volume(id).await.map(|v| v.source_details),
        };
        match source {
            Ok(Some(source)) => Ok(source.id),
            Ok(None) => Err(OpError::SourceUnresolved(volume.to_string())),
            Err(e) => {
                tracing::warn!(volume = %volume, error = %e, "cannot read cloned volume");
                Err(OpError::SourceUnresolved(volume.to_string()))
            }
        }
    }

    /// Read-modify-write of a volume's freeform tags, optionally renaming it.
    pub(crate) async fn update_volume(
        &self,
        volume: &VolumeRef,
        display_name: Option<String>,
        edit: impl FnOnce(&mut FreeformTags),
    ) -> Result<(), AdapterError> {
        let mut tags = match volume {
            VolumeRef::Boot(id) => self.cloud.get_boot_volume(id).await?.freeform_tags,
            VolumeRef::Block(id) => self.cloud.get_volume(id).await?.freeform_tags,
        };
        edit(&mut tags);
        let update = UpdateVolumeDetails { display_name, freeform_tags: Some(tags) };
        match volume {
            VolumeRef::Boot(id) => self.cloud.update_boot_volume(id, &update).await,
            VolumeRef::Block(id) => self.cloud.update_volume(id, &update).await,
        }
    }

    pub(crate) async fn rename_volume(&self, volume: &VolumeRef, name: &str) -> Result<(), AdapterError> {
        let update = UpdateVolumeDetails::rename(name);
        match volume {
            VolumeRef::Boot(id) => self.cloud.update_boot_volume(id, &update).await,
            VolumeRef::Block(id) => self.cloud.update_volume(id, &update).await,
        }
    }

    /// Delete a volume; one that is already gone counts as deleted.
    pub(crate) async fn delete_volume(&self, volume: &VolumeRef) -> Result<(), AdapterError> {
        let result = match volume {
            VolumeRef::Boot(id) => self.cloud.delete_boot_volume(id).await,
            VolumeRef::Block(id) => self.cloud.delete_volume(id).await,
        };
        match result {
            Err(e) if e.is_not_found() => {
                tracing::info!(volume = %volume, "volume already deleted");
                Ok(())
            }
            other => other,
        }
    }
}

#[cfg(test)]
#[path = "inspect_tests.rs"]
mod tests;
