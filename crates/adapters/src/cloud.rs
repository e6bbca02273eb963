// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use async_trait::async_trait;
use ocisnap_core::{
    BootVolumeId, CompartmentId, InstanceId, PrivateIpId, PublicIpId, VnicId, VolumeGroupId,
    VolumeId,
};

use crate::error::AdapterError;
use crate::models::{
    AttachVolumeDetails, BootVolume, BootVolumeAttachment, CreateVolumeGroupDetails, FreeformTags,
    Instance, LaunchInstanceDetails, PrivateIp, PublicIp, UpdateVolumeDetails, Vnic,
    VnicAttachment, Volume, VolumeAttachment, VolumeGroup,
};

/// Adapter for the compute, block storage and virtual network control plane.
///
/// One method per API call used by the snapshot lifecycle. Implementations
/// retry transient failures themselves; anything returned as an error has
/// already exhausted that policy.
#[async_trait]
pub trait CloudAdapter: Clone + Send + Sync + 'static {
    // -- compute --

    async fn get_instance(&self, id: &InstanceId) -> Result<Instance, AdapterError>;

    /// Replace the instance's freeform tags
    async fn update_instance_tags(
        &self,
        id: &InstanceId,
        tags: &FreeformTags,
    ) -> Result<(), AdapterError>;

    async fn terminate_instance(
        &self,
        id: &InstanceId,
        preserve_boot_volume: bool,
    ) -> Result<(), AdapterError>;

    async fn launch_instance(
        &self,
        details: &LaunchInstanceDetails,
    ) -> Result<Instance, AdapterError>;

    async fn list_vnic_attachments(
        &self,
        compartment_id: &CompartmentId,
        instance_id: &InstanceId,
    ) -> Result<Vec<VnicAttachment>, AdapterError>;

    async fn list_boot_volume_attachments(
        &self,
        availability_domain: &str,
        compartment_id: &CompartmentId,
        instance_id: &InstanceId,
    ) -> Result<Vec<BootVolumeAttachment>, AdapterError>;

    async fn list_volume_attachments(
        &self,
        compartment_id: &CompartmentId,
        instance_id: &InstanceId,
    ) -> Result<Vec<VolumeAttachment>, AdapterError>;

    async fn attach_volume(
        &self,
        details: &AttachVolumeDetails,
    ) -> Result<VolumeAttachment, AdapterError>;

    // -- virtual network --

    async fn get_vnic(&self, id: &VnicId) -> Result<Vnic, AdapterError>;

    async fn list_private_ips(&self, vnic_id: &VnicId) -> Result<Vec<PrivateIp>, AdapterError>;

    async fn get_public_ip_by_address(&self, ip_address: &str) -> Result<PublicIp, AdapterError>;

    /// Move a reserved public IP onto another private IP
    async fn assign_public_ip(
        &self,
        id: &PublicIpId,
        private_ip_id: &PrivateIpId,
    ) -> Result<(), AdapterError>;

    // -- block storage --

    async fn get_boot_volume(&self, id: &BootVolumeId) -> Result<BootVolume, AdapterError>;

    async fn update_boot_volume(
        &self,
        id: &BootVolumeId,
        update: &UpdateVolumeDetails,
    ) -> Result<(), AdapterError>;

    async fn delete_boot_volume(&self, id: &BootVolumeId) -> Result<(), AdapterError>;

    async fn get_volume(&self, id: &VolumeId) -> Result<Volume, AdapterError>;

    async fn update_volume(
        &self,
        id: &VolumeId,
        update: &UpdateVolumeDetails,
    ) -> Result<(), AdapterError>;

    async fn delete_volume(&self, id: &VolumeId) -> Result<(), AdapterError>;

    async fn create_volume_group(
        &self,
        details: &CreateVolumeGroupDetails,
    ) -> Result<VolumeGroup, AdapterError>;

    async fn get_volume_group(&self, id: &VolumeGroupId) -> Result<VolumeGroup, AdapterError>;

    /// Delete the group only; member volumes are kept
    async fn delete_volume_group(&self, id: &VolumeGroupId) -> Result<(), AdapterError>;
}
