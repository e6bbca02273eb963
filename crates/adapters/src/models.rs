// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire models for the subset of the compute, block storage and virtual
//! network APIs the snapshot manager touches. Field names follow the REST
//! API (camelCase); unknown fields are ignored.

use ocisnap_core::{
    AttachmentState, BootVolumeId, CompartmentId, InstanceId, InstanceState, IpLifetime,
    PrivateIpId, PublicIpId, SubnetId, VnicId, VolumeGroupId, VolumeGroupState, VolumeId,
    VolumeState,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Freeform tags: flat key/value strings
pub type FreeformTags = BTreeMap<String, String>;

/// Defined tags: namespace -> key -> value
pub type DefinedTags = BTreeMap<String, BTreeMap<String, serde_json::Value>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    pub id: InstanceId,
    pub display_name: String,
    pub compartment_id: CompartmentId,
    pub availability_domain: String,
    pub lifecycle_state: InstanceState,
    #[serde(default)]
    pub fault_domain: Option<String>,
    pub shape: String,
    #[serde(default)]
    pub shape_config: Option<ShapeConfig>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    #[serde(default)]
    pub extended_metadata: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub freeform_tags: FreeformTags,
    #[serde(default)]
    pub defined_tags: DefinedTags,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocpus: Option<f32>,
    #[serde(default, rename = "memoryInGBs", skip_serializing_if = "Option::is_none")]
    pub memory_in_gbs: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VnicAttachment {
    pub id: String,
    pub instance_id: InstanceId,
    #[serde(default)]
    pub vnic_id: Option<VnicId>,
    pub lifecycle_state: AttachmentState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vnic {
    pub id: VnicId,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub hostname_label: Option<String>,
    #[serde(default)]
    pub is_primary: Option<bool>,
    #[serde(default)]
    pub private_ip: Option<String>,
    #[serde(default)]
    pub public_ip: Option<String>,
    pub subnet_id: SubnetId,
    #[serde(default)]
    pub nsg_ids: Vec<String>,
    #[serde(default)]
    pub skip_source_dest_check: Option<bool>,
    #[serde(default)]
    pub freeform_tags: FreeformTags,
    #[serde(default)]
    pub defined_tags: DefinedTags,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateIp {
    pub id: PrivateIpId,
    pub ip_address: String,
    #[serde(default)]
    pub is_primary: Option<bool>,
    #[serde(default)]
    pub vnic_id: Option<VnicId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicIp {
    pub id: PublicIpId,
    pub ip_address: String,
    pub lifetime: IpLifetime,
    #[serde(default)]
    pub private_ip_id: Option<PrivateIpId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BootVolumeAttachment {
    pub id: String,
    pub instance_id: InstanceId,
    pub boot_volume_id: BootVolumeId,
    pub lifecycle_state: AttachmentState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeAttachment {
    pub id: String,
    pub instance_id: InstanceId,
    pub volume_id: VolumeId,
    pub attachment_type: String,
    #[serde(default)]
    pub device: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub is_read_only: Option<bool>,
    #[serde(default)]
    pub is_shareable: Option<bool>,
    pub lifecycle_state: AttachmentState,
}

/// Where a volume was cloned from (`type` is `bootVolume`, `volume`, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeSource {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BootVolume {
    pub id: BootVolumeId,
    pub display_name: String,
    pub lifecycle_state: VolumeState,
    #[serde(default)]
    pub source_details: Option<VolumeSource>,
    #[serde(default)]
    pub freeform_tags: FreeformTags,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    pub id: VolumeId,
    pub display_name: String,
    pub lifecycle_state: VolumeState,
    #[serde(default)]
    pub source_details: Option<VolumeSource>,
    #[serde(default)]
    pub freeform_tags: FreeformTags,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeGroup {
    pub id: VolumeGroupId,
    pub display_name: String,
    pub lifecycle_state: VolumeGroupState,
    /// Members of the group: boot volume and block volume OCIDs mixed
    #[serde(default)]
    pub volume_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum VolumeGroupSource {
    #[serde(rename = "volumeIds", rename_all = "camelCase")]
    Volumes { volume_ids: Vec<String> },
    #[serde(rename = "volumeGroupId", rename_all = "camelCase")]
    Clone { volume_group_id: VolumeGroupId },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVolumeGroupDetails {
    pub availability_domain: String,
    pub compartment_id: CompartmentId,
    pub display_name: String,
    pub source_details: VolumeGroupSource,
}

/// Update of a boot or block volume; absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVolumeDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub freeform_tags: Option<FreeformTags>,
}

impl UpdateVolumeDetails {
    pub fn rename(display_name: impl Into<String>) -> Self {
        Self { display_name: Some(display_name.into()), freeform_tags: None }
    }

    pub fn tags(freeform_tags: FreeformTags) -> Self {
        Self { display_name: None, freeform_tags: Some(freeform_tags) }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachVolumeDetails {
    #[serde(rename = "type")]
    pub attachment_type: String,
    pub instance_id: InstanceId,
    pub volume_id: VolumeId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub is_read_only: bool,
    pub is_shareable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVnicDetails {
    pub assign_public_ip: bool,
    pub subnet_id: SubnetId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_ip: Option<String>,
    #[serde(default)]
    pub nsg_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_source_dest_check: Option<bool>,
    #[serde(default)]
    pub freeform_tags: FreeformTags,
    #[serde(default)]
    pub defined_tags: DefinedTags,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "sourceType")]
pub enum InstanceSourceDetails {
    #[serde(rename = "bootVolume", rename_all = "camelCase")]
    BootVolume { boot_volume_id: BootVolumeId },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchInstanceDetails {
    pub availability_domain: String,
    pub compartment_id: CompartmentId,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fault_domain: Option<String>,
    pub shape: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape_config: Option<ShapeConfig>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    #[serde(default)]
    pub extended_metadata: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub freeform_tags: FreeformTags,
    #[serde(default)]
    pub defined_tags: DefinedTags,
    pub create_vnic_details: CreateVnicDetails,
    pub source_details: InstanceSourceDetails,
}

#[cfg(test)]
#[path = "models_tests.rs"]
mod tests;
