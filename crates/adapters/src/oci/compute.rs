// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use async_trait::async_trait;
use ocisnap_core::{
    BootVolumeId, CompartmentId, InstanceId, PrivateIpId, PublicIpId, VnicId, VolumeGroupId,
    VolumeId,
};
use reqwest::{Method, Url};
use serde_json::json;

use super::http::OciHttp;
use super::Endpoints;
use crate::cloud::CloudAdapter;
use crate::error::AdapterError;
use crate::models::{
    AttachVolumeDetails, BootVolume, BootVolumeAttachment, CreateVolumeGroupDetails, FreeformTags,
    Instance, LaunchInstanceDetails, PrivateIp, PublicIp, UpdateVolumeDetails, Vnic,
    VnicAttachment, Volume, VolumeAttachment, VolumeGroup,
};

/// Compute, block storage and virtual network clients over the core
/// services API.
#[derive(Debug, Clone)]
pub struct OciCloud {
    http: OciHttp,
    endpoints: Endpoints,
}

impl OciCloud {
    pub fn new(http: OciHttp, endpoints: Endpoints) -> Self {
        Self { http, endpoints }
    }

    fn url(&self, segments: &[&str]) -> Result<Url, AdapterError> {
        self.endpoints.core_url(segments)
    }

    fn query_url(&self, resource: &str, query: &[(&str, &str)]) -> Result<Url, AdapterError> {
        let mut url = self.url(&[resource])?;
        url.query_pairs_mut().extend_pairs(query);
        Ok(url)
    }
}

#[async_trait]
impl CloudAdapter for OciCloud {
    async fn get_instance(&self, id: &InstanceId) -> Result<Instance, AdapterError> {
        self.http.get(self.url(&["instances", id.as_str()])?).await
    }

    async fn update_instance_tags(
        &self,
        id: &InstanceId,
        tags: &FreeformTags,
    ) -> Result<(), AdapterError> {
        let url = self.url(&["instances", id.as_str()])?;
        self.http.send_unit(Method::PUT, url, Some(&json!({ "freeformTags": tags }))).await
    }

    async fn terminate_instance(
        &self,
        id: &InstanceId,
        preserve_boot_volume: bool,
    ) -> Result<(), AdapterError> {
        let mut url = self.url(&["instances", id.as_str()])?;
        url.query_pairs_mut()
            .append_pair("preserveBootVolume", if preserve_boot_volume { "true" } else { "false" });
        self.http.send_unit::<()>(Method::DELETE, url, None).await
    }

    async fn launch_instance(
        &self,
        details: &LaunchInstanceDetails,
    ) -> Result<Instance, AdapterError> {
        self.http.send_json(Method::POST, self.url(&["instances"])?, details).await
    }

    async fn list_vnic_attachments(
        &self,
        compartment_id: &CompartmentId,
        instance_id: &InstanceId,
    ) -> Result<Vec<VnicAttachment>, AdapterError> {
        let url = self.query_url(
            "vnicAttachments",
            &[("compartmentId", compartment_id.as_str()), ("instanceId", instance_id.as_str())],
        )?;
        self.http.list_all(url).await
    }

    async fn list_boot_volume_attachments(
        &self,
        availability_domain: &str,
        compartment_id: &CompartmentId,
        instance_id: &InstanceId,
    ) -> Result<Vec<BootVolumeAttachment>, AdapterError> {
        let url = self.query_url(
            "bootVolumeAttachments",
            &[
                ("availabilityDomain", availability_domain),
                ("compartmentId", compartment_id.as_str()),
                ("instanceId", instance_id.as_str()),
            ],
        )?;
        self.http.list_all(url).await
    }

    async fn list_volume_attachments(
        &self,
        compartment_id: &CompartmentId,
        instance_id: &InstanceId,
    ) -> Result<Vec<VolumeAttachment>, AdapterError> {
        let url = self.query_url(
            "volumeAttachments",
            &[("compartmentId", compartment_id.as_str()), ("instanceId", instance_id.as_str())],
        )?;
        self.http.list_all(url).await
    }

    async fn attach_volume(
        &self,
        details: &AttachVolumeDetails,
    ) -> Result<VolumeAttachment, AdapterError> {
        self.http.send_json(Method::POST, self.url(&["volumeAttachments"])?, details).await
    }

    async fn get_vnic(&self, id: &VnicId) -> Result<Vnic, AdapterError> {
        self.http.get(self.url(&["vnics", id.as_str()])?).await
    }

    async fn list_private_ips(&self, vnic_id: &VnicId) -> Result<Vec<PrivateIp>, AdapterError> {
        let url = self.query_url("privateIps", &[("vnicId", vnic_id.as_str())])?;
        self.http.list_all(url).await
    }

    async fn get_public_ip_by_address(&self, ip_address: &str) -> Result<PublicIp, AdapterError> {
        let url = self.url(&["publicIps", "actions", "getByIpAddress"])?;
        self.http.send_json(Method::POST, url, &json!({ "ipAddress": ip_address })).await
    }

    async fn assign_public_ip(
        &self,
        id: &PublicIpId,
        private_ip_id: &PrivateIpId,
    ) -> Result<(), AdapterError> {
        let url = self.url(&["publicIps", id.as_str()])?;
        self.http
            .send_unit(Method::PUT, url, Some(&json!({ "privateIpId": private_ip_id })))
            .await
    }

    async fn get_boot_volume(&self, id: &BootVolumeId) -> Result<BootVolume, AdapterError> {
        self.http.get(self.url(&["bootVolumes", id.as_str()])?).await
    }

    async fn update_boot_volume(
        &self,
        id: &BootVolumeId,
        update: &UpdateVolumeDetails,
    ) -> Result<(), AdapterError> {
        let url = self.url(&["bootVolumes", id.as_str()])?;
        self.http.send_unit(Method::PUT, url, Some(update)).await
    }

    async fn delete_boot_volume(&self, id: &BootVolumeId) -> Result<(), AdapterError> {
        let url = self.url(&["bootVolumes", id.as_str()])?;
        self.http.send_unit::<()>(Method::DELETE, url, None).await
    }

    async fn get_volume(&self, id: &VolumeId) -> Result<Volume, AdapterError> {
        self.http.get(self.url(&["volumes", id.as_str()])?).await
    }

    async fn update_volume(
        &self,
        id: &VolumeId,
        update: &UpdateVolumeDetails,
    ) -> Result<(), AdapterError> {
        let url = self.url(&["volumes", id.as_str()])?;
        self.http.send_unit(Method::PUT, url, Some(update)).await
    }

    async fn delete_volume(&self, id: &VolumeId) -> Result<(), AdapterError> {
        let url = self.url(&["volumes", id.as_str()])?;
        self.http.send_unit::<()>(Method::DELETE, url, None).await
    }

    async fn create_volume_group(
        &self,
        details: &CreateVolumeGroupDetails,
    ) -> Result<VolumeGroup, AdapterError> {
        self.http.send_json(Method::POST, self.url(&["volumeGroups"])?, details).await
    }

    async fn get_volume_group(&self, id: &VolumeGroupId) -> Result<VolumeGroup, AdapterError> {
        self.http.get(self.url(&["volumeGroups", id.as_str()])?).await
    }

    async fn delete_volume_group(&self, id: &VolumeGroupId) -> Result<(), AdapterError> {
        let url = self.url(&["volumeGroups", id.as_str()])?;
        self.http.send_unit::<()>(Method::DELETE, url, None).await
    }
}

#[cfg(test)]
#[path = "compute_tests.rs"]
mod tests;
