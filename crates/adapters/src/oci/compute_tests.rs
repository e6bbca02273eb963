// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::oci::test_util::{endpoints, http, signature_header};
use mockito::{Matcher, Server, ServerGuard};
use ocisnap_core::{InstanceState, VolumeGroupState};

const INSTANCE: &str = "ocid1.instance.oc1..web01";

fn cloud(server: &ServerGuard) -> OciCloud {
    OciCloud::new(http(), endpoints(server))
}

fn instance_json() -> serde_json::Value {
    json!({
        "id": INSTANCE,
        "displayName": "web01",
        "compartmentId": "ocid1.compartment.oc1..prod",
        "availabilityDomain": "Uocm:PHX-AD-1",
        "lifecycleState": "RUNNING",
        "shape": "VM.Standard.E4.Flex",
        "shapeConfig": { "ocpus": 2.0, "memoryInGBs": 32.0 },
        "freeformTags": { "snapshot_preupgrade": "before patching" }
    })
}

#[tokio::test]
async fn get_instance_decodes_model() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", format!("/20160918/instances/{INSTANCE}").as_str())
        .match_header("authorization", signature_header())
        .with_status(200)
        .with_body(instance_json().to_string())
        .create_async()
        .await;

    let instance = cloud(&server).get_instance(&InstanceId::new(INSTANCE)).await.unwrap();

    assert_eq!(instance.display_name, "web01");
    assert_eq!(instance.lifecycle_state, InstanceState::Running);
    assert_eq!(instance.freeform_tags["snapshot_preupgrade"], "before patching");
    mock.assert_async().await;
}

#[tokio::test]
async fn terminate_passes_preserve_flag() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("DELETE", format!("/20160918/instances/{INSTANCE}").as_str())
        .match_query(Matcher::UrlEncoded("preserveBootVolume".into(), "true".into()))
        .with_status(204)
        .create_async()
        .await;

    cloud(&server).terminate_instance(&InstanceId::new(INSTANCE), true).await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn update_instance_tags_replaces_freeform_tags() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("PUT", format!("/20160918/instances/{INSTANCE}").as_str())
        .match_body(Matcher::Json(json!({ "freeformTags": { "snapshot_a": "x" } })))
        .with_status(200)
        .with_body(instance_json().to_string())
        .create_async()
        .await;

    let tags = FreeformTags::from([("snapshot_a".to_string(), "x".to_string())]);
    cloud(&server).update_instance_tags(&InstanceId::new(INSTANCE), &tags).await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn list_vnic_attachments_filters_by_instance() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/20160918/vnicAttachments")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("compartmentId".into(), "ocid1.compartment.oc1..prod".into()),
            Matcher::UrlEncoded("instanceId".into(), INSTANCE.into()),
        ]))
        .with_status(200)
        .with_body(
            json!([{
                "id": "ocid1.vnicattachment.oc1..a",
                "instanceId": INSTANCE,
                "vnicId": "ocid1.vnic.oc1..v",
                "lifecycleState": "ATTACHED"
            }])
            .to_string(),
        )
        .create_async()
        .await;

    let attachments = cloud(&server)
        .list_vnic_attachments(
            &CompartmentId::new("ocid1.compartment.oc1..prod"),
            &InstanceId::new(INSTANCE),
        )
        .await
        .unwrap();

    assert_eq!(attachments.len(), 1);
    assert_eq!(attachments[0].vnic_id.as_ref().map(|v| v.as_str()), Some("ocid1.vnic.oc1..v"));
    mock.assert_async().await;
}

#[tokio::test]
async fn public_ip_lookup_posts_address() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/20160918/publicIps/actions/getByIpAddress")
        .match_body(Matcher::Json(json!({ "ipAddress": "203.0.113.7" })))
        .with_status(200)
        .with_body(
            json!({
                "id": "ocid1.publicip.oc1..p",
                "ipAddress": "203.0.113.7",
                "lifetime": "RESERVED",
                "privateIpId": "ocid1.privateip.oc1..old"
            })
            .to_string(),
        )
        .create_async()
        .await;

    let ip = cloud(&server).get_public_ip_by_address("203.0.113.7").await.unwrap();
    assert_eq!(ip.id.as_str(), "ocid1.publicip.oc1..p");
    mock.assert_async().await;
}

#[tokio::test]
async fn create_volume_group_sends_volume_ids() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/20160918/volumeGroups")
        .match_body(Matcher::PartialJson(json!({
            "sourceDetails": { "type": "volumeIds", "volumeIds": ["ocid1.bootvolume.oc1..b"] }
        })))
        .with_status(200)
        .with_body(
            json!({
                "id": "ocid1.volumegroup.oc1..g",
                "displayName": "g",
                "lifecycleState": "PROVISIONING",
                "volumeIds": []
            })
            .to_string(),
        )
        .create_async()
        .await;

    let details = CreateVolumeGroupDetails {
        availability_domain: "Uocm:PHX-AD-1".into(),
        compartment_id: CompartmentId::new("ocid1.compartment.oc1..prod"),
        display_name: "g".into(),
        source_details: crate::models::VolumeGroupSource::Volumes {
            volume_ids: vec!["ocid1.bootvolume.oc1..b".into()],
        },
    };
    let group = cloud(&server).create_volume_group(&details).await.unwrap();
    assert_eq!(group.lifecycle_state, VolumeGroupState::Provisioning);
    mock.assert_async().await;
}
