// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::VolumeRef;
use crate::test_helpers::Harness;
use crate::{OpError, Precondition};
use ocisnap_adapters::{AdapterError, InstanceSeed};
use ocisnap_core::{
    BlockVolumeRef, BootVolumeId, InstanceId, InstanceState, IpLifetime, Snapshot, VolumeId,
};
use yare::parameterized;

#[parameterized(
    boot = { "ocid1.bootvolume.oc1..abc", true },
    block = { "ocid1.volume.oc1..abc", false },
    unknown_kind = { "ocid1.image.oc1..abc", false },
)]
fn volume_ref_parse_by_kind(id: &str, boot: bool) {
    match VolumeRef::parse(id) {
        VolumeRef::Boot(parsed) => {
            assert!(boot);
            assert_eq!(parsed, BootVolumeId::new(id));
        }
        VolumeRef::Block(parsed) => {
            assert!(!boot);
            assert_eq!(parsed, VolumeId::new(id));
        }
    }
}

#[test]
fn all_of_lists_boot_volume_first() {
    let snapshot = Snapshot::builder()
        .block_volumes(vec![
            BlockVolumeRef::builder().name("data").cloned_id("ocid1.volume.oc1..d").build(),
            BlockVolumeRef::builder().name("logs").cloned_id("ocid1.volume.oc1..l").build(),
        ])
        .build();

    let all = VolumeRef::all_of(&snapshot);

    let names: Vec<&str> = all.iter().map(|(_, name)| *name).collect();
    assert_eq!(names, ["web01 (Boot Volume)", "data", "logs"]);
    assert!(matches!(all[0].0, VolumeRef::Boot(_)));
    assert_eq!(all[2].0, VolumeRef::Block(VolumeId::new("ocid1.volume.oc1..l")));
}

#[tokio::test]
async fn live_instance_maps_not_found() {
    let h = Harness::new();
    let err = h.engine.live_instance(&InstanceId::new("ocid1.instance.oc1..gone")).await.unwrap_err();
    assert!(matches!(err, OpError::Precondition(Precondition::InstanceNotFound(_))));
}

#[tokio::test]
async fn live_instance_refuses_terminating() {
    let h = Harness::new();
    let web = h.cloud.seed(InstanceSeed::new("web").state(InstanceState::Terminating));

    let err = h.engine.live_instance(&web.instance_id).await.unwrap_err();

    assert_eq!(err.to_string(), format!("compute instance {} is TERMINATING", web.instance_id));
}

#[tokio::test]
async fn live_instance_reports_other_cloud_errors() {
    let h = Harness::new();
    let web = h.web01();
    h.cloud.fail_next("get_instance", AdapterError::Auth("denied".into()));

    let err = h.engine.live_instance(&web.instance_id).await.unwrap_err();

    assert!(matches!(err, OpError::Cloud { step: "get instance", .. }));
}

#[tokio::test]
async fn primary_vnic_counts_attachments() {
    let h = Harness::new();
    let web = h.cloud.seed(InstanceSeed::new("web").extra_vnics(2));
    let instance = h.cloud.instance(&web.instance_id).unwrap();

    let (vnic, count) = h.engine.primary_vnic(&instance).await.unwrap();

    assert_eq!(vnic.id, web.vnic_id);
    assert_eq!(count, 3);
}

#[tokio::test]
async fn inspect_collects_volumes_and_reserved_ip() {
    let h = Harness::new();
    let web = h.cloud.seed(
        InstanceSeed::new("web").block_volume("data", None).public_ip(IpLifetime::Reserved),
    );
    let instance = h.cloud.instance(&web.instance_id).unwrap();

    let subject = h.engine.inspect(instance).await.unwrap();

    assert_eq!(subject.boot_volume.id, web.boot_volume_id);
    assert_eq!(subject.block_volumes.len(), 1);
    assert_eq!(subject.block_volumes[0].1.id, web.volume_ids[0]);
    assert_eq!(subject.public_ip.map(|p| p.id), web.public_ip_id);
}

#[tokio::test]
async fn inspect_refuses_ephemeral_ip() {
    let h = Harness::new();
    let web = h.cloud.seed(InstanceSeed::new("web").public_ip(IpLifetime::Ephemeral));
    let instance = h.cloud.instance(&web.instance_id).unwrap();

    let err = h.engine.inspect(instance).await.unwrap_err();

    assert!(matches!(
        err,
        OpError::Precondition(Precondition::EphemeralPublicIp(ref id)) if *id == web.instance_id
    ));
}

#[tokio::test]
async fn source_of_an_original_volume_is_unresolved() {
    let h = Harness::new();
    let web = h.web01();

    let err = h.engine.source_of(&VolumeRef::Block(web.volume_ids[0].clone())).await.unwrap_err();

    assert!(matches!(err, OpError::SourceUnresolved(_)));
}

#[tokio::test]
async fn deleting_a_missing_volume_succeeds() {
    let h = Harness::new();
    let volume = VolumeRef::Block(VolumeId::new("ocid1.volume.oc1..gone"));
    h.engine.delete_volume(&volume).await.unwrap();
}
