// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::launch_details;
use crate::test_helpers::{snapshot, Harness};
use crate::{OpError, Outcome, Precondition, Report};
use ocisnap_adapters::{AdapterError, CloudCall, InstanceSeed};
use ocisnap_core::{test_support, InstanceId, InstanceState, IpLifetime};
use ocisnap_storage::record_key;

fn new_instance_id(report: &Report) -> InstanceId {
    match &report.outcome {
        Outcome::RolledBack { new_instance_id, .. } => new_instance_id.clone(),
        other => panic!("unexpected outcome {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn rollback_replaces_the_instance() {
    let h = Harness::new();
    let web = h.web01();
    snapshot(&h, &web.instance_id, "preupgrade").await;
    let snap = h.record(&web.instance_id).await.snapshots.remove(0);

    let report = h.engine.rollback(&web.instance_id, "preupgrade").await.unwrap();

    assert!(report.is_clean(), "{:?}", report.residue);
    let new_id = new_instance_id(&report);
    assert_ne!(new_id, web.instance_id);
    assert_eq!(h.cloud.instance(&new_id).unwrap().lifecycle_state, InstanceState::Running);
    assert_eq!(
        h.cloud.instance(&web.instance_id).unwrap().lifecycle_state,
        InstanceState::Terminated
    );

    // Old volumes are gone
    assert!(h.cloud.boot_volume(&web.boot_volume_id).is_none());
    assert!(web.volume_ids.iter().all(|id| h.cloud.volume(id).is_none()));

    // Clones took their place under the original names
    let boot = h.cloud.boot_volume(&snap.boot_volume.cloned_id).unwrap();
    assert_eq!(boot.display_name, "web01 (Boot Volume)");
    assert!(boot.freeform_tags.is_empty());
    let attached = h.cloud.attached_volumes(&new_id);
    assert_eq!(attached.len(), 2);
    assert_eq!(attached[0].volume_id, snap.block_volumes[0].cloned_id);
    assert_eq!(attached[0].device.as_deref(), Some("/dev/oracleoci/oraclevdb"));
    assert_eq!(attached[0].display_name.as_deref(), Some("data-attachment"));
    let data = h.cloud.volume(&snap.block_volumes[0].cloned_id).unwrap();
    assert_eq!(data.display_name, "data");
    assert!(data.freeform_tags.is_empty());
}

#[tokio::test(start_paused = true)]
async fn rollback_moves_the_record_to_the_new_instance() {
    let h = Harness::new();
    let web = h.web01();
    snapshot(&h, &web.instance_id, "preupgrade").await;
    snapshot(&h, &web.instance_id, "postupgrade").await;

    let report = h.engine.rollback(&web.instance_id, "preupgrade").await.unwrap();

    let new_id = new_instance_id(&report);
    let record = h.record(&new_id).await;
    assert_eq!(record.names().collect::<Vec<_>>(), ["postupgrade"]);
    assert!(!h.objects.contains(&record_key(&web.instance_id)));
    assert!(h.locks().is_empty());
}

#[tokio::test(start_paused = true)]
async fn rollback_to_the_only_snapshot_leaves_no_record() {
    let h = Harness::new();
    let web = h.web01();
    snapshot(&h, &web.instance_id, "preupgrade").await;

    h.engine.rollback(&web.instance_id, "preupgrade").await.unwrap();

    assert!(h.objects.keys().is_empty());
}

#[tokio::test(start_paused = true)]
async fn rollback_keeps_the_reserved_public_ip() {
    let h = Harness::new();
    let web = h.cloud.seed(InstanceSeed::new("web02").public_ip(IpLifetime::Reserved));
    snapshot(&h, &web.instance_id, "preupgrade").await;

    let report = h.engine.rollback(&web.instance_id, "preupgrade").await.unwrap();

    assert!(report.is_clean(), "{:?}", report.residue);
    let new_id = new_instance_id(&report);
    let public_ip_id = web.public_ip_id.unwrap();
    let public_ip = h.cloud.public_ip(&public_ip_id).unwrap();
    let private_ip = h.cloud.primary_private_ip(&new_id).unwrap();
    assert_eq!(public_ip.private_ip_id, Some(private_ip.id));
    assert!(h.calls().iter().any(|c| matches!(c, CloudCall::AssignPublicIp { .. })));
}

#[tokio::test(start_paused = true)]
async fn rollback_relaunches_with_the_same_settings() {
    let h = Harness::new();
    let web = h.cloud.seed(InstanceSeed::new("web02").tag("team", "ops"));
    snapshot(&h, &web.instance_id, "preupgrade").await;
    let before = h.cloud.instance(&web.instance_id).unwrap();

    h.engine.rollback(&web.instance_id, "preupgrade").await.unwrap();

    let launches = h.cloud.launches();
    assert_eq!(launches.len(), 1);
    let launch = &launches[0];
    assert_eq!(launch.display_name, "web02");
    assert_eq!(launch.shape, before.shape);
    assert_eq!(launch.fault_domain, before.fault_domain);
    assert_eq!(launch.metadata, before.metadata);
    assert_eq!(launch.freeform_tags.get("team").map(String::as_str), Some("ops"));
    assert!(!launch.freeform_tags.contains_key("snapshot_preupgrade"));
    assert!(!launch.create_vnic_details.assign_public_ip);
    assert_eq!(launch.create_vnic_details.hostname_label.as_deref(), Some("web02"));
}

#[test]
fn launch_details_copy_the_primary_vnic() {
    let h = Harness::new();
    let web = h.cloud.seed(InstanceSeed::new("web02").tag("snapshot_preupgrade", "x"));
    let instance = h.cloud.instance(&web.instance_id).unwrap();
    let vnic = ocisnap_adapters::Vnic {
        id: web.vnic_id.clone(),
        display_name: Some("web02".into()),
        hostname_label: Some("web02".into()),
        is_primary: Some(true),
        private_ip: Some("10.0.0.7".into()),
        public_ip: Some("203.0.113.10".into()),
        subnet_id: ocisnap_core::SubnetId::new("ocid1.subnet.oc1..app"),
        nsg_ids: vec!["ocid1.networksecuritygroup.oc1..web".into()],
        skip_source_dest_check: Some(true),
        freeform_tags: Default::default(),
        defined_tags: Default::default(),
    };
    let snapshot = ocisnap_core::Snapshot::builder().build();

    let details = launch_details(&instance, &vnic, &snapshot);

    assert!(details.freeform_tags.is_empty());
    assert_eq!(details.create_vnic_details.private_ip.as_deref(), Some("10.0.0.7"));
    assert_eq!(details.create_vnic_details.skip_source_dest_check, Some(true));
    assert_eq!(details.create_vnic_details.nsg_ids, vnic.nsg_ids);
    let ocisnap_adapters::InstanceSourceDetails::BootVolume { boot_volume_id } =
        &details.source_details;
    assert_eq!(*boot_volume_id, snapshot.boot_volume.cloned_id);
}

#[tokio::test(start_paused = true)]
async fn ephemeral_public_ip_is_refused_before_terminating() {
    let h = Harness::new();
    let web = h.cloud.seed(InstanceSeed::new("web02").public_ip(IpLifetime::Ephemeral));
    h.engine
        .records
        .save(&test_support::record(&web.instance_id, &["preupgrade"]))
        .await
        .unwrap();

    let err = h.engine.rollback(&web.instance_id, "preupgrade").await.unwrap_err();

    assert!(matches!(err, OpError::Precondition(Precondition::EphemeralPublicIp(_))), "{err}");
    assert!(h.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn multiple_vnics_are_refused() {
    let h = Harness::new();
    let web = h.cloud.seed(InstanceSeed::new("web02").extra_vnics(1));
    snapshot(&h, &web.instance_id, "preupgrade").await;

    let err = h.engine.rollback(&web.instance_id, "preupgrade").await.unwrap_err();

    assert!(matches!(
        err,
        OpError::Precondition(Precondition::MultipleVnics { count: 2, .. })
    ));
    assert!(h.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn unknown_snapshot_is_refused() {
    let h = Harness::new();
    let web = h.web01();

    let err = h.engine.rollback(&web.instance_id, "preupgrade").await.unwrap_err();

    assert!(matches!(err, OpError::Precondition(Precondition::SnapshotNotFound { .. })));
    assert!(h.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn failed_attach_is_residue() {
    let h = Harness::new();
    let web = h.web01();
    snapshot(&h, &web.instance_id, "preupgrade").await;
    let snap = h.record(&web.instance_id).await.snapshots.remove(0);
    let logs = &snap.block_volumes[1].cloned_id;
    h.cloud.fail_on("attach_volume", logs, AdapterError::Conflict("busy".into()));

    let report = h.engine.rollback(&web.instance_id, "preupgrade").await.unwrap();

    assert_eq!(report.residue.len(), 1);
    assert_eq!(report.residue[0].step, "attach block volume");
    assert_eq!(report.residue[0].resource, logs.to_string());
    assert_eq!(h.cloud.attached_volumes(&new_instance_id(&report)).len(), 1);
}

#[tokio::test(start_paused = true)]
async fn failed_launch_aborts_and_keeps_the_record() {
    let h = Harness::new();
    let web = h.web01();
    snapshot(&h, &web.instance_id, "preupgrade").await;
    h.cloud.fail_on("launch_instance", "web01", AdapterError::Auth("quota".into()));

    let err = h.engine.rollback(&web.instance_id, "preupgrade").await.unwrap_err();

    assert!(matches!(err, OpError::Aborted { step: "launch instance", .. }), "{err}");
    assert_eq!(h.record(&web.instance_id).await.snapshots.len(), 1);
    assert!(h.locks().is_empty());
}

#[tokio::test(start_paused = true)]
async fn instance_that_never_terminates_times_out() {
    let h = Harness::new();
    let web = h.web01();
    snapshot(&h, &web.instance_id, "preupgrade").await;
    h.cloud.set_settle_polls(10_000);

    let err = h.engine.rollback(&web.instance_id, "preupgrade").await.unwrap_err();

    assert!(matches!(err.root(), OpError::Timeout { .. }), "{err}");
    assert!(h.cloud.launches().is_empty());
}
