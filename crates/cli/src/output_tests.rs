// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use ocisnap_core::{BlockVolumeRef, CompartmentId, InstanceId};
use ocisnap_engine::{CreatedSnapshot, Residue};
use serial_test::serial;
use std::time::Duration;

fn plain() {
    std::env::set_var("NO_COLOR", "1");
}

fn web01() -> InstanceId {
    InstanceId::new("ocid1.instance.oc1..web01")
}

fn report(outcome: Outcome) -> Report {
    Report { operation: "create", outcome, residue: Vec::new(), elapsed: Duration::from_secs(125) }
}

fn snapshot_with_blocks(n: usize) -> Snapshot {
    Snapshot::builder().block_volumes(vec![BlockVolumeRef::builder().build(); n]).build()
}

#[test]
#[serial]
fn created_report() {
    plain();
    let report = report(Outcome::Created {
        snapshots: vec![CreatedSnapshot { instance_id: web01(), snapshot: snapshot_with_blocks(2) }],
    });

    assert_eq!(
        report_text(&report),
        "Created snapshot 'preupgrade' of instance ocid1.instance.oc1..web01 \
         (boot volume and 2 block volumes)\nDone in 2m 5s\n"
    );
}

#[test]
#[serial]
fn rollback_report_names_the_new_instance() {
    plain();
    let report = report(Outcome::RolledBack {
        instance_id: web01(),
        new_instance_id: InstanceId::new("ocid1.instance.oc1..web02"),
        snapshot: "preupgrade".into(),
    });

    let text = report_text(&report);

    assert!(text.contains("New instance: ocid1.instance.oc1..web02\n"), "{text}");
}

#[test]
#[serial]
fn residue_is_listed() {
    plain();
    let mut report = report(Outcome::Deleted { instance_id: web01(), snapshots: vec!["a".into()] });
    report.residue.push(Residue::new("delete cloned volume", "ocid1.volume.oc1..x", "conflict: busy"));

    let text = report_text(&report);

    assert!(text.contains("Left behind, to clean up by hand:\n"));
    assert!(text.contains("  - delete cloned volume (ocid1.volume.oc1..x): conflict: busy\n"));
}

#[test]
#[serial]
fn empty_listing() {
    plain();
    let listing = InstanceListing {
        instance_id: web01(),
        display_name: "web01".into(),
        compartment_id: CompartmentId::new("ocid1.compartment.oc1..prod"),
        snapshots: Vec::new(),
    };

    assert_eq!(
        listing_text(&listing),
        "Instance web01 (ocid1.instance.oc1..web01)\n  No snapshot found\n"
    );
}

#[test]
#[serial]
fn listing_shows_one_line_per_snapshot() {
    plain();
    let listing = InstanceListing {
        instance_id: web01(),
        display_name: "web01".into(),
        compartment_id: CompartmentId::new("ocid1.compartment.oc1..prod"),
        snapshots: vec![snapshot_with_blocks(1)],
    };

    let text = listing_text(&listing);

    assert!(text.ends_with("  preupgrade  2026/01/01_00:00:00  1 block volume(s)  before patching\n"));
}

#[test]
#[serial]
fn all_listings_mention_removed_records() {
    plain();
    let listing = Listing { instances: Vec::new(), removed: vec![web01()] };

    assert_eq!(
        all_listings_text(&listing),
        "No snapshot found\nRemoved snapshot record of deleted instance ocid1.instance.oc1..web01\n"
    );
}

#[test]
fn report_json_is_tagged_by_outcome() {
    let report = report(Outcome::Renamed {
        instance_id: web01(),
        old_name: "a".into(),
        new_name: "b".into(),
    });

    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["outcome"], "renamed");
    assert_eq!(json["new_name"], "b");
    assert_eq!(json["elapsed_secs"], 125);
}
