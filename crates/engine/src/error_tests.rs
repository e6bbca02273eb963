// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn missing_bucket_becomes_a_precondition() {
    let err = OpError::from(StoreError::BucketMissing("compute_snapshots".into()));
    assert!(matches!(err, OpError::Precondition(Precondition::BucketMissing(ref b)) if b == "compute_snapshots"));
}

#[test]
fn other_store_errors_stay_store_errors() {
    let err = OpError::from(StoreError::List(AdapterError::Auth("denied".into())));
    assert!(matches!(err, OpError::Store(StoreError::List(_))));
}

#[test]
fn root_looks_through_aborted() {
    let err = OpError::Aborted {
        step: "save snapshot record",
        source: Box::new(OpError::Timeout { what: "x".into(), waited: Duration::from_secs(90) }),
        residue: vec![Residue::new("delete volume group", "ocid1.volumegroup.oc1..a", "busy")],
    };
    assert!(matches!(err.root(), OpError::Timeout { .. }));
    assert_eq!(err.residue().len(), 1);
}

#[test]
fn timeout_message_uses_compact_duration() {
    let err = OpError::Timeout { what: "instance to be RUNNING".into(), waited: Duration::from_secs(125) };
    assert_eq!(err.to_string(), "timed out after 2m 5s waiting for instance to be RUNNING");
}

#[test]
fn invalid_name_message() {
    let err = OpError::from(NameError::InvalidChar(' '));
    assert_eq!(
        err.to_string(),
        "invalid snapshot name: snapshot name contains ' ' (allowed: letters, digits, '-' and '_')"
    );
}
