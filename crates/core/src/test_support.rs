// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::{InstanceId, Snapshot, SnapshotRecord};

// ── Proptest strategies ─────────────────────────────────────────────────

/// Proptest strategies for snapshot records.
pub mod strategies {
    use crate::{BlockVolumeRef, BootVolumeId, BootVolumeRef, InstanceId, Snapshot, SnapshotRecord};
    use crate::VolumeId;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    fn arb_ocid(kind: &'static str) -> impl Strategy<Value = String> {
        "[a-z0-9]{12}".prop_map(move |s| format!("ocid1.{kind}.oc1..{s}"))
    }

    pub fn arb_block_volume() -> impl Strategy<Value = BlockVolumeRef> {
        (
            "[a-zA-Z0-9 _-]{1,20}",
            arb_ocid("volume"),
            proptest::option::of("/dev/oracleoci/oraclevd[b-z]"),
            prop_oneof![Just("iscsi".to_string()), Just("paravirtualized".to_string())],
            proptest::option::of("[a-z]{1,10}"),
            any::<bool>(),
            any::<bool>(),
        )
            .prop_map(
                |(name, cloned_id, device, attachment_type, display_name, ro, shareable)| {
                    BlockVolumeRef {
                        name,
                        cloned_id: VolumeId::new(cloned_id),
                        device,
                        attachment_type,
                        display_name,
                        is_read_only: ro,
                        is_shareable: shareable,
                    }
                },
            )
    }

    pub fn arb_snapshot(name: String) -> impl Strategy<Value = Snapshot> {
        (
            ".{0,40}",
            "20[0-9]{2}/[01][0-9]/[0-3][0-9]_[0-2][0-9]:[0-5][0-9]:[0-5][0-9]",
            "[a-zA-Z0-9 ()_-]{1,30}",
            arb_ocid("bootvolume"),
            proptest::collection::vec(arb_block_volume(), 0..4),
        )
            .prop_map(move |(description, date_time, boot_name, boot_id, block_volumes)| Snapshot {
                name: name.clone(),
                description,
                date_time,
                boot_volume: BootVolumeRef { name: boot_name, cloned_id: BootVolumeId::new(boot_id) },
                block_volumes,
            })
    }

    /// Records with 1..5 uniquely named snapshots.
    pub fn arb_snapshot_record() -> impl Strategy<Value = SnapshotRecord> {
        (arb_ocid("instance"), proptest::collection::btree_set("[a-z0-9_-]{1,12}", 1..5))
            .prop_flat_map(|(instance_id, names): (String, BTreeSet<String>)| {
                let snapshots: Vec<_> = names.into_iter().map(arb_snapshot).collect();
                (Just(instance_id), snapshots)
            })
            .prop_map(|(instance_id, snapshots)| SnapshotRecord {
                instance_id: InstanceId::new(instance_id),
                snapshots,
            })
    }
}

// ── Record factory functions ────────────────────────────────────────────

/// A record holding one default snapshot per name, in order.
pub fn record(instance_id: &str, names: &[&str]) -> SnapshotRecord {
    SnapshotRecord {
        instance_id: InstanceId::new(instance_id),
        snapshots: names.iter().map(|n| Snapshot::builder().name(*n).build()).collect(),
    }
}
