// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Snapshot records: the JSON document kept per compute instance.
//!
//! ```json
//! {
//!   "instance_id": "ocid1.instance...",
//!   "snapshots": [
//!     {
//!       "name": "preupgrade",
//!       "description": "before patching",
//!       "date_time": "2026/10/19_08:00:00",
//!       "boot_volume": { "name": "web01 (Boot Volume)", "cloned_id": "ocid1.bootvolume..." },
//!       "block_volumes": [ { "name": "data", "cloned_id": "ocid1.volume...", ... } ]
//!     }
//!   ]
//! }
//! ```
//!
//! The order of `snapshots` is creation order. Names are unique within a record.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::id::{BootVolumeId, InstanceId, VolumeId};

/// All snapshots of one compute instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub instance_id: InstanceId,
    #[serde(default)]
    pub snapshots: Vec<Snapshot>,
}

/// A snapshot name collided with an existing one
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("a snapshot named '{0}' already exists")]
pub struct DuplicateSnapshot(pub String);

impl SnapshotRecord {
    pub fn empty(instance_id: InstanceId) -> Self {
        Self { instance_id, snapshots: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    pub fn find(&self, name: &str) -> Option<&Snapshot> {
        self.snapshots.iter().find(|s| s.name == name)
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut Snapshot> {
        self.snapshots.iter_mut().find(|s| s.name == name)
    }

    /// Append a snapshot, refusing a name that is already taken.
    pub fn push(&mut self, snapshot: Snapshot) -> Result<(), DuplicateSnapshot> {
        if self.contains(&snapshot.name) {
            return Err(DuplicateSnapshot(snapshot.name));
        }
        self.snapshots.push(snapshot);
        Ok(())
    }

    /// Remove and return the snapshot with the given name.
    pub fn remove(&mut self, name: &str) -> Option<Snapshot> {
        let pos = self.snapshots.iter().position(|s| s.name == name)?;
        Some(self.snapshots.remove(pos))
    }

    /// Rename a snapshot in place. The new name must be free.
    pub fn rename(&mut self, old: &str, new: &str) -> Result<bool, DuplicateSnapshot> {
        if old != new && self.contains(new) {
            return Err(DuplicateSnapshot(new.to_string()));
        }
        match self.find_mut(old) {
            Some(snapshot) => {
                snapshot.name = new.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Move the remaining snapshots under a new instance id (after rollback).
    pub fn reassign(self, instance_id: InstanceId) -> Self {
        Self { instance_id, snapshots: self.snapshots }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.snapshots.iter().map(|s| s.name.as_str())
    }
}

/// One point-in-time copy of an instance's boot and block volumes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub name: String,
    pub description: String,
    pub date_time: String,
    pub boot_volume: BootVolumeRef,
    #[serde(default)]
    pub block_volumes: Vec<BlockVolumeRef>,
}

impl Snapshot {
    pub fn tag_key(&self) -> String {
        crate::name::tag_key(&self.name)
    }
}

/// Cloned boot volume and the name of the boot volume it was cloned from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootVolumeRef {
    pub name: String,
    pub cloned_id: BootVolumeId,
}

/// Cloned block volume plus the attachment parameters needed to reattach it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockVolumeRef {
    pub name: String,
    pub cloned_id: VolumeId,
    pub device: Option<String>,
    pub attachment_type: String,
    pub display_name: Option<String>,
    pub is_read_only: bool,
    pub is_shareable: bool,
}

crate::builder! {
    pub struct SnapshotBuilder => Snapshot {
        into {
            name: String = "preupgrade",
            description: String = "before patching",
            date_time: String = "2026/01/01_00:00:00",
        }
        set {
            boot_volume: BootVolumeRef = BootVolumeRef {
                name: "web01 (Boot Volume)".to_string(),
                cloned_id: BootVolumeId::new("ocid1.bootvolume.oc1..clone0"),
            },
            block_volumes: Vec<BlockVolumeRef> = Vec::new(),
        }
    }
}

crate::builder! {
    pub struct BlockVolumeRefBuilder => BlockVolumeRef {
        into {
            name: String = "data",
            cloned_id: VolumeId = "ocid1.volume.oc1..clone1",
            attachment_type: String = "paravirtualized",
        }
        set {
            device: Option<String> = Some("/dev/oracleoci/oraclevdb".to_string()),
            display_name: Option<String> = None,
            is_read_only: bool = false,
            is_shareable: bool = false,
        }
    }
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
