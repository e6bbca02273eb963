// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use ocisnap_adapters::{CloudAdapter, Instance, ObjectStore};
use ocisnap_core::{Clock, CompartmentId, InstanceId, Snapshot};
use serde::Serialize;

use crate::engine::SnapshotEngine;
use crate::error::OpError;

/// Snapshots of one instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstanceListing {
    pub instance_id: InstanceId,
    pub display_name: String,
    pub compartment_id: CompartmentId,
    pub snapshots: Vec<Snapshot>,
}

impl InstanceListing {
    fn new(instance: Instance, snapshots: Vec<Snapshot>) -> Self {
        Self {
            instance_id: instance.id,
            display_name: instance.display_name,
            compartment_id: instance.compartment_id,
            snapshots,
        }
    }
}

/// Snapshots of every instance with a record in the bucket
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Listing {
    pub instances: Vec<InstanceListing>,
    /// Records deleted because their instance is gone
    pub removed: Vec<InstanceId>,
}

impl<Cl, S, C> SnapshotEngine<Cl, S, C>
where
    Cl: CloudAdapter,
    S: ObjectStore,
    C: Clock,
{
    pub async fn list(&self, instance_id: &InstanceId) -> Result<InstanceListing, OpError> {
        self.records.check_bucket().await?;
        let instance = self.live_instance(instance_id).await?;
        let record = self.load_record(instance_id).await?;
        Ok(InstanceListing::new(instance, record.snapshots))
    }

    /// List every record. Records of instances that no longer exist, or are
    /// terminating/terminated, are deleted along the way.
    pub async fn list_all(&self) -> Result<Listing, OpError> {
        self.records.check_bucket().await?;
        let mut listing = Listing::default();
        for instance_id in self.records.list_instance_ids().await? {
            let instance = match self.cloud.get_instance(&instance_id).await {
                Ok(instance) if !instance.lifecycle_state.is_gone() => instance,
                Ok(_) => {
                    self.forget(&instance_id, &mut listing).await;
                    continue;
                }
                Err(e) if e.is_not_found() => {
                    self.forget(&instance_id, &mut listing).await;
                    continue;
                }
                Err(e) => {
                    tracing::warn!(instance = %instance_id, error = %e, "cannot get instance, skipping");
                    continue;
                }
            };
            let record = self.load_record(&instance_id).await?;
            if !record.is_empty() {
                listing.instances.push(InstanceListing::new(instance, record.snapshots));
            }
        }
        Ok(listing)
    }

    async fn forget(&self, instance_id: &InstanceId, listing: &mut Listing) {
        tracing::info!(instance = %instance_id, "instance is gone, deleting its snapshot record");
        self.records.delete(instance_id).await;
        listing.removed.push(instance_id.clone());
    }
}

#[cfg(test)]
#[path = "list_tests.rs"]
mod tests;
