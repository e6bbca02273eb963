// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine wired to in-memory fakes.

use ocisnap_adapters::{CloudCall, FakeCloud, FakeObjectStore, InstanceSeed, SeededInstance};
use ocisnap_core::{FakeClock, InstanceId, SnapshotRecord};

use crate::{EngineConfig, SnapshotEngine};

pub(crate) type TestEngine = SnapshotEngine<FakeCloud, FakeObjectStore, FakeClock>;

pub(crate) struct Harness {
    pub cloud: FakeCloud,
    pub objects: FakeObjectStore,
    pub clock: FakeClock,
    pub engine: TestEngine,
}

impl Harness {
    pub fn new() -> Self {
        let cloud = FakeCloud::new();
        let objects = FakeObjectStore::default();
        let clock = FakeClock::new();
        let engine = SnapshotEngine::new(
            cloud.clone(),
            objects.clone(),
            clock.clone(),
            EngineConfig::default(),
        );
        Self { cloud, objects, clock, engine }
    }

    /// An instance with one boot volume and two block volumes
    pub fn web01(&self) -> SeededInstance {
        self.cloud.seed(
            InstanceSeed::new("web01")
                .block_volume("data", Some("/dev/oracleoci/oraclevdb"))
                .block_volume("logs", None),
        )
    }

    pub async fn record(&self, instance_id: &InstanceId) -> SnapshotRecord {
        self.engine.records.load(instance_id).await.unwrap()
    }

    /// Mutating calls recorded so far
    pub fn calls(&self) -> Vec<CloudCall> {
        self.cloud.calls()
    }

    pub fn locks(&self) -> Vec<String> {
        self.objects.keys().into_iter().filter(|k| k.starts_with("lock.")).collect()
    }
}

/// Create a snapshot and return nothing but success
pub(crate) async fn snapshot(h: &Harness, instance_id: &InstanceId, name: &str) {
    let report = h.engine.create(instance_id, name, "test").await.unwrap();
    assert!(report.is_clean(), "{:?}", report.residue);
    h.cloud.clear_calls();
}
