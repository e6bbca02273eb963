// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use ocisnap_core::Backoff;
use std::time::Duration;

/// Polling policies used by the lifecycle operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Waiting for a volume group clone to start and to complete
    pub clone_wait: Backoff,
    /// Waiting for an instance to reach TERMINATED or RUNNING
    pub instance_wait: Backoff,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            clone_wait: Backoff::default().deadline(Duration::from_secs(60 * 60)),
            instance_wait: Backoff::default(),
        }
    }
}

impl EngineConfig {
    ocisnap_core::setters! {
        set {
            clone_wait: Backoff,
            instance_wait: Backoff,
        }
    }
}
