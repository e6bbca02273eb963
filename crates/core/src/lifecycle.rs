// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle states reported by the cloud control plane.
//!
//! Every enum tolerates values it does not know about (`Unknown`) so that a
//! new state added by the provider never turns into a decode error.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a compute instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstanceState {
    Moving,
    Provisioning,
    Running,
    Starting,
    Stopping,
    Stopped,
    CreatingImage,
    Terminating,
    Terminated,
    #[serde(other)]
    Unknown,
}

impl InstanceState {
    /// Terminating and terminated instances cannot be snapshotted or rolled back.
    pub fn is_gone(&self) -> bool {
        matches!(self, Self::Terminating | Self::Terminated)
    }
}

crate::simple_display! {
    InstanceState {
        Moving => "MOVING",
        Provisioning => "PROVISIONING",
        Running => "RUNNING",
        Starting => "STARTING",
        Stopping => "STOPPING",
        Stopped => "STOPPED",
        CreatingImage => "CREATING_IMAGE",
        Terminating => "TERMINATING",
        Terminated => "TERMINATED",
        Unknown => "UNKNOWN",
    }
}

/// Lifecycle state of a volume group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VolumeGroupState {
    Provisioning,
    Available,
    Terminating,
    Terminated,
    Faulty,
    UpdatePending,
    #[serde(other)]
    Unknown,
}

crate::simple_display! {
    VolumeGroupState {
        Provisioning => "PROVISIONING",
        Available => "AVAILABLE",
        Terminating => "TERMINATING",
        Terminated => "TERMINATED",
        Faulty => "FAULTY",
        UpdatePending => "UPDATE_PENDING",
        Unknown => "UNKNOWN",
    }
}

/// Lifecycle state of a boot or block volume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VolumeState {
    Provisioning,
    Restoring,
    Available,
    Terminating,
    Terminated,
    Faulty,
    #[serde(other)]
    Unknown,
}

crate::simple_display! {
    VolumeState {
        Provisioning => "PROVISIONING",
        Restoring => "RESTORING",
        Available => "AVAILABLE",
        Terminating => "TERMINATING",
        Terminated => "TERMINATED",
        Faulty => "FAULTY",
        Unknown => "UNKNOWN",
    }
}

/// Lifecycle state of a volume, boot volume or VNIC attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttachmentState {
    Attaching,
    Attached,
    Detaching,
    Detached,
    #[serde(other)]
    Unknown,
}

crate::simple_display! {
    AttachmentState {
        Attaching => "ATTACHING",
        Attached => "ATTACHED",
        Detaching => "DETACHING",
        Detached => "DETACHED",
        Unknown => "UNKNOWN",
    }
}

/// Lifetime of a public IP address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IpLifetime {
    Ephemeral,
    Reserved,
    #[serde(other)]
    Unknown,
}

crate::simple_display! {
    IpLifetime {
        Ephemeral => "EPHEMERAL",
        Reserved => "RESERVED",
        Unknown => "UNKNOWN",
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
