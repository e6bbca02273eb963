// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ocisnap-core: Domain types for the ocisnap compute snapshot manager

pub mod macros;

pub mod backoff;
pub mod clock;
pub mod id;
pub mod lifecycle;
pub mod name;
pub mod snapshot;
pub mod time_fmt;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use backoff::{Backoff, Delays};
pub use clock::{Clock, FakeClock, SystemClock};
pub use id::{
    ocid_kind, tail, BootVolumeId, CompartmentId, InstanceId, PrivateIpId, PublicIpId, SubnetId,
    VnicId, VolumeGroupId, VolumeId,
};
pub use lifecycle::{AttachmentState, InstanceState, IpLifetime, VolumeGroupState, VolumeState};
pub use name::{snapshot_volume_name, tag_key, NameError, SnapshotName, MAX_NAME_LEN, TAG_PREFIX};
#[cfg(any(test, feature = "test-support"))]
pub use snapshot::{BlockVolumeRefBuilder, SnapshotBuilder};
pub use snapshot::{BlockVolumeRef, BootVolumeRef, DuplicateSnapshot, Snapshot, SnapshotRecord};
pub use time_fmt::{format_date_time, format_elapsed, DATE_TIME_FORMAT};
