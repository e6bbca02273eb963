// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ocisnap-storage: snapshot records and advisory locks kept in an
//! object storage bucket.
//!
//! Bucket layout:
//! - `<instance_ocid>.json`: the instance's [`SnapshotRecord`](ocisnap_core::SnapshotRecord)
//! - `lock.<instance_ocid>`: present while an operation holds the instance

mod keys;
mod lock;
mod record_store;

pub use keys::{instance_id_from_key, lock_key, record_key, DEFAULT_BUCKET, LOCK_PREFIX};
pub use lock::{LockError, LockPayload, Locker};
pub use record_store::{RecordStore, StoreError};
