// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ocisnap-engine: snapshot lifecycle operations
//!
//! [`SnapshotEngine`] runs create, create-multi, rollback, delete,
//! delete-all, rename, change-description and the listings against a
//! [`CloudAdapter`](ocisnap_adapters::CloudAdapter) and the record bucket.
//! Every mutating operation runs under the instance locks.

mod config;
mod engine;
mod error;
mod flow;
mod inspect;
mod report;
mod wait;

mod create;
mod delete;
mod list;
mod rename;
mod rollback;

#[cfg(test)]
mod test_helpers;

pub use config::EngineConfig;
pub use engine::SnapshotEngine;
pub use error::{OpError, Precondition};
pub use list::{InstanceListing, Listing};
pub use report::{CreatedSnapshot, Outcome, Report, Residue};
