// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ocisnap-adapters: seams between the snapshot engine and the cloud
//!
//! - [`CloudAdapter`]: compute, block storage and virtual network calls
//! - [`ObjectStore`]: the bucket holding snapshot records and lock objects
//!
//! [`oci`] implements both against the OCI REST API. The `test-support`
//! feature exports in-memory fakes.

pub mod cloud;
pub mod error;
pub mod models;
pub mod object_store;
pub mod oci;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake;

pub use cloud::CloudAdapter;
pub use error::AdapterError;
pub use models::*;
pub use object_store::ObjectStore;
pub use oci::{
    connect, default_config_path, load_profile, ConfigError, ConnectError, Endpoints, OciCloud,
    OciHttp, OciObjectStore, OciProfile, RequestSigner, DEFAULT_MAX_ATTEMPTS, DEFAULT_PROFILE,
};

#[cfg(any(test, feature = "test-support"))]
pub use fake::{CloudCall, FakeCloud, FakeObjectStore, InstanceSeed, SeededInstance};
