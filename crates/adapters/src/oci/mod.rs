// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! OCI REST implementations of [`CloudAdapter`](crate::CloudAdapter) and
//! [`ObjectStore`](crate::ObjectStore), authenticated with an API-key profile.

mod compute;
mod config;
mod http;
mod object_storage;
mod signer;

#[cfg(test)]
mod test_util;

pub use compute::OciCloud;
pub use config::{default_config_path, load_profile, ConfigError, OciProfile, DEFAULT_PROFILE};
pub use http::{OciHttp, DEFAULT_MAX_ATTEMPTS};
pub use object_storage::OciObjectStore;
pub use signer::{BodySigning, RequestSigner, SignedHeaders};

use reqwest::Url;

use crate::error::AdapterError;

/// Core services API version segment
const CORE_API_VERSION: &str = "20160918";

/// Service base URLs for one region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Compute, block storage and virtual network (`.../20160918`)
    pub core: Url,
    pub object_storage: Url,
}

impl Endpoints {
    pub fn for_region(region: &str) -> Result<Self, AdapterError> {
        Self::new(
            &format!("https://iaas.{region}.oraclecloud.com/{CORE_API_VERSION}"),
            &format!("https://objectstorage.{region}.oraclecloud.com"),
        )
    }

    /// Explicit base URLs, e.g. a local test server
    pub fn new(core: &str, object_storage: &str) -> Result<Self, AdapterError> {
        let parse = |s: &str| {
            Url::parse(s).map_err(|e| AdapterError::Transport(format!("invalid endpoint {s}: {e}")))
        };
        Ok(Self { core: parse(core)?, object_storage: parse(object_storage)? })
    }

    pub(crate) fn core_url(&self, segments: &[&str]) -> Result<Url, AdapterError> {
        join(&self.core, segments)
    }

    pub(crate) fn object_url(&self, segments: &[&str]) -> Result<Url, AdapterError> {
        join(&self.object_storage, segments)
    }
}

/// Append path segments (percent-encoded) to a base URL
fn join(base: &Url, segments: &[&str]) -> Result<Url, AdapterError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| AdapterError::Transport(format!("endpoint {base} cannot be a base")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Build the signed HTTP client, endpoints and bucket store for a profile.
pub async fn connect(
    profile: &OciProfile,
    region: Option<&str>,
    bucket: &str,
    http_timeout: std::time::Duration,
    retry: ocisnap_core::Backoff,
    max_attempts: u32,
) -> Result<(OciCloud, OciObjectStore), ConnectError> {
    let signer = RequestSigner::from_pem(profile.key_id(), &profile.read_key()?)?;
    let http = OciHttp::new(signer, http_timeout)?.with_retry(retry, max_attempts);
    let endpoints = Endpoints::for_region(region.unwrap_or(&profile.region))?;
    let cloud = OciCloud::new(http.clone(), endpoints.clone());
    let store = OciObjectStore::connect(http, endpoints, bucket).await?;
    Ok((cloud, store))
}

/// Failure to set up clients for a profile
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Adapter(#[from] AdapterError),
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
