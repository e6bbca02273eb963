// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use async_trait::async_trait;
use reqwest::{Method, Url};
use serde::Deserialize;

use super::http::{OciHttp, Request};
use super::Endpoints;
use crate::error::AdapterError;
use crate::object_store::ObjectStore;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListObjects {
    #[serde(default)]
    objects: Vec<ObjectSummary>,
    #[serde(default)]
    next_start_with: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ObjectSummary {
    name: String,
}

/// One object storage bucket in the tenancy's namespace
#[derive(Debug, Clone)]
pub struct OciObjectStore {
    http: OciHttp,
    endpoints: Endpoints,
    namespace: String,
    bucket: String,
}

impl OciObjectStore {
    /// Look up the tenancy namespace and bind to `bucket`.
    pub async fn connect(
        http: OciHttp,
        endpoints: Endpoints,
        bucket: impl Into<String>,
    ) -> Result<Self, AdapterError> {
        let url = endpoints.object_url(&["n", ""])?;
        let namespace: String = http.get(url).await?;
        tracing::debug!(%namespace, "resolved object storage namespace");
        Ok(Self { http, endpoints, namespace, bucket: bucket.into() })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn object_url(&self, key: &str) -> Result<Url, AdapterError> {
        self.endpoints.object_url(&["n", &self.namespace, "b", &self.bucket, "o", key])
    }
}

#[async_trait]
impl ObjectStore for OciObjectStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn bucket_exists(&self) -> Result<bool, AdapterError> {
        let url = self.endpoints.object_url(&["n", &self.namespace, "b", &self.bucket])?;
        match self.http.execute(Request::new(Method::HEAD, url)).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, AdapterError> {
        match self.http.execute(Request::new(Method::GET, self.object_url(key)?)).await {
            Ok(response) => Ok(Some(response.body)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn put(&self, key: &str, body: Vec<u8>) -> Result<(), AdapterError> {
        let request = Request::new(Method::PUT, self.object_url(key)?).upload(body);
        self.http.execute(request).await.map(drop)
    }

    async fn put_if_absent(&self, key: &str, body: Vec<u8>) -> Result<bool, AdapterError> {
        let request =
            Request::new(Method::PUT, self.object_url(key)?).upload(body).header("if-none-match", "*");
        match self.http.execute(request).await {
            Ok(_) => Ok(true),
            Err(AdapterError::PreconditionFailed(_) | AdapterError::Conflict(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), AdapterError> {
        let request = Request::new(Method::DELETE, self.object_url(key)?);
        self.http.execute(request).await.map(drop)
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, AdapterError> {
        let mut names = Vec::new();
        let mut start: Option<String> = None;
        loop {
            let mut url = self.endpoints.object_url(&["n", &self.namespace, "b", &self.bucket, "o"])?;
            url.query_pairs_mut().append_pair("prefix", prefix);
            if let Some(start) = &start {
                url.query_pairs_mut().append_pair("start", start);
            }
            let page: ListObjects = self.http.get(url).await?;
            names.extend(page.objects.into_iter().map(|o| o.name));
            match page.next_start_with {
                Some(next) if !next.is_empty() => start = Some(next),
                _ => return Ok(names),
            }
        }
    }
}

#[cfg(test)]
#[path = "object_storage_tests.rs"]
mod tests;
