// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Signed HTTP transport shared by the compute and object storage clients.

use std::time::Duration;

use ocisnap_core::Backoff;
use reqwest::header::{HeaderMap, CONTENT_TYPE, DATE};
use reqwest::{Client, Method, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::signer::{http_date, BodySigning, RequestSigner};
use crate::error::AdapterError;

/// Attempts per request when nothing else is configured
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

const NEXT_PAGE: &str = "opc-next-page";
const RETRY_TOKEN: &str = "opc-retry-token";

/// Body of a non-2xx response
#[derive(Debug, Default, Deserialize)]
struct ServiceErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// A successful response, fully read
#[derive(Debug)]
pub(crate) struct RawResponse {
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, AdapterError> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// One request to send (and possibly resend)
#[derive(Debug, Clone)]
pub(crate) struct Request {
    pub method: Method,
    pub url: Url,
    pub body: Option<Vec<u8>>,
    pub body_signing: BodySigning,
    pub headers: Vec<(&'static str, String)>,
}

impl Request {
    pub fn new(method: Method, url: Url) -> Self {
        Self { method, url, body: None, body_signing: BodySigning::Signed, headers: Vec::new() }
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, AdapterError> {
        self.body = Some(serde_json::to_vec(body)?);
        Ok(self)
    }

    /// Raw upload; object storage exempts the body from the signature.
    pub fn upload(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self.body_signing = BodySigning::Exempt;
        self
    }

    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }
}

/// Signed, retrying HTTP client
#[derive(Debug, Clone)]
pub struct OciHttp {
    client: Client,
    signer: RequestSigner,
    retry: Backoff,
    max_attempts: u32,
}

impl OciHttp {
    pub fn new(signer: RequestSigner, timeout: Duration) -> Result<Self, AdapterError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("ocisnap/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AdapterError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            signer,
            retry: Backoff::new(
                Duration::from_secs(1),
                Duration::from_secs(8),
                Duration::from_secs(60),
            ),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        })
    }

    /// Override the retry policy for transient failures.
    pub fn with_retry(mut self, retry: Backoff, max_attempts: u32) -> Self {
        self.retry = retry;
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Send a request, retrying transient failures. Non-2xx responses are
    /// mapped to [`AdapterError`].
    pub(crate) async fn execute(&self, mut request: Request) -> Result<RawResponse, AdapterError> {
        if request.method == Method::POST && !request.headers.iter().any(|(n, _)| *n == RETRY_TOKEN)
        {
            request.headers.push((RETRY_TOKEN, nanoid::nanoid!(32)));
        }

        let mut delays = self.retry.delays().take(self.max_attempts.saturating_sub(1) as usize);
        let mut attempt = 1;
        loop {
            match self.execute_once(&request).await {
                Err(e) if e.is_transient() => match delays.next() {
                    Some(delay) => {
                        tracing::debug!(
                            method = %request.method,
                            url = %request.url,
                            attempt,
                            error = %e,
                            "retrying request in {delay:?}",
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                    }
                    None => return Err(e),
                },
                result => return result,
            }
        }
    }

    async fn execute_once(&self, request: &Request) -> Result<RawResponse, AdapterError> {
        let date = http_date(chrono::Utc::now());
        let signed = self.signer.sign(
            request.method.as_str(),
            &request.url,
            request.body.as_deref(),
            request.body_signing,
            &date,
        )?;

        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone())
            .header(DATE, signed.date)
            .header("authorization", signed.authorization);
        if let Some(body) = &request.body {
            let content_type = match request.body_signing {
                BodySigning::Signed => "application/json",
                BodySigning::Exempt => "application/octet-stream",
            };
            builder = builder.header(CONTENT_TYPE, content_type).body(body.clone());
            if let Some(sha) = signed.content_sha256 {
                builder = builder.header("x-content-sha256", sha);
            }
        }
        for (name, value) in &request.headers {
            builder = builder.header(*name, value);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();

        if (200..300).contains(&status) {
            return Ok(RawResponse { headers, body });
        }
        let error: ServiceErrorBody = serde_json::from_slice(&body).unwrap_or_default();
        tracing::debug!(
            method = %request.method,
            url = %request.url,
            status,
            code = %error.code,
            "request failed",
        );
        Err(AdapterError::from_status(status, &error.code, &error.message))
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, AdapterError> {
        self.execute(Request::new(Method::GET, url)).await?.json()
    }

    pub(crate) async fn send_json<B, T>(
        &self,
        method: Method,
        url: Url,
        body: &B,
    ) -> Result<T, AdapterError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        self.execute(Request::new(method, url).json(body)?).await?.json()
    }

    /// Send a request whose response body is not needed
    pub(crate) async fn send_unit<B>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<(), AdapterError>
    where
        B: Serialize + ?Sized + Sync,
    {
        let mut request = Request::new(method, url);
        if let Some(body) = body {
            request = request.json(body)?;
        }
        self.execute(request).await.map(drop)
    }

    /// GET a list endpoint, following `opc-next-page` until exhausted.
    pub(crate) async fn list_all<T: DeserializeOwned>(&self, url: Url) -> Result<Vec<T>, AdapterError> {
        let mut items = Vec::new();
        let mut page: Option<String> = None;
        loop {
            let mut page_url = url.clone();
            if let Some(page) = &page {
                page_url.query_pairs_mut().append_pair("page", page);
            }
            let response = self.execute(Request::new(Method::GET, page_url)).await?;
            items.extend(response.json::<Vec<T>>()?);
            match response.header(NEXT_PAGE) {
                Some(next) if !next.is_empty() => page = Some(next.to_string()),
                _ => return Ok(items),
            }
        }
    }
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
