// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! OCI API request signing (HTTP Signatures draft, `rsa-sha256`).
//!
//! Every request signs `date (request-target) host`. Requests with a body
//! also sign `x-content-sha256 content-length content-type`, except object
//! uploads, which the object storage service exempts.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::Url;
use ring::rand::SystemRandom;
use ring::signature::{RsaKeyPair, RSA_PKCS1_SHA256};
use sha2::{Digest, Sha256};
use std::sync::Arc;

use super::config::ConfigError;
use crate::error::AdapterError;

/// Whether the body headers take part in the signature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodySigning {
    Signed,
    Exempt,
}

/// Header values to attach to a signed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    pub date: String,
    pub authorization: String,
    pub content_sha256: Option<String>,
    pub content_length: Option<usize>,
}

/// Signs requests with an API signing key
#[derive(Clone)]
pub struct RequestSigner {
    key_id: String,
    key: Arc<RsaKeyPair>,
    rng: SystemRandom,
}

impl std::fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestSigner").field("key_id", &self.key_id).finish_non_exhaustive()
    }
}

impl RequestSigner {
    /// Build a signer from a PEM private key (PKCS#1 or unencrypted PKCS#8).
    pub fn from_pem(key_id: impl Into<String>, pem: &str) -> Result<Self, ConfigError> {
        let (label, der) = decode_pem(pem)?;
        let key = match label.as_str() {
            "RSA PRIVATE KEY" => RsaKeyPair::from_der(&der),
            "PRIVATE KEY" => RsaKeyPair::from_pkcs8(&der),
            "ENCRYPTED PRIVATE KEY" => {
                return Err(ConfigError::InvalidKey("encrypted keys are not supported".into()))
            }
            other => return Err(ConfigError::InvalidKey(format!("unexpected PEM block '{other}'"))),
        }
        .map_err(|e| ConfigError::InvalidKey(e.to_string()))?;
        Ok(Self { key_id: key_id.into(), key: Arc::new(key), rng: SystemRandom::new() })
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Compute the signature headers for a request.
    ///
    /// `date` is the RFC 7231 date sent in the `date` header.
    pub fn sign(
        &self,
        method: &str,
        url: &Url,
        body: Option<&[u8]>,
        body_signing: BodySigning,
        date: &str,
    ) -> Result<SignedHeaders, AdapterError> {
        let mut names = vec!["date", "(request-target)", "host"];
        let mut lines = vec![
            format!("date: {date}"),
            format!("(request-target): {}", request_target(method, url)),
            format!("host: {}", host_header(url)),
        ];

        let mut content_sha256 = None;
        let mut content_length = None;
        if let Some(body) = body {
            let digest = STANDARD.encode(Sha256::digest(body));
            if body_signing == BodySigning::Signed {
                names.extend(["x-content-sha256", "content-length", "content-type"]);
                lines.push(format!("x-content-sha256: {digest}"));
                lines.push(format!("content-length: {}", body.len()));
                lines.push("content-type: application/json".to_string());
            }
            content_sha256 = Some(digest);
            content_length = Some(body.len());
        }

        let signing_string = lines.join("\n");
        let mut signature = vec![0; self.key.public().modulus_len()];
        self.key
            .sign(&RSA_PKCS1_SHA256, &self.rng, signing_string.as_bytes(), &mut signature)
            .map_err(|e| AdapterError::Signing(e.to_string()))?;

        let authorization = format!(
            "Signature version=\"1\",keyId=\"{}\",algorithm=\"rsa-sha256\",headers=\"{}\",signature=\"{}\"",
            self.key_id,
            names.join(" "),
            STANDARD.encode(&signature)
        );

        Ok(SignedHeaders { date: date.to_string(), authorization, content_sha256, content_length })
    }
}

/// `(request-target)`: lowercase method, path and query
pub(crate) fn request_target(method: &str, url: &Url) -> String {
    match url.query() {
        Some(query) => format!("{} {}?{}", method.to_lowercase(), url.path(), query),
        None => format!("{} {}", method.to_lowercase(), url.path()),
    }
}

pub(crate) fn host_header(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    }
}

/// RFC 7231 date for the `date` header
pub(crate) fn http_date(at: chrono::DateTime<chrono::Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

fn decode_pem(pem: &str) -> Result<(String, Vec<u8>), ConfigError> {
    let mut label = None;
    let mut body = String::new();
    for line in pem.lines().map(str::trim) {
        if let Some(rest) = line.strip_prefix("-----BEGIN ") {
            label = rest.strip_suffix("-----").map(str::to_string);
        } else if line.starts_with("-----END ") {
            break;
        } else if label.is_some() && !line.contains(':') {
            body.push_str(line);
        } else if line.starts_with("Proc-Type") {
            return Err(ConfigError::InvalidKey("encrypted keys are not supported".into()));
        }
    }
    let label = label.ok_or_else(|| ConfigError::InvalidKey("no PEM block found".into()))?;
    let der = STANDARD.decode(body).map_err(|e| ConfigError::InvalidKey(e.to_string()))?;
    Ok((label, der))
}

#[cfg(test)]
#[path = "signer_tests.rs"]
mod tests;
