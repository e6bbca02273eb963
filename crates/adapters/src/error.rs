// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Errors from cloud adapter and object store calls
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdapterError {
    #[error("not found: {0}")]
    NotFound(String),
    /// 409: usually "another operation is in progress on this resource"
    #[error("conflict: {0}")]
    Conflict(String),
    /// 412: a conditional request (If-None-Match / If-Match) did not hold
    #[error("precondition failed: {0}")]
    PreconditionFailed(String),
    #[error("too many requests: {0}")]
    Throttled(String),
    #[error("not authorized: {0}")]
    Auth(String),
    #[error("service error {status} {code}: {message}")]
    Service { status: u16, code: String, message: String },
    #[error("request failed: {0}")]
    Transport(String),
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("cannot sign request: {0}")]
    Signing(String),
}

impl AdapterError {
    /// Errors worth retrying on the same request: throttling, gateway
    /// failures and connection problems.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Throttled(_) | Self::Transport(_) => true,
            Self::Service { status, .. } => matches!(status, 500 | 502 | 503 | 504),
            _ => false,
        }
    }

    /// The resource is busy with another operation (e.g. a clone already
    /// running in the same availability domain). Callers may wait and retry.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Conflict(_)) || self.is_transient()
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Map a non-success HTTP status and the service's error code/message.
    pub fn from_status(status: u16, code: &str, message: &str) -> Self {
        let detail = if message.is_empty() { code.to_string() } else { message.to_string() };
        match status {
            401 | 403 => Self::Auth(detail),
            404 => Self::NotFound(detail),
            409 => Self::Conflict(detail),
            412 => Self::PreconditionFailed(detail),
            429 => Self::Throttled(detail),
            _ => Self::Service { status, code: code.to_string(), message: message.to_string() },
        }
    }
}

impl From<reqwest::Error> for AdapterError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for AdapterError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
