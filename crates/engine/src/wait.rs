// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Polling the control plane under a [`Backoff`] policy.

use ocisnap_adapters::AdapterError;
use ocisnap_core::Backoff;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug)]
pub(crate) enum WaitError {
    /// The policy's deadline ran out; carries the time spent
    Timeout(Duration),
    Cloud(AdapterError),
}

/// Call `poll` until it yields a value, sleeping between attempts.
pub(crate) async fn poll_until<T, F, Fut>(policy: Backoff, mut poll: F) -> Result<T, WaitError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, AdapterError>>,
{
    let started = Instant::now();
    let mut delays = policy.delays();
    loop {
        if let Some(value) = poll().await.map_err(WaitError::Cloud)? {
            return Ok(value);
        }
        let Some(delay) = delays.next() else {
            return Err(WaitError::Timeout(started.elapsed()));
        };
        tokio::time::sleep(delay).await;
    }
}

/// Call `attempt` until it succeeds, retrying only while the resource is
/// busy ([`AdapterError::is_busy`]).
pub(crate) async fn retry_while_busy<T, F, Fut>(
    policy: Backoff,
    mut attempt: F,
) -> Result<T, WaitError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AdapterError>>,
{
    let started = Instant::now();
    let mut delays = policy.delays();
    loop {
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_busy() => {
                let Some(delay) = delays.next() else {
                    return Err(WaitError::Timeout(started.elapsed()));
                };
                tracing::info!(error = %e, retry_in = ?delay, "not possible yet, retrying");
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(WaitError::Cloud(e)),
        }
    }
}

#[cfg(test)]
#[path = "wait_tests.rs"]
mod tests;
