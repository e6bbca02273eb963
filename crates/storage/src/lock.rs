// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Advisory per-instance locks.
//!
//! A lock is the object `lock.<instance_ocid>`, created with a conditional
//! put so two operators can never both acquire it. Locks do not expire;
//! `force_unlock` clears one left behind by a crashed run.

use ocisnap_adapters::{AdapterError, ObjectStore};
use ocisnap_core::{format_date_time, Clock, InstanceId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::keys::lock_key;

/// Contents of a lock object, naming its holder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockPayload {
    pub host: String,
    pub pid: u32,
    pub acquired_at: String,
    /// Random per-acquisition token
    pub token: String,
}

impl std::fmt::Display for LockPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (pid {}) since {}", self.host, self.pid, self.acquired_at)
    }
}

#[derive(Debug, Error)]
pub enum LockError {
    #[error("instance {instance_id} is locked by another operation{}", held_by(.holder))]
    Held { instance_id: InstanceId, holder: Option<LockPayload> },
    #[error("cannot lock instance {instance_id}: {source}")]
    Failed { instance_id: InstanceId, source: AdapterError },
    #[error("instance {0} is not locked")]
    NotLocked(InstanceId),
}

fn held_by(holder: &Option<LockPayload>) -> String {
    holder.as_ref().map(|h| format!(": held by {h}")).unwrap_or_default()
}

/// Acquires and releases instance locks in a bucket
#[derive(Debug, Clone)]
pub struct Locker<S, C> {
    objects: S,
    clock: C,
}

impl<S: ObjectStore, C: Clock> Locker<S, C> {
    pub fn new(objects: S, clock: C) -> Self {
        Self { objects, clock }
    }

    fn payload(&self) -> LockPayload {
        LockPayload {
            host: hostname(),
            pid: std::process::id(),
            acquired_at: format_date_time(self.clock.utc_now()),
            token: nanoid::nanoid!(12),
        }
    }

    /// Lock every instance, in order. All or nothing: on the first failure
    /// the locks taken so far in this call are released again.
    pub async fn lock(&self, instance_ids: &[InstanceId]) -> Result<(), LockError> {
        let mut acquired: Vec<InstanceId> = Vec::with_capacity(instance_ids.len());
        for instance_id in instance_ids {
            if acquired.contains(instance_id) {
                continue;
            }
            match self.acquire(instance_id).await {
                Ok(()) => {
                    tracing::debug!(instance = %instance_id, "locked");
                    acquired.push(instance_id.clone());
                }
                Err(error) => {
                    self.unlock(&acquired).await;
                    return Err(error);
                }
            }
        }
        Ok(())
    }

    async fn acquire(&self, instance_id: &InstanceId) -> Result<(), LockError> {
        let payload = self.payload();
        let body = serde_json::to_vec(&payload).map_err(|e| LockError::Failed {
            instance_id: instance_id.clone(),
            source: AdapterError::Decode(e.to_string()),
        })?;
        let result = self.objects.put_if_absent(&lock_key(instance_id), body).await;
        if let Ok(true) = result {
            return Ok(());
        }

        // A retried put can find the object its own lost first attempt
        // created; the token tells it apart from another holder's.
        let holder = self.holder(instance_id).await;
        if let Ok(Some(holder)) = &holder {
            if holder.token == payload.token {
                tracing::debug!(instance = %instance_id, "lock written by an earlier attempt");
                return Ok(());
            }
        }
        Err(match result {
            Ok(_) => LockError::Held {
                instance_id: instance_id.clone(),
                holder: holder.unwrap_or_default(),
            },
            Err(source) => LockError::Failed { instance_id: instance_id.clone(), source },
        })
    }

    /// Release locks. Best effort: failures are logged, never returned.
    pub async fn unlock(&self, instance_ids: &[InstanceId]) {
        for instance_id in instance_ids {
            match self.objects.delete(&lock_key(instance_id)).await {
                Ok(()) => tracing::debug!(instance = %instance_id, "unlocked"),
                Err(e) if e.is_not_found() => {
                    tracing::debug!(instance = %instance_id, "lock already released");
                }
                Err(e) => {
                    tracing::warn!(instance = %instance_id, error = %e, "cannot release lock")
                }
            }
        }
    }

    /// Current holder of an instance's lock, if locked
    pub async fn holder(&self, instance_id: &InstanceId) -> Result<Option<LockPayload>, AdapterError> {
        let Some(bytes) = self.objects.get(&lock_key(instance_id)).await? else {
            return Ok(None);
        };
        // Unreadable payloads still mean "locked"
        Ok(Some(serde_json::from_slice(&bytes).unwrap_or_else(|_| LockPayload {
            host: "unknown".to_string(),
            pid: 0,
            acquired_at: "unknown".to_string(),
            token: String::new(),
        })))
    }

    /// Remove a lock regardless of who holds it; returns the removed holder.
    pub async fn force_unlock(&self, instance_id: &InstanceId) -> Result<LockPayload, LockError> {
        let failed = |source| LockError::Failed { instance_id: instance_id.clone(), source };
        let holder = self
            .holder(instance_id)
            .await
            .map_err(failed)?
            .ok_or_else(|| LockError::NotLocked(instance_id.clone()))?;
        match self.objects.delete(&lock_key(instance_id)).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => return Err(LockError::NotLocked(instance_id.clone())),
            Err(e) => return Err(failed(e)),
        }
        tracing::info!(instance = %instance_id, %holder, "removed lock");
        Ok(holder)
    }
}

fn hostname() -> String {
    ["HOSTNAME", "COMPUTERNAME"]
        .iter()
        .find_map(|var| std::env::var(var).ok().filter(|v| !v.is_empty()))
        .or_else(|| {
            std::fs::read_to_string("/etc/hostname").ok().map(|h| h.trim().to_string())
        })
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
