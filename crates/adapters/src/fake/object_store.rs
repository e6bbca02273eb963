// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use super::Failures;
use crate::error::AdapterError;
use crate::object_store::ObjectStore;

#[derive(Default)]
struct FakeStoreState {
    objects: BTreeMap<String, Vec<u8>>,
    failures: Failures,
    bucket_missing: bool,
    lost_replies: BTreeSet<String>,
}

/// In-memory bucket
#[derive(Clone)]
pub struct FakeObjectStore {
    bucket: Arc<str>,
    inner: Arc<Mutex<FakeStoreState>>,
}

impl Default for FakeObjectStore {
    fn default() -> Self {
        Self::new("compute_snapshots")
    }
}

impl FakeObjectStore {
    pub fn new(bucket: &str) -> Self {
        Self { bucket: Arc::from(bucket), inner: Arc::new(Mutex::new(FakeStoreState::default())) }
    }

    /// Store raw bytes under `key`, bypassing failure injection
    pub fn insert(&self, key: &str, body: impl Into<Vec<u8>>) {
        self.inner.lock().objects.insert(key.to_string(), body.into());
    }

    pub fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.inner.lock().objects.get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.lock().objects.contains_key(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.inner.lock().objects.keys().cloned().collect()
    }

    /// Make the bucket look absent: every call fails with `NotFound`
    pub fn set_bucket_missing(&self, missing: bool) {
        self.inner.lock().bucket_missing = missing;
    }

    /// Fail the next call of `op` (`get`, `put`, `put_if_absent`, `delete`,
    /// `list`) with `error`.
    pub fn fail_next(&self, op: &'static str, error: AdapterError) {
        self.inner.lock().failures.push(op, None, error);
    }

    /// Fail the next call of `op` on `key` with `error`.
    pub fn fail_on(&self, op: &'static str, key: &str, error: AdapterError) {
        self.inner.lock().failures.push(op, Some(key.to_string()), error);
    }

    /// The next conditional put on `key` is written, but the caller sees
    /// what a retry after a lost reply sees: the key already taken.
    pub fn lose_reply_on(&self, key: &str) {
        self.inner.lock().lost_replies.insert(key.to_string());
    }

    fn enter(&self, state: &mut FakeStoreState, op: &str, key: &str) -> Result<(), AdapterError> {
        if state.bucket_missing {
            return Err(AdapterError::NotFound(format!("bucket {}", self.bucket)));
        }
        state.failures.take(op, key)
    }
}

#[async_trait]
impl ObjectStore for FakeObjectStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn bucket_exists(&self) -> Result<bool, AdapterError> {
        let mut state = self.inner.lock();
        state.failures.take("bucket_exists", "")?;
        Ok(!state.bucket_missing)
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, AdapterError> {
        let mut state = self.inner.lock();
        self.enter(&mut state, "get", key)?;
        Ok(state.objects.get(key).cloned())
    }

    async fn put(&self, key: &str, body: Vec<u8>) -> Result<(), AdapterError> {
        let mut state = self.inner.lock();
        self.enter(&mut state, "put", key)?;
        state.objects.insert(key.to_string(), body);
        Ok(())
    }

    async fn put_if_absent(&self, key: &str, body: Vec<u8>) -> Result<bool, AdapterError> {
        let mut state = self.inner.lock();
        self.enter(&mut state, "put_if_absent", key)?;
        if state.objects.contains_key(key) {
            return Ok(false);
        }
        state.objects.insert(key.to_string(), body);
        Ok(!state.lost_replies.remove(key))
    }

    async fn delete(&self, key: &str) -> Result<(), AdapterError> {
        let mut state = self.inner.lock();
        self.enter(&mut state, "delete", key)?;
        match state.objects.remove(key) {
            Some(_) => Ok(()),
            None => Err(AdapterError::NotFound(key.to_string())),
        }
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, AdapterError> {
        let mut state = self.inner.lock();
        self.enter(&mut state, "list", prefix)?;
        Ok(state.objects.keys().filter(|k| k.starts_with(prefix)).cloned().collect())
    }
}
