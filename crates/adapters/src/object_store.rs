// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use async_trait::async_trait;

use crate::error::AdapterError;

/// Adapter for one object-storage bucket.
///
/// Keys are object names inside the bucket. The bucket itself is chosen
/// when the store is constructed.
#[async_trait]
pub trait ObjectStore: Clone + Send + Sync + 'static {
    /// Name of the bucket, for messages
    fn bucket(&self) -> &str;

    /// Whether the bucket exists and is reachable
    async fn bucket_exists(&self) -> Result<bool, AdapterError>;

    /// Fetch an object; `None` if it does not exist
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, AdapterError>;

    /// Create or overwrite an object
    async fn put(&self, key: &str, body: Vec<u8>) -> Result<(), AdapterError>;

    /// Create an object only if no object with that key exists.
    ///
    /// Returns `false` (and writes nothing) when the key is already taken.
    /// After a transient failure is retried, `false` may also mean the
    /// first attempt's write landed.
    async fn put_if_absent(&self, key: &str, body: Vec<u8>) -> Result<bool, AdapterError>;

    /// Delete an object; deleting a missing object is `NotFound`
    async fn delete(&self, key: &str) -> Result<(), AdapterError>;

    /// Names of all objects starting with `prefix`, across pages
    async fn list(&self, prefix: &str) -> Result<Vec<String>, AdapterError>;
}
