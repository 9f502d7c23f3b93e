// SPDX-FileCopyrightText: 2026 Keyfort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The key-value store contract the vault session persists through.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::KeyfortError;

/// A durable key-value store holding opaque string values by string key.
///
/// The vault treats the store as a single shared resource: `add_record` does a
/// whole-collection read-modify-write, serialized by the session. The store
/// itself only needs to be atomic per `get`/`set` call; it is not expected to
/// provide cross-process locking.
///
/// Absent keys are omitted from the map returned by [`get`](SecretStore::get);
/// absence is data, not an error. Backend failures must surface as
/// [`KeyfortError::StorageUnavailable`] so callers can tell "not initialized"
/// apart from "store is down".
#[async_trait]
pub trait SecretStore: Send + Sync + 'static {
    /// Fetch the values for the requested keys. Keys with no stored value are
    /// left out of the result map.
    async fn get(&self, keys: &[&str]) -> Result<HashMap<String, String>, KeyfortError>;

    /// Durably write all given entries, replacing any existing values.
    async fn set(&self, entries: HashMap<String, String>) -> Result<(), KeyfortError>;
}

// Shared handles to a store are themselves stores.
#[async_trait]
impl<T: SecretStore + ?Sized> SecretStore for std::sync::Arc<T> {
    async fn get(&self, keys: &[&str]) -> Result<HashMap<String, String>, KeyfortError> {
        (**self).get(keys).await
    }

    async fn set(&self, entries: HashMap<String, String>) -> Result<(), KeyfortError> {
        (**self).set(entries).await
    }
}
