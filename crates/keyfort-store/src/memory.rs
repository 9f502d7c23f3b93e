// SPDX-FileCopyrightText: 2026 Keyfort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory [`SecretStore`] for tests and ephemeral vaults.
//!
//! Nothing survives a drop; useful wherever durability is someone else's
//! problem.

use std::collections::HashMap;

use async_trait::async_trait;
use keyfort_core::{KeyfortError, SecretStore};
use tokio::sync::RwLock;

/// A `SecretStore` backed by a process-local map.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SecretStore for MemoryStore {
    async fn get(&self, keys: &[&str]) -> Result<HashMap<String, String>, KeyfortError> {
        let entries = self.entries.read().await;
        let mut found = HashMap::new();
        for key in keys {
            if let Some(value) = entries.get(*key) {
                found.insert(key.to_string(), value.clone());
            }
        }
        Ok(found)
    }

    async fn set(&self, new_entries: HashMap<String, String>) -> Result<(), KeyfortError> {
        let mut entries = self.entries.write().await;
        entries.extend(new_entries);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_returns_only_present_keys() {
        let store = MemoryStore::new();
        store
            .set(HashMap::from([("here".to_string(), "yes".to_string())]))
            .await
            .unwrap();

        let found = store.get(&["here", "gone"]).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found.get("here").map(String::as_str), Some("yes"));
    }

    #[tokio::test]
    async fn set_merges_without_clearing_other_keys() {
        let store = MemoryStore::new();
        store
            .set(HashMap::from([("a".to_string(), "1".to_string())]))
            .await
            .unwrap();
        store
            .set(HashMap::from([("b".to_string(), "2".to_string())]))
            .await
            .unwrap();

        let found = store.get(&["a", "b"]).await.unwrap();
        assert_eq!(found.len(), 2);
    }
}
