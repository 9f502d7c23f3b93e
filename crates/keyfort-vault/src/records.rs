// SPDX-FileCopyrightText: 2026 Keyfort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The persisted record schema: one vault entry per credential, the whole
//! collection stored as a single JSON value under the `vaultEntries` key.
//!
//! Site and username are stored in the clear; only the password is sealed.
//! Insertion order is preserved -- the collection is an ordered sequence, and
//! every mutation rewrites it whole.

use keyfort_core::KeyfortError;
use serde::{Deserialize, Serialize};

use crate::crypto::SealedBlob;

/// One stored credential.
///
/// Serializes camelCase to match the persisted layout:
/// `{"site": .., "username": .., "sealedPassword": {"nonce": [..], "ciphertext": [..]}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultEntry {
    pub site: String,
    pub username: String,
    pub sealed_password: SealedBlob,
}

/// Decode the persisted `vaultEntries` value into the ordered collection.
pub fn decode_entries(raw: &str) -> Result<Vec<VaultEntry>, KeyfortError> {
    serde_json::from_str(raw).map_err(|e| {
        KeyfortError::MalformedRecord(format!("vault entries are not valid JSON: {e}"))
    })
}

/// Encode the collection for persistence.
pub fn encode_entries(entries: &[VaultEntry]) -> Result<String, KeyfortError> {
    serde_json::to_string(entries).map_err(|e| {
        KeyfortError::MalformedRecord(format!("vault entries failed to serialize: {e}"))
    })
}
