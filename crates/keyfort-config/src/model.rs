// SPDX-FileCopyrightText: 2026 Keyfort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Keyfort secret vault.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at load time instead of silently ignoring typos.

use serde::{Deserialize, Serialize};

/// Top-level Keyfort configuration.
///
/// Loaded from TOML with environment variable overrides. All sections are
/// optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct KeyfortConfig {
    /// Vault and key-derivation settings.
    #[serde(default)]
    pub vault: VaultConfig,

    /// Persistence backend settings.
    #[serde(default)]
    pub store: StoreConfig,
}

/// Vault key-derivation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VaultConfig {
    /// PBKDF2-HMAC-SHA256 iteration count used when deriving the session key
    /// (default: 600000, per current OWASP guidance). The value in effect at
    /// `setup` time is persisted with the vault and reused on every unlock.
    #[serde(default = "default_kdf_iterations")]
    pub kdf_iterations: u32,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            kdf_iterations: default_kdf_iterations(),
        }
    }
}

fn default_kdf_iterations() -> u32 {
    600_000
}

/// Persistence backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Path to the SQLite database file backing the vault store.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    "keyfort.db".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = KeyfortConfig::default();
        assert_eq!(config.vault.kdf_iterations, 600_000);
        assert_eq!(config.store.database_path, "keyfort.db");
    }
}
