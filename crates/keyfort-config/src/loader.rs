// SPDX-FileCopyrightText: 2026 Keyfort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./keyfort.toml` > `~/.config/keyfort/keyfort.toml`
//! > `/etc/keyfort/keyfort.toml` with environment variable overrides via the
//! `KEYFORT_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::KeyfortConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/keyfort/keyfort.toml` (system-wide)
/// 3. `~/.config/keyfort/keyfort.toml` (user XDG config)
/// 4. `./keyfort.toml` (local directory)
/// 5. `KEYFORT_*` environment variables
pub fn load_config() -> Result<KeyfortConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(KeyfortConfig::default()))
        .merge(Toml::file("/etc/keyfort/keyfort.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("keyfort/keyfort.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("keyfort.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env vars).
///
/// Used for testing and embedding.
pub fn load_config_from_str(toml_content: &str) -> Result<KeyfortConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(KeyfortConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<KeyfortConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(KeyfortConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` so that underscore-bearing
/// key names stay intact: `KEYFORT_VAULT_KDF_ITERATIONS` must map to
/// `vault.kdf_iterations`, not `vault.kdf.iterations`.
fn env_provider() -> Env {
    Env::prefixed("KEYFORT_").map(|key| {
        // Figment hands over the prefix-stripped key in its original case;
        // lowercase first so the section mapping actually applies.
        let mapped = key
            .as_str()
            .to_ascii_lowercase()
            .replacen("vault_", "vault.", 1)
            .replacen("store_", "store.", 1);
        mapped.into()
    })
}
