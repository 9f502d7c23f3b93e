// SPDX-FileCopyrightText: 2026 Keyfort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as the KDF iteration floor and non-empty paths.

use keyfort_core::KeyfortError;

use crate::model::KeyfortConfig;

/// Minimum PBKDF2 iteration count accepted for key derivation.
///
/// Anything lower offers too little resistance to offline guessing against a
/// stolen store.
pub const MIN_KDF_ITERATIONS: u32 = 100_000;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or all collected validation
/// errors (does not fail fast).
pub fn validate_config(config: &KeyfortConfig) -> Result<(), Vec<KeyfortError>> {
    let mut errors = Vec::new();

    if config.vault.kdf_iterations < MIN_KDF_ITERATIONS {
        errors.push(KeyfortError::Config(format!(
            "vault.kdf_iterations must be at least {MIN_KDF_ITERATIONS}, got {}",
            config.vault.kdf_iterations
        )));
    }

    if config.store.database_path.trim().is_empty() {
        errors.push(KeyfortError::Config(
            "store.database_path must not be empty".to_string(),
        ));
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
