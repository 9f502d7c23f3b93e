// SPDX-FileCopyrightText: 2026 Keyfort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Master-secret verifier: a stored value that lets a passphrase be checked
//! without the passphrase ever being stored.
//!
//! [`commit`] produces an Argon2id PHC string with a random salt; [`verify`]
//! recomputes with the parameters embedded in the stored string and compares
//! in constant time. One-way by construction: the stored value alone never
//! allows recovery of the passphrase.

use argon2::Argon2;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use keyfort_core::KeyfortError;
use secrecy::{ExposeSecret, SecretString};

use crate::kdf;

/// Derive a verifier from the chosen passphrase, safe to persist.
///
/// Called exactly once per vault, at first-ever setup. Each call salts
/// independently, so committing the same passphrase twice yields different
/// strings. Salt bytes come from the same system CSPRNG the rest of the
/// crate uses.
pub fn commit(passphrase: &SecretString) -> Result<String, KeyfortError> {
    let salt_bytes = kdf::generate_salt()?;
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| KeyfortError::Crypto(format!("verifier salt encoding failed: {e}")))?;
    let hash = Argon2::default()
        .hash_password(passphrase.expose_secret().as_bytes(), &salt)
        .map_err(|e| KeyfortError::Crypto(format!("verifier derivation failed: {e}")))?;
    Ok(hash.to_string())
}

/// Recompute the verifier from `passphrase` and compare against `stored`.
///
/// The comparison inside `verify_password` is constant-time with respect to
/// the hash length. A stored value that is not a valid PHC string is
/// [`KeyfortError::MalformedRecord`], distinct from a mere mismatch.
pub fn verify(passphrase: &SecretString, stored: &str) -> Result<bool, KeyfortError> {
    let parsed = PasswordHash::new(stored).map_err(|e| {
        KeyfortError::MalformedRecord(format!("stored verifier is not a valid PHC string: {e}"))
    })?;

    match Argon2::default().verify_password(passphrase.expose_secret().as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(KeyfortError::Crypto(format!("verifier check failed: {e}"))),
    }
}
