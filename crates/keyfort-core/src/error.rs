// SPDX-FileCopyrightText: 2026 Keyfort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Keyfort secret vault.
//!
//! Every variant is recoverable by the caller: re-prompt for the passphrase,
//! fix the input, retry the store, or skip a single corrupted entry. Nothing
//! here is fatal to the process.

use thiserror::Error;

/// The primary error type used across all Keyfort crates.
#[derive(Debug, Error)]
pub enum KeyfortError {
    /// `setup` was called on a vault that already has a master verifier.
    #[error("vault is already initialized")]
    AlreadyInitialized,

    /// `unlock` was called but no master verifier exists yet. Callers should
    /// route to `setup` instead.
    #[error("vault is not initialized")]
    NotInitialized,

    /// The supplied passphrase did not match the stored master verifier.
    #[error("wrong master passphrase")]
    WrongPassphrase,

    /// A vault operation that requires the session key was called while locked.
    #[error("vault is locked")]
    VaultLocked,

    /// Caller-supplied input was rejected (empty passphrase, empty record field).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Authenticated decryption failed: wrong key, corrupted ciphertext, or
    /// tampering. Deliberately carries no detail beyond the fact of failure.
    #[error("authentication failed during decryption")]
    AuthenticationFailure,

    /// A persisted value is structurally invalid (truncated blob, bad JSON,
    /// undersized salt) and was rejected before any decryption was attempted.
    #[error("malformed record: {0}")]
    MalformedRecord(String),

    /// The backing store could not be read or written. Distinct from
    /// `NotInitialized`: absence of a key is data, store failure is not.
    #[error("storage unavailable: {source}")]
    StorageUnavailable {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Configuration errors (invalid TOML, out-of-range KDF parameters).
    #[error("configuration error: {0}")]
    Config(String),

    /// Failures inside a cryptographic primitive (CSPRNG, key construction).
    #[error("crypto error: {0}")]
    Crypto(String),
}
