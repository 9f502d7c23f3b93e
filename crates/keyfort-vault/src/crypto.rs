// SPDX-FileCopyrightText: 2026 Keyfort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Low-level AES-256-GCM seal/open operations over [`SealedBlob`]s.
//!
//! Every call to [`seal`] generates a fresh random 96-bit nonce via the system
//! CSPRNG. Nonce reuse would be catastrophic for GCM security.

use keyfort_core::KeyfortError;
use ring::aead::{AES_256_GCM, Aad, LessSafeKey, Nonce, UnboundKey};
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};

use crate::kdf::KEY_LEN;

/// GCM nonce length in bytes.
pub const NONCE_LEN: usize = 12;

/// GCM authentication tag length in bytes, appended to the ciphertext.
pub const TAG_LEN: usize = 16;

/// One authenticated-encryption output: the nonce it was produced under plus
/// the ciphertext with its trailing 16-byte tag.
///
/// A `SealedBlob` is only meaningful relative to the key that created it;
/// opening with any other key fails closed with
/// [`KeyfortError::AuthenticationFailure`].
///
/// Serializes as `{"nonce": [..12 bytes..], "ciphertext": [..]}`, matching
/// the persisted record layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedBlob {
    pub nonce: [u8; NONCE_LEN],
    pub ciphertext: Vec<u8>,
}

/// Encrypt plaintext with AES-256-GCM under a fresh random nonce.
///
/// The plaintext working copy is encrypted in place, so no plaintext bytes
/// outlive the call inside this function.
pub fn seal(key: &[u8; KEY_LEN], plaintext: &[u8]) -> Result<SealedBlob, KeyfortError> {
    let unbound = UnboundKey::new(&AES_256_GCM, key)
        .map_err(|_| KeyfortError::Crypto("failed to create AES-256-GCM key".to_string()))?;
    let less_safe = LessSafeKey::new(unbound);

    // Generate random 96-bit nonce.
    let rng = SystemRandom::new();
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rng.fill(&mut nonce_bytes)
        .map_err(|_| KeyfortError::Crypto("failed to generate random nonce".to_string()))?;

    let nonce = Nonce::assume_unique_for_key(nonce_bytes);

    // Seal in place: the buffer is extended with the authentication tag.
    let mut in_out = plaintext.to_vec();
    less_safe
        .seal_in_place_append_tag(nonce, Aad::empty(), &mut in_out)
        .map_err(|_| KeyfortError::Crypto("AES-256-GCM encryption failed".to_string()))?;

    Ok(SealedBlob {
        nonce: nonce_bytes,
        ciphertext: in_out,
    })
}

/// Decrypt a [`SealedBlob`] with AES-256-GCM.
///
/// A blob whose ciphertext cannot even hold the tag is rejected as
/// [`KeyfortError::MalformedRecord`] without attempting decryption. A tag
/// mismatch (wrong key, corruption, tampering) is
/// [`KeyfortError::AuthenticationFailure`] -- a hard failure, never garbage
/// plaintext.
pub fn open(key: &[u8; KEY_LEN], blob: &SealedBlob) -> Result<Vec<u8>, KeyfortError> {
    if blob.ciphertext.len() < TAG_LEN {
        return Err(KeyfortError::MalformedRecord(format!(
            "ciphertext of {} bytes cannot contain the {TAG_LEN}-byte tag",
            blob.ciphertext.len()
        )));
    }

    let unbound = UnboundKey::new(&AES_256_GCM, key)
        .map_err(|_| KeyfortError::Crypto("failed to create AES-256-GCM key".to_string()))?;
    let less_safe = LessSafeKey::new(unbound);

    let nonce = Nonce::assume_unique_for_key(blob.nonce);

    let mut in_out = blob.ciphertext.clone();
    let plaintext = less_safe
        .open_in_place(nonce, Aad::empty(), &mut in_out)
        .map_err(|_| KeyfortError::AuthenticationFailure)?;

    Ok(plaintext.to_vec())
}
