// SPDX-FileCopyrightText: 2026 Keyfort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! PBKDF2-HMAC-SHA256 key derivation from the master passphrase.
//!
//! Pure function of (passphrase, salt, iterations): the same inputs always
//! produce the same 32-byte key. The iteration count is the tunable cost
//! parameter; its floor lives in `keyfort-config` validation.

use std::num::NonZeroU32;

use keyfort_core::KeyfortError;
use ring::pbkdf2;
use ring::rand::{SecureRandom, SystemRandom};
use zeroize::Zeroizing;

/// Session key length in bytes (AES-256).
pub const KEY_LEN: usize = 32;

/// KDF salt length in bytes.
pub const SALT_LEN: usize = 16;

/// Derive a 32-byte session key from the passphrase.
///
/// The returned key is wrapped in [`Zeroizing`] for automatic memory zeroing
/// on drop.
pub fn derive_key(
    passphrase: &[u8],
    salt: &[u8; SALT_LEN],
    iterations: u32,
) -> Result<Zeroizing<[u8; KEY_LEN]>, KeyfortError> {
    let iterations = NonZeroU32::new(iterations).ok_or_else(|| {
        KeyfortError::InvalidInput("KDF iteration count must be at least 1".to_string())
    })?;

    let mut output = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2::derive(
        pbkdf2::PBKDF2_HMAC_SHA256,
        iterations,
        salt,
        passphrase,
        output.as_mut(),
    );

    Ok(output)
}

/// Generate a random 16-byte per-vault salt.
pub fn generate_salt() -> Result<[u8; SALT_LEN], KeyfortError> {
    let rng = SystemRandom::new();
    let mut salt = [0u8; SALT_LEN];
    rng.fill(&mut salt)
        .map_err(|_| KeyfortError::Crypto("failed to generate random salt".to_string()))?;
    Ok(salt)
}
