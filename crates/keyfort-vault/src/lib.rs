// SPDX-FileCopyrightText: 2026 Keyfort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Passphrase-derived AES-256-GCM vault core.
//!
//! The master passphrase never touches disk. At setup it is committed as an
//! Argon2id verifier and stretched into a session key via PBKDF2-HMAC-SHA256
//! over a per-vault random salt; each credential's password is then sealed
//! individually with AES-256-GCM under a fresh nonce. The session key lives
//! only inside an unlocked [`VaultSession`] and is zeroized on lock.

pub mod crypto;
pub mod kdf;
pub mod prompt;
pub mod records;
pub mod session;
pub mod verifier;

pub use crypto::SealedBlob;
pub use prompt::{
    get_vault_passphrase, get_vault_passphrase_with_confirm, open_session_interactive,
};
pub use records::VaultEntry;
pub use session::{ListedRecord, RecordValue, VaultSession, mask_secret};
