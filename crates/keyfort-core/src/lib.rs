// SPDX-FileCopyrightText: 2026 Keyfort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Keyfort secret vault.
//!
//! This crate provides the error taxonomy and the [`SecretStore`] trait that
//! persistence backends implement. The vault session in `keyfort-vault` is
//! generic over any `SecretStore`.

pub mod error;
pub mod traits;

// Re-export key items at crate root for ergonomic imports.
pub use error::KeyfortError;
pub use traits::SecretStore;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_store_is_object_safe() {
        fn _assert_store(_: &dyn SecretStore) {}
    }

    #[test]
    fn errors_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<KeyfortError>();
    }
}
