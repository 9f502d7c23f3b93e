// SPDX-FileCopyrightText: 2026 Keyfort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Passphrase acquisition and the setup-or-unlock routing flow.
//!
//! Embedding callers rarely want to orchestrate `initialized` / `setup` /
//! `unlock` by hand: [`open_session_interactive`] reads the passphrase from
//! the `KEYFORT_VAULT_KEY` environment variable or a TTY prompt and routes a
//! first-time vault through setup (with confirmation) and an existing one
//! through unlock. The empty-passphrase policy matches the session's:
//! rejected here before any derivation work happens.

use keyfort_core::{KeyfortError, SecretStore};
use secrecy::SecretString;

use crate::session::VaultSession;

/// The environment variable name for providing the vault passphrase.
pub const VAULT_KEY_ENV_VAR: &str = "KEYFORT_VAULT_KEY";

/// A non-empty passphrase from the environment, if one is set.
fn env_passphrase() -> Option<SecretString> {
    match std::env::var(VAULT_KEY_ENV_VAR) {
        Ok(key) if !key.is_empty() => Some(SecretString::from(key)),
        _ => None,
    }
}

fn read_from_tty(label: &str) -> Result<String, KeyfortError> {
    eprint!("{label}: ");
    rpassword::read_password()
        .map_err(|e| KeyfortError::InvalidInput(format!("failed to read passphrase: {e}")))
}

fn require_non_empty(passphrase: String) -> Result<SecretString, KeyfortError> {
    if passphrase.is_empty() {
        return Err(KeyfortError::InvalidInput(
            "master passphrase must not be empty".to_string(),
        ));
    }
    Ok(SecretString::from(passphrase))
}

fn no_source_error() -> KeyfortError {
    KeyfortError::InvalidInput(format!(
        "no passphrase provided; set {VAULT_KEY_ENV_VAR} or run interactively"
    ))
}

/// Get the vault passphrase: `KEYFORT_VAULT_KEY` first (for headless use),
/// then an interactive TTY prompt.
pub fn get_vault_passphrase() -> Result<SecretString, KeyfortError> {
    if let Some(passphrase) = env_passphrase() {
        return Ok(passphrase);
    }

    if std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        return require_non_empty(read_from_tty("Vault passphrase")?);
    }

    Err(no_source_error())
}

/// Get the vault passphrase with a confirmation prompt, for first-time setup.
///
/// The env var does not need confirmation; interactively the passphrase is
/// read twice and must match.
pub fn get_vault_passphrase_with_confirm() -> Result<SecretString, KeyfortError> {
    if let Some(passphrase) = env_passphrase() {
        return Ok(passphrase);
    }

    if std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        let first = read_from_tty("New vault passphrase")?;
        let second = read_from_tty("Confirm vault passphrase")?;
        if first != second {
            return Err(KeyfortError::InvalidInput(
                "passphrases do not match".to_string(),
            ));
        }
        return require_non_empty(first);
    }

    Err(no_source_error())
}

/// Bring a session to the Unlocked state, acquiring the passphrase from the
/// environment or the TTY.
///
/// A vault with no master verifier yet goes through `setup` (confirmed
/// passphrase); an initialized one goes through `unlock`. Wrong-passphrase
/// and storage failures surface unchanged for the caller to handle.
pub async fn open_session_interactive<S: SecretStore>(
    session: &VaultSession<S>,
) -> Result<(), KeyfortError> {
    if session.initialized().await? {
        session.unlock(&get_vault_passphrase()?).await
    } else {
        session.setup(&get_vault_passphrase_with_confirm()?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyfort_config::VaultConfig;
    use keyfort_store::MemoryStore;
    use secrecy::ExposeSecret;
    use serial_test::serial;

    fn session() -> VaultSession<MemoryStore> {
        VaultSession::new(
            MemoryStore::new(),
            VaultConfig {
                kdf_iterations: 1_000,
            },
        )
    }

    #[test]
    #[serial]
    fn passphrase_comes_from_env_var() {
        // SAFETY: test-only env mutation, serialized via serial_test.
        unsafe { std::env::set_var(VAULT_KEY_ENV_VAR, "test-passphrase") };
        let result = get_vault_passphrase();
        unsafe { std::env::remove_var(VAULT_KEY_ENV_VAR) };

        assert_eq!(result.unwrap().expose_secret(), "test-passphrase");
    }

    #[test]
    #[serial]
    fn confirm_variant_skips_confirmation_for_env_var() {
        unsafe { std::env::set_var(VAULT_KEY_ENV_VAR, "test-passphrase") };
        let result = get_vault_passphrase_with_confirm();
        unsafe { std::env::remove_var(VAULT_KEY_ENV_VAR) };

        assert!(result.is_ok());
    }

    #[test]
    #[serial]
    fn empty_env_var_is_not_a_passphrase() {
        unsafe { std::env::set_var(VAULT_KEY_ENV_VAR, "") };
        // In CI, stdin is not a terminal, so this falls through to the error.
        let result = get_vault_passphrase();
        unsafe { std::env::remove_var(VAULT_KEY_ENV_VAR) };

        assert!(matches!(result, Err(KeyfortError::InvalidInput(_))));
    }

    #[tokio::test]
    #[serial]
    async fn interactive_open_routes_first_use_to_setup_then_unlock() {
        unsafe { std::env::set_var(VAULT_KEY_ENV_VAR, "pw1") };

        let vault = session();
        open_session_interactive(&vault).await.unwrap();
        assert!(vault.initialized().await.unwrap());
        assert!(vault.is_unlocked().await);

        vault.lock().await;
        open_session_interactive(&vault).await.unwrap();
        assert!(vault.is_unlocked().await);

        unsafe { std::env::remove_var(VAULT_KEY_ENV_VAR) };
    }

    #[tokio::test]
    #[serial]
    async fn interactive_open_surfaces_wrong_passphrase() {
        unsafe { std::env::set_var(VAULT_KEY_ENV_VAR, "pw1") };
        let vault = session();
        open_session_interactive(&vault).await.unwrap();
        vault.lock().await;

        unsafe { std::env::set_var(VAULT_KEY_ENV_VAR, "wrong") };
        let result = open_session_interactive(&vault).await;
        unsafe { std::env::remove_var(VAULT_KEY_ENV_VAR) };

        assert!(matches!(result, Err(KeyfortError::WrongPassphrase)));
        assert!(!vault.is_unlocked().await);
    }
}
