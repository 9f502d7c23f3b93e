// SPDX-FileCopyrightText: 2026 Keyfort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vault session lifecycle: setup, unlock, lock, add and list records.
//!
//! The session is a two-state machine. Locked holds no key material at all;
//! Unlocked holds the derived session key in a [`Zeroizing`] buffer that is
//! wiped the moment the session locks. All operations serialize on one
//! internal mutex: two in-flight `unlock` calls can never race into divergent
//! keys, and two `add_record` calls can never lose each other's writes during
//! the whole-collection read-modify-write.

use std::collections::HashMap;

use keyfort_config::VaultConfig;
use keyfort_core::{KeyfortError, SecretStore};
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::crypto;
use crate::kdf::{self, KEY_LEN, SALT_LEN};
use crate::records::{self, VaultEntry};
use crate::verifier;

/// Store key holding the Argon2id PHC verifier string.
pub const KEY_MASTER_VERIFIER: &str = "masterVerifier";
/// Store key holding the hex-encoded per-vault KDF salt.
pub const KEY_KDF_SALT: &str = "kdfSalt";
/// Store key holding the KDF parameters captured at setup, as JSON.
pub const KEY_KDF_PARAMS: &str = "kdfParams";
/// Store key holding the whole record collection, as JSON.
pub const KEY_VAULT_ENTRIES: &str = "vaultEntries";

enum SessionState {
    Locked,
    Unlocked { key: Zeroizing<[u8; KEY_LEN]> },
}

/// The vault session, generic over the backing [`SecretStore`].
///
/// Owned by whoever calls [`setup`](VaultSession::setup) or
/// [`unlock`](VaultSession::unlock); there is at most one session per vault.
/// Debug output intentionally omits the session key.
pub struct VaultSession<S: SecretStore> {
    store: S,
    config: VaultConfig,
    state: Mutex<SessionState>,
}

impl<S: SecretStore> std::fmt::Debug for VaultSession<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultSession")
            .field("session_key", &"[REDACTED]")
            .finish()
    }
}

/// One decrypted listing row. Site and username are always readable; the
/// password is either revealed plaintext or a per-entry failure.
#[derive(Debug)]
pub struct ListedRecord {
    pub site: String,
    pub username: String,
    pub password: RecordValue,
}

/// The outcome of opening one sealed password during a listing.
///
/// A single corrupted entry degrades to [`RecordValue::Unreadable`] instead
/// of aborting the whole listing, so one bad record never hides the rest of
/// the vault.
#[derive(Debug)]
pub enum RecordValue {
    Plaintext(SecretString),
    Unreadable(KeyfortError),
}

impl RecordValue {
    /// Display sentinel for entries that failed to decrypt.
    pub const DECRYPT_FAILED: &'static str = "[decryption failed]";

    pub fn plaintext(&self) -> Option<&SecretString> {
        match self {
            RecordValue::Plaintext(value) => Some(value),
            RecordValue::Unreadable(_) => None,
        }
    }

    /// Render for display: the revealed password, or the failure sentinel.
    pub fn reveal(&self) -> String {
        match self {
            RecordValue::Plaintext(value) => value.expose_secret().to_string(),
            RecordValue::Unreadable(_) => Self::DECRYPT_FAILED.to_string(),
        }
    }

    /// Render a masked preview (`"corr...orse"`) instead of the plaintext,
    /// for listings that must not show the password itself.
    pub fn masked(&self) -> String {
        match self {
            RecordValue::Plaintext(value) => mask_secret(value.expose_secret()),
            RecordValue::Unreadable(_) => Self::DECRYPT_FAILED.to_string(),
        }
    }
}

impl<S: SecretStore> VaultSession<S> {
    /// Create a session in the Locked state. No store access happens here.
    pub fn new(store: S, config: VaultConfig) -> Self {
        Self {
            store,
            config,
            state: Mutex::new(SessionState::Locked),
        }
    }

    /// Whether a master verifier exists in the store. Callers use this to
    /// route first-time users to [`setup`](VaultSession::setup).
    pub async fn initialized(&self) -> Result<bool, KeyfortError> {
        let found = self.store.get(&[KEY_MASTER_VERIFIER]).await?;
        Ok(found.contains_key(KEY_MASTER_VERIFIER))
    }

    /// Whether the session currently holds the key.
    pub async fn is_unlocked(&self) -> bool {
        matches!(*self.state.lock().await, SessionState::Unlocked { .. })
    }

    /// First-ever initialization: commit the verifier, generate the per-vault
    /// salt, persist both, and transition to Unlocked.
    pub async fn setup(&self, passphrase: &SecretString) -> Result<(), KeyfortError> {
        let mut state = self.state.lock().await;

        if passphrase.expose_secret().is_empty() {
            return Err(KeyfortError::InvalidInput(
                "master passphrase must not be empty".to_string(),
            ));
        }

        let existing = self.store.get(&[KEY_MASTER_VERIFIER]).await?;
        if existing.contains_key(KEY_MASTER_VERIFIER) {
            return Err(KeyfortError::AlreadyInitialized);
        }

        let committed = verifier::commit(passphrase)?;
        let salt = kdf::generate_salt()?;
        let key = kdf::derive_key(
            passphrase.expose_secret().as_bytes(),
            &salt,
            self.config.kdf_iterations,
        )?;

        // The iteration count in effect now is persisted with the vault, so
        // later unlocks use the parameters the key was derived with even if
        // the config changes.
        let params = serde_json::json!({ "iterations": self.config.kdf_iterations }).to_string();

        self.store
            .set(HashMap::from([
                (KEY_MASTER_VERIFIER.to_string(), committed),
                (KEY_KDF_SALT.to_string(), hex::encode(salt)),
                (KEY_KDF_PARAMS.to_string(), params),
            ]))
            .await?;

        *state = SessionState::Unlocked { key };
        info!("vault initialized and unlocked");
        Ok(())
    }

    /// Verify the passphrase against the stored verifier and, on match,
    /// derive the session key and transition to Unlocked.
    ///
    /// On mismatch the session stays Locked and no key material is derived.
    pub async fn unlock(&self, passphrase: &SecretString) -> Result<(), KeyfortError> {
        let mut state = self.state.lock().await;

        if passphrase.expose_secret().is_empty() {
            return Err(KeyfortError::InvalidInput(
                "master passphrase must not be empty".to_string(),
            ));
        }

        let meta = self
            .store
            .get(&[KEY_MASTER_VERIFIER, KEY_KDF_SALT, KEY_KDF_PARAMS])
            .await?;

        let stored = meta
            .get(KEY_MASTER_VERIFIER)
            .ok_or(KeyfortError::NotInitialized)?;

        if !verifier::verify(passphrase, stored)? {
            debug!("unlock rejected: verifier mismatch");
            return Err(KeyfortError::WrongPassphrase);
        }

        let salt = decode_salt(meta.get(KEY_KDF_SALT))?;
        let iterations = decode_iterations(meta.get(KEY_KDF_PARAMS))?;

        let key = kdf::derive_key(passphrase.expose_secret().as_bytes(), &salt, iterations)?;

        *state = SessionState::Unlocked { key };
        debug!("vault unlocked");
        Ok(())
    }

    /// Transition to Locked, zeroizing the session key. Idempotent.
    pub async fn lock(&self) {
        let mut state = self.state.lock().await;
        // The old Unlocked state drops here; Zeroizing wipes the key bytes.
        *state = SessionState::Locked;
        debug!("vault locked");
    }

    /// Seal the password and append a record to the collection.
    ///
    /// The whole collection is re-read, mutated, and re-written under the
    /// session mutex. The plaintext working copy inside `seal` is encrypted
    /// in place, so no extra plaintext buffer survives the call.
    pub async fn add_record(
        &self,
        site: &str,
        username: &str,
        password: &str,
    ) -> Result<(), KeyfortError> {
        let state = self.state.lock().await;
        let SessionState::Unlocked { key } = &*state else {
            return Err(KeyfortError::VaultLocked);
        };

        // All three fields are stored trimmed; surrounding whitespace is
        // never meaningful in a credential.
        let site = site.trim();
        let username = username.trim();
        let password = password.trim();
        if site.is_empty() || username.is_empty() || password.is_empty() {
            return Err(KeyfortError::InvalidInput(
                "site, username, and password are all required".to_string(),
            ));
        }

        let sealed = crypto::seal(key, password.as_bytes())?;

        let stored = self.store.get(&[KEY_VAULT_ENTRIES]).await?;
        let mut entries = match stored.get(KEY_VAULT_ENTRIES) {
            Some(raw) => records::decode_entries(raw)?,
            None => Vec::new(),
        };

        entries.push(VaultEntry {
            site: site.to_string(),
            username: username.to_string(),
            sealed_password: sealed,
        });

        let encoded = records::encode_entries(&entries)?;
        self.store
            .set(HashMap::from([(KEY_VAULT_ENTRIES.to_string(), encoded)]))
            .await?;

        debug!(site = %site, total = entries.len(), "record added to vault");
        Ok(())
    }

    /// Open every stored record with the session key, in insertion order.
    ///
    /// An entry whose blob fails to open is reported as
    /// [`RecordValue::Unreadable`] for that entry only; the rest of the vault
    /// still decrypts. Store failures and a collection that does not parse at
    /// all still abort the whole call.
    pub async fn list_records(&self) -> Result<Vec<ListedRecord>, KeyfortError> {
        let state = self.state.lock().await;
        let SessionState::Unlocked { key } = &*state else {
            return Err(KeyfortError::VaultLocked);
        };

        let stored = self.store.get(&[KEY_VAULT_ENTRIES]).await?;
        let entries = match stored.get(KEY_VAULT_ENTRIES) {
            Some(raw) => records::decode_entries(raw)?,
            None => Vec::new(),
        };

        let mut listed = Vec::with_capacity(entries.len());
        for entry in entries {
            let password = match crypto::open(key, &entry.sealed_password) {
                Ok(plaintext) => match String::from_utf8(plaintext) {
                    Ok(text) => RecordValue::Plaintext(SecretString::from(text)),
                    Err(_) => {
                        warn!(site = %entry.site, "decrypted password is not valid UTF-8");
                        RecordValue::Unreadable(KeyfortError::MalformedRecord(
                            "decrypted value is not valid UTF-8".to_string(),
                        ))
                    }
                },
                Err(
                    e @ (KeyfortError::AuthenticationFailure | KeyfortError::MalformedRecord(_)),
                ) => {
                    warn!(site = %entry.site, error = %e, "failed to open sealed password");
                    RecordValue::Unreadable(e)
                }
                Err(e) => return Err(e),
            };

            listed.push(ListedRecord {
                site: entry.site,
                username: entry.username,
                password,
            });
        }

        Ok(listed)
    }
}

fn decode_salt(raw: Option<&String>) -> Result<[u8; SALT_LEN], KeyfortError> {
    let raw = raw.ok_or_else(|| {
        KeyfortError::MalformedRecord("kdfSalt missing from initialized vault".to_string())
    })?;
    let bytes = hex::decode(raw)
        .map_err(|e| KeyfortError::MalformedRecord(format!("kdfSalt is not valid hex: {e}")))?;
    bytes.try_into().map_err(|_| {
        KeyfortError::MalformedRecord(format!("kdfSalt must be {SALT_LEN} bytes"))
    })
}

fn decode_iterations(raw: Option<&String>) -> Result<u32, KeyfortError> {
    let raw = raw.ok_or_else(|| {
        KeyfortError::MalformedRecord("kdfParams missing from initialized vault".to_string())
    })?;
    let params: serde_json::Value = serde_json::from_str(raw)
        .map_err(|e| KeyfortError::MalformedRecord(format!("corrupted kdfParams: {e}")))?;
    let iterations = params["iterations"].as_u64().ok_or_else(|| {
        KeyfortError::MalformedRecord("missing iterations in kdfParams".to_string())
    })?;
    u32::try_from(iterations).map_err(|_| {
        KeyfortError::MalformedRecord(format!("iteration count {iterations} out of range"))
    })
}

/// Mask a secret value for display: `"corr...orse"` format.
///
/// Shows the first 4 and last 4 characters with `...` in between. Short
/// values (< 10 chars) are fully masked as `"****"`. Operates on chars, so
/// multi-byte values never split inside a code point.
pub fn mask_secret(value: &str) -> String {
    let char_count = value.chars().count();
    if char_count < 10 {
        return "****".to_string();
    }
    let prefix: String = value.chars().take(4).collect();
    let suffix: String = value.chars().skip(char_count - 4).collect();
    format!("{prefix}...{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use keyfort_store::MemoryStore;
    use std::sync::Arc;

    /// Low iteration count for fast tests.
    fn test_config() -> VaultConfig {
        VaultConfig {
            kdf_iterations: 1_000,
        }
    }

    fn session() -> VaultSession<MemoryStore> {
        VaultSession::new(MemoryStore::new(), test_config())
    }

    fn pw(s: &str) -> SecretString {
        SecretString::from(s.to_string())
    }

    #[tokio::test]
    async fn end_to_end_setup_add_lock_unlock_list() {
        let vault = session();

        vault.setup(&pw("pw1")).await.unwrap();
        vault
            .add_record("example.com", "alice", "s3cr3t")
            .await
            .unwrap();
        vault.lock().await;
        vault.unlock(&pw("pw1")).await.unwrap();

        let records = vault.list_records().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].site, "example.com");
        assert_eq!(records[0].username, "alice");
        assert_eq!(
            records[0].password.plaintext().unwrap().expose_secret(),
            "s3cr3t"
        );
    }

    #[tokio::test]
    async fn setup_twice_is_already_initialized_and_keeps_first_verifier() {
        let store = Arc::new(MemoryStore::new());
        let vault = VaultSession::new(Arc::clone(&store), test_config());

        vault.setup(&pw("first")).await.unwrap();
        let before = store.get(&[KEY_MASTER_VERIFIER]).await.unwrap();

        let result = vault.setup(&pw("second")).await;
        assert!(matches!(result, Err(KeyfortError::AlreadyInitialized)));

        let after = store.get(&[KEY_MASTER_VERIFIER]).await.unwrap();
        assert_eq!(before.get(KEY_MASTER_VERIFIER), after.get(KEY_MASTER_VERIFIER));
    }

    #[tokio::test]
    async fn wrong_passphrase_is_rejected_and_session_stays_locked() {
        let vault = session();
        vault.setup(&pw("correct-horse")).await.unwrap();
        vault.lock().await;

        let result = vault.unlock(&pw("wrong")).await;
        assert!(matches!(result, Err(KeyfortError::WrongPassphrase)));
        assert!(!vault.is_unlocked().await);

        let add = vault.add_record("site", "user", "pw").await;
        assert!(matches!(add, Err(KeyfortError::VaultLocked)));
    }

    #[tokio::test]
    async fn unlock_before_setup_is_not_initialized() {
        let vault = session();
        let result = vault.unlock(&pw("anything")).await;
        assert!(matches!(result, Err(KeyfortError::NotInitialized)));
    }

    #[tokio::test]
    async fn empty_passphrase_is_rejected_by_setup_and_unlock() {
        let vault = session();
        assert!(matches!(
            vault.setup(&pw("")).await,
            Err(KeyfortError::InvalidInput(_))
        ));

        vault.setup(&pw("real")).await.unwrap();
        vault.lock().await;
        assert!(matches!(
            vault.unlock(&pw("")).await,
            Err(KeyfortError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn add_record_rejects_empty_fields() {
        let vault = session();
        vault.setup(&pw("pw")).await.unwrap();

        for (site, user, pass) in [
            ("", "u", "p"),
            ("s", "  ", "p"),
            ("s", "u", ""),
            ("s", "u", "   "),
        ] {
            let result = vault.add_record(site, user, pass).await;
            assert!(matches!(result, Err(KeyfortError::InvalidInput(_))));
        }

        assert!(vault.list_records().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn fields_are_stored_trimmed() {
        let vault = session();
        vault.setup(&pw("pw")).await.unwrap();

        vault
            .add_record("  example.com  ", " alice ", " s3cr3t ")
            .await
            .unwrap();

        let records = vault.list_records().await.unwrap();
        assert_eq!(records[0].site, "example.com");
        assert_eq!(records[0].username, "alice");
        assert_eq!(records[0].password.reveal(), "s3cr3t");
    }

    #[tokio::test]
    async fn records_keep_insertion_order() {
        let vault = session();
        vault.setup(&pw("pw")).await.unwrap();

        vault.add_record("first.com", "a", "1").await.unwrap();
        vault.add_record("second.com", "b", "2").await.unwrap();
        vault.add_record("third.com", "c", "3").await.unwrap();

        let records = vault.list_records().await.unwrap();
        let sites: Vec<&str> = records.iter().map(|r| r.site.as_str()).collect();
        assert_eq!(sites, vec!["first.com", "second.com", "third.com"]);
    }

    #[tokio::test]
    async fn corrupted_entry_degrades_without_hiding_the_rest() {
        let store = Arc::new(MemoryStore::new());
        let vault = VaultSession::new(Arc::clone(&store), test_config());

        vault.setup(&pw("pw")).await.unwrap();
        vault.add_record("one.com", "u1", "p1").await.unwrap();
        vault.add_record("two.com", "u2", "p2").await.unwrap();
        vault.add_record("three.com", "u3", "p3").await.unwrap();

        // Truncate the middle entry's ciphertext behind the session's back.
        let raw = store.get(&[KEY_VAULT_ENTRIES]).await.unwrap();
        let mut entries = records::decode_entries(&raw[KEY_VAULT_ENTRIES]).unwrap();
        entries[1].sealed_password.ciphertext.truncate(4);
        let encoded = records::encode_entries(&entries).unwrap();
        store
            .set(HashMap::from([(KEY_VAULT_ENTRIES.to_string(), encoded)]))
            .await
            .unwrap();

        let records = vault.list_records().await.unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].password.reveal(), "p1");
        assert_eq!(records[1].password.reveal(), RecordValue::DECRYPT_FAILED);
        assert!(records[1].password.plaintext().is_none());
        assert_eq!(records[2].password.reveal(), "p3");
    }

    #[tokio::test]
    async fn lock_is_idempotent_and_unlock_restores_access() {
        let vault = session();
        vault.setup(&pw("pw")).await.unwrap();
        vault.add_record("s.com", "u", "p").await.unwrap();

        vault.lock().await;
        vault.lock().await;
        assert!(matches!(
            vault.list_records().await,
            Err(KeyfortError::VaultLocked)
        ));

        vault.unlock(&pw("pw")).await.unwrap();
        assert_eq!(vault.list_records().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn concurrent_adds_do_not_lose_updates() {
        let vault = Arc::new(session());
        vault.setup(&pw("pw")).await.unwrap();

        let v1 = Arc::clone(&vault);
        let v2 = Arc::clone(&vault);
        let (a, b) = tokio::join!(
            tokio::spawn(async move { v1.add_record("a.com", "u", "p").await }),
            tokio::spawn(async move { v2.add_record("b.com", "u", "p").await }),
        );
        a.unwrap().unwrap();
        b.unwrap().unwrap();

        assert_eq!(vault.list_records().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn initialized_reflects_store_contents() {
        let vault = session();
        assert!(!vault.initialized().await.unwrap());
        vault.setup(&pw("pw")).await.unwrap();
        assert!(vault.initialized().await.unwrap());
    }

    /// A store whose backend is permanently down.
    struct DownStore;

    #[async_trait]
    impl SecretStore for DownStore {
        async fn get(&self, _keys: &[&str]) -> Result<HashMap<String, String>, KeyfortError> {
            Err(KeyfortError::StorageUnavailable {
                source: Box::new(std::io::Error::other("backend down")),
            })
        }

        async fn set(&self, _entries: HashMap<String, String>) -> Result<(), KeyfortError> {
            Err(KeyfortError::StorageUnavailable {
                source: Box::new(std::io::Error::other("backend down")),
            })
        }
    }

    #[tokio::test]
    async fn store_failure_is_not_mistaken_for_uninitialized() {
        let vault = VaultSession::new(DownStore, test_config());
        let result = vault.unlock(&pw("pw")).await;
        assert!(matches!(
            result,
            Err(KeyfortError::StorageUnavailable { .. })
        ));
    }

    #[test]
    fn mask_secret_long_value() {
        assert_eq!(mask_secret("correct-horse-battery"), "corr...tery");
    }

    #[test]
    fn mask_secret_short_value() {
        assert_eq!(mask_secret("short"), "****");
    }

    #[test]
    fn mask_secret_exact_boundary() {
        assert_eq!(mask_secret("1234567890"), "1234...7890");
    }

    #[test]
    fn mask_secret_multibyte_value_does_not_split_code_points() {
        assert_eq!(mask_secret("密码密码密码"), "****");
        assert_eq!(mask_secret("пароль-пароль"), "паро...роль");
    }

    #[tokio::test]
    async fn masked_listing_hides_plaintext_but_flags_failures() {
        let vault = session();
        vault.setup(&pw("pw")).await.unwrap();
        vault
            .add_record("example.com", "alice", "correct-horse-battery")
            .await
            .unwrap();

        let records = vault.list_records().await.unwrap();
        assert_eq!(records[0].password.masked(), "corr...tery");

        let unreadable = RecordValue::Unreadable(KeyfortError::AuthenticationFailure);
        assert_eq!(unreadable.masked(), RecordValue::DECRYPT_FAILED);
    }

    #[test]
    fn debug_output_redacts_key_material() {
        let vault = session();
        let debug = format!("{vault:?}");
        assert!(debug.contains("[REDACTED]"));
    }
}
