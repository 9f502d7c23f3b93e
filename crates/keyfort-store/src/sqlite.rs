// SPDX-FileCopyrightText: 2026 Keyfort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite-backed [`SecretStore`] with WAL mode and embedded migrations.
//!
//! All access goes through tokio-rusqlite's single background thread, so
//! writes are serialized at the connection level. Do NOT create additional
//! connections to the same file for writes.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use keyfort_core::{KeyfortError, SecretStore};
use rusqlite::params;
use tracing::debug;

use crate::migrations;

/// A durable key-value store over a single SQLite database file.
pub struct SqliteStore {
    conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
    /// Open (creating if necessary) the database at `path`, enable WAL mode,
    /// and run any pending migrations.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, KeyfortError> {
        let path: PathBuf = path.as_ref().to_owned();

        // Migrate on a short-lived blocking connection before handing the
        // file to the async wrapper.
        let migrate_path = path.clone();
        tokio::task::spawn_blocking(move || -> Result<(), KeyfortError> {
            let mut conn = rusqlite::Connection::open(&migrate_path).map_err(map_sq_err)?;
            conn.pragma_update(None, "journal_mode", "WAL")
                .map_err(map_sq_err)?;
            migrations::run_migrations(&mut conn)
        })
        .await
        .map_err(|e| KeyfortError::StorageUnavailable {
            source: Box::new(e),
        })??;

        // Opening reports a bare rusqlite error; only `call`/`close` wrap
        // theirs in the tokio-rusqlite error type.
        let conn = tokio_rusqlite::Connection::open(&path)
            .await
            .map_err(map_sq_err)?;
        debug!(path = %path.display(), "sqlite store opened");
        Ok(Self { conn })
    }

    /// Close the store, flushing pending writes.
    pub async fn close(self) -> Result<(), KeyfortError> {
        self.conn.close().await.map_err(map_tr_err)
    }
}

#[async_trait]
impl SecretStore for SqliteStore {
    async fn get(&self, keys: &[&str]) -> Result<HashMap<String, String>, KeyfortError> {
        let keys: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        self.conn
            .call(move |conn| -> Result<HashMap<String, String>, rusqlite::Error> {
                let mut stmt =
                    conn.prepare("SELECT value FROM store_entries WHERE key = ?1")?;
                let mut found = HashMap::new();
                for key in &keys {
                    let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
                    match result {
                        Ok(value) => {
                            found.insert(key.clone(), value);
                        }
                        Err(rusqlite::Error::QueryReturnedNoRows) => {}
                        Err(e) => return Err(e),
                    }
                }
                Ok(found)
            })
            .await
            .map_err(map_tr_err)
    }

    async fn set(&self, entries: HashMap<String, String>) -> Result<(), KeyfortError> {
        self.conn
            .call(move |conn| -> Result<(), rusqlite::Error> {
                let tx = conn.transaction()?;
                for (key, value) in &entries {
                    tx.execute(
                        "INSERT OR REPLACE INTO store_entries (key, value) VALUES (?1, ?2)",
                        params![key, value],
                    )?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }
}

/// Convert tokio-rusqlite errors to `KeyfortError::StorageUnavailable`.
fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> KeyfortError {
    KeyfortError::StorageUnavailable {
        source: Box::new(e),
    }
}

/// Convert bare rusqlite errors to `KeyfortError::StorageUnavailable`.
fn map_sq_err(e: rusqlite::Error) -> KeyfortError {
    KeyfortError::StorageUnavailable {
        source: Box::new(e),
    }
}
