// SPDX-FileCopyrightText: 2026 Keyfort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence backends for the Keyfort secret vault.
//!
//! Provides two [`keyfort_core::SecretStore`] implementations: a WAL-mode
//! SQLite store with embedded migrations and a single-writer concurrency
//! model via `tokio-rusqlite`, and an in-memory store for tests and
//! ephemeral vaults.

pub mod memory;
pub mod migrations;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
