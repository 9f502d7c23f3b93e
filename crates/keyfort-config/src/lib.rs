// SPDX-FileCopyrightText: 2026 Keyfort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Keyfort secret vault.
//!
//! TOML files merged through Figment with `KEYFORT_*` environment overrides,
//! serde models with compiled defaults, and a validation pass that enforces
//! semantic constraints like the KDF iteration floor.

pub mod loader;
pub mod model;
pub mod validation;

pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{KeyfortConfig, StoreConfig, VaultConfig};
pub use validation::{MIN_KDF_ITERATIONS, validate_config};
