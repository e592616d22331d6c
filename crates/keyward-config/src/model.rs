// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Keyward vault engine.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a misspelled key is
//! reported at startup instead of silently falling back to a default.

use serde::{Deserialize, Serialize};

/// Top-level Keyward configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct KeywardConfig {
    /// Process-wide settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Key derivation and item storage settings.
    #[serde(default)]
    pub vault: VaultConfig,

    /// Remembered-session settings.
    #[serde(default)]
    pub session: SessionConfig,

    /// Local key store settings.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Process-wide configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeneralConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Vault configuration.
///
/// The PBKDF2 iteration count is part of the vault format and is not
/// configurable.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VaultConfig {
    /// Remote collection holding the encrypted items.
    #[serde(default = "default_collection_path")]
    pub collection_path: String,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            collection_path: default_collection_path(),
        }
    }
}

fn default_collection_path() -> String {
    "vault_items".to_string()
}

/// Remembered-session configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// How long a remembered key stays restorable, in days.
    #[serde(default = "default_remember_days")]
    pub remember_days: u32,

    /// Key-value store key holding the persistent key record.
    #[serde(default = "default_record_key")]
    pub record_key: String,

    /// Key-value store key holding the raw encrypted vault blob.
    #[serde(default = "default_vault_blob_key")]
    pub vault_blob_key: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            remember_days: default_remember_days(),
            record_key: default_record_key(),
            vault_blob_key: default_vault_blob_key(),
        }
    }
}

fn default_remember_days() -> u32 {
    30
}

fn default_record_key() -> String {
    "keyward.session.persistent_key".to_string()
}

fn default_vault_blob_key() -> String {
    "keyward.session.encrypted_vault".to_string()
}

/// Local key store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database backing the key-value store.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("keyward").join("keyward.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("keyward.db"))
        .display()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = KeywardConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.vault.collection_path, "vault_items");
        assert_eq!(config.session.remember_days, 30);
        assert_ne!(config.session.record_key, config.session.vault_blob_key);
        assert!(config.storage.database_path.ends_with("keyward.db"));
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config: KeywardConfig = toml::from_str("[session]\nremember_days = 7\n").unwrap();
        assert_eq!(config.session.remember_days, 7);
        assert_eq!(config.session.record_key, "keyward.session.persistent_key");
    }

    #[test]
    fn kdf_iterations_is_not_a_setting() {
        assert!(toml::from_str::<KeywardConfig>("[vault]\nkdf_iterations = 100000\n").is_err());
    }

    #[test]
    fn unknown_section_is_rejected() {
        assert!(toml::from_str::<KeywardConfig>("[telemetry]\nenabled = true\n").is_err());
    }
}
