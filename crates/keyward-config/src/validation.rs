// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks constraints serde attributes cannot express: value ranges, path
//! shape, and key-store key collisions.

use crate::diagnostic::ConfigError;
use crate::model::KeywardConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration.
///
/// Collects every failure instead of stopping at the first.
pub fn validate_config(config: &KeywardConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut invalid = |message: String| errors.push(ConfigError::Validation { message });

    let level = config.general.log_level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        invalid(format!(
            "general.log_level must be one of {}, got `{}`",
            LOG_LEVELS.join(", "),
            config.general.log_level
        ));
    }

    let collection = config.vault.collection_path.trim();
    if collection.is_empty() {
        invalid("vault.collection_path must not be empty".to_string());
    } else if collection.starts_with('/') || collection.ends_with('/') {
        invalid(format!(
            "vault.collection_path `{collection}` must not start or end with `/`"
        ));
    }

    if !(1..=365).contains(&config.session.remember_days) {
        invalid(format!(
            "session.remember_days must be between 1 and 365, got {}",
            config.session.remember_days
        ));
    }

    if config.session.record_key.trim().is_empty() {
        invalid("session.record_key must not be empty".to_string());
    }
    if config.session.vault_blob_key.trim().is_empty() {
        invalid("session.vault_blob_key must not be empty".to_string());
    }
    if config.session.record_key == config.session.vault_blob_key {
        invalid(format!(
            "session.record_key and session.vault_blob_key must differ, both are `{}`",
            config.session.record_key
        ));
    }

    if config.storage.database_path.trim().is_empty() {
        invalid("storage.database_path must not be empty".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
