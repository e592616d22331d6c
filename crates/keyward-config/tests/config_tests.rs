// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Keyward configuration system.

use keyward_config::diagnostic::ConfigError;
use keyward_config::{load_and_validate_str, load_config_from_str};

/// Valid TOML with every known field deserializes successfully.
#[test]
fn valid_toml_deserializes_into_keyward_config() {
    let toml = r#"
[general]
log_level = "debug"

[vault]
collection_path = "users/alice/items"

[session]
remember_days = 14
record_key = "kw.record"
vault_blob_key = "kw.blob"

[storage]
database_path = "/tmp/keyward-test.db"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.general.log_level, "debug");
    assert_eq!(config.vault.collection_path, "users/alice/items");
    assert_eq!(config.session.remember_days, 14);
    assert_eq!(config.session.record_key, "kw.record");
    assert_eq!(config.session.vault_blob_key, "kw.blob");
    assert_eq!(config.storage.database_path, "/tmp/keyward-test.db");
}

/// An empty document yields the compiled defaults.
#[test]
fn empty_toml_uses_defaults() {
    let config = load_and_validate_str("").expect("defaults should validate");
    assert_eq!(config.vault.collection_path, "vault_items");
    assert_eq!(config.session.remember_days, 30);
}

/// A misspelled key becomes an UnknownKey diagnostic with a suggestion.
#[test]
fn unknown_key_produces_suggestion() {
    let toml = r#"
[session]
remember_dayz = 3
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject unknown key");
    let found = errors.iter().any(|e| {
        matches!(
            e,
            ConfigError::UnknownKey { key, suggestion: Some(s), .. }
                if key == "remember_dayz" && s == "remember_days"
        )
    });
    assert!(found, "expected suggestion for remember_dayz, got: {errors:?}");
}

/// A wrongly typed value becomes an InvalidType diagnostic.
#[test]
fn wrong_type_produces_invalid_type() {
    let toml = r#"
[session]
remember_days = "many"
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject string days");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { key, .. } if key.contains("remember_days"))),
        "got: {errors:?}"
    );
}

/// Semantic validation runs after a successful parse.
#[test]
fn out_of_range_days_are_rejected_after_parse() {
    let toml = r#"
[session]
remember_days = 0
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject zero days");
    assert!(errors.iter().any(|e| matches!(e, ConfigError::Validation { .. })));
}

/// The KDF iteration count is fixed by the vault format, so a config file
/// cannot set it.
#[test]
fn kdf_iterations_key_is_unknown() {
    let toml = r#"
[vault]
kdf_iterations = 100000
"#;

    let errors = load_and_validate_str(toml).expect_err("iterations are not configurable");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::UnknownKey { key, .. } if key == "kdf_iterations")),
        "got: {errors:?}"
    );
}

/// `KEYWARD_<SECTION>_<KEY>` variables reach the nested field.
#[test]
fn env_variables_override_sections() {
    figment::Jail::expect_with(|jail| {
        jail.set_env("KEYWARD_GENERAL_LOG_LEVEL", "debug");
        jail.set_env("KEYWARD_SESSION_VAULT_BLOB_KEY", "kw.env.blob");
        let config = keyward_config::loader::load_config()?;
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.session.vault_blob_key, "kw.env.blob");
        Ok(())
    });
}

/// Diagnostics render through miette without panicking.
#[test]
fn diagnostics_render() {
    let errors = load_and_validate_str("[general]\nlog_levle = \"info\"\n").unwrap_err();
    keyward_config::render_errors(&errors);
    let rendered = format!("{}", errors[0]);
    assert!(rendered.contains("log_levle"));
}
