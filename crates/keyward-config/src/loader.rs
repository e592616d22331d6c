// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Lookup order, later overriding earlier: compiled defaults,
//! `/etc/keyward/keyward.toml`, `~/.config/keyward/keyward.toml`,
//! `./keyward.toml`, then `KEYWARD_*` environment variables.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::KeywardConfig;

const SYSTEM_CONFIG: &str = "/etc/keyward/keyward.toml";
const LOCAL_CONFIG: &str = "keyward.toml";

/// Config files consulted by [`load_config`], lowest precedence first.
pub fn config_file_candidates() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(SYSTEM_CONFIG)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("keyward").join(LOCAL_CONFIG));
    }
    paths.push(PathBuf::from(LOCAL_CONFIG));
    paths
}

/// Build the layered Figment without extracting it.
pub fn build_figment() -> Figment {
    let figment = config_file_candidates()
        .into_iter()
        .fold(defaults(), |figment, path| figment.merge(Toml::file(path)));
    figment.merge(env_provider())
}

/// Load configuration from the standard hierarchy with env var overrides.
pub fn load_config() -> Result<KeywardConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no file lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<KeywardConfig, figment::Error> {
    defaults().merge(Toml::string(toml_content)).extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<KeywardConfig, figment::Error> {
    defaults()
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

fn defaults() -> Figment {
    Figment::new().merge(Serialized::defaults(KeywardConfig::default()))
}

/// Map `KEYWARD_<SECTION>_<KEY>` to `<section>.<key>`.
///
/// Only the first underscore after a known section name becomes a dot, so
/// `KEYWARD_SESSION_RECORD_KEY` maps to `session.record_key`.
/// `KEYWARD_MASTER_PASSWORD` is read by the CLI prompt, not by config.
fn env_provider() -> Env {
    Env::prefixed("KEYWARD_")
        .filter(|key| !key.as_str().eq_ignore_ascii_case("master_password"))
        .map(|key| {
            let key_str = key.as_str().to_ascii_lowercase();
            let mapped = ["general", "vault", "session", "storage"]
                .iter()
                .find_map(|section| {
                    key_str
                        .strip_prefix(section)
                        .and_then(|rest| rest.strip_prefix('_'))
                        .map(|rest| format!("{section}.{rest}"))
                })
                .unwrap_or(key_str);
            mapped.into()
        })
}
