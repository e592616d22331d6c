// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local key-value store adapter.

use async_trait::async_trait;

use crate::error::VaultError;

/// Adapter for platform-local secure storage.
///
/// Holds the persistent key record and the raw encrypted vault blob.
/// Implementations report failures as [`VaultError::KeyStore`].
#[async_trait]
pub trait KeyValueStore: Send + Sync + 'static {
    /// Returns the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>, VaultError>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), VaultError>;

    /// Removes `key`. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), VaultError>;
}
