// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lifecycle of the user secret key.
//!
//! States: Locked -> Unlocked -> Remembered. `Remembered` is `Unlocked` plus
//! a persistent key record in the local key-value store: the secret key
//! sealed under a key derived from the device fingerprint, with an absolute
//! expiry. [`SessionKeyManager::restore`] turns a valid record back into an
//! unlocked session after a restart.

use std::sync::Arc;

use keyward_config::model::SessionConfig;
use keyward_core::{Clock, KeyValueStore, SessionFailure, VaultError};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::cache::VaultCache;
use crate::crypto::{self, SecretKey};
use crate::fingerprint::DeviceFingerprint;
use crate::kdf;

/// The only record version this build reads and writes.
pub const CURRENT_VERSION: &str = "1.0";

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// A remembered secret key as stored in the key-value store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistentKeyRecord {
    /// The user secret key (base64url) sealed under the fingerprint key.
    pub encrypted_key: String,
    pub fingerprint: String,
    /// Epoch milliseconds. The record is expired once `now > expires_at`.
    pub expires_at: i64,
    pub version: String,
}

/// States in the session FSM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No key in memory.
    Locked,
    /// Key in memory.
    Unlocked,
    /// Key in memory and persisted for this device.
    Remembered,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Locked => write!(f, "locked"),
            SessionState::Unlocked => write!(f, "unlocked"),
            SessionState::Remembered => write!(f, "remembered"),
        }
    }
}

#[derive(Default)]
struct Held {
    key: Option<SecretKey>,
    remembered: bool,
}

/// Owns the in-memory user secret key and its persisted form.
pub struct SessionKeyManager {
    store: Arc<dyn KeyValueStore>,
    fingerprint: DeviceFingerprint,
    clock: Arc<dyn Clock>,
    config: SessionConfig,
    kdf_iterations: u32,
    held: Mutex<Held>,
}

impl std::fmt::Debug for SessionKeyManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKeyManager")
            .field("record_key", &self.config.record_key)
            .field("kdf_iterations", &self.kdf_iterations)
            .field("key", &"[REDACTED]")
            .finish()
    }
}

impl SessionKeyManager {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        fingerprint: DeviceFingerprint,
        clock: Arc<dyn Clock>,
        config: SessionConfig,
    ) -> Self {
        Self {
            store,
            fingerprint,
            clock,
            config,
            kdf_iterations: kdf::KDF_ITERATIONS,
            held: Mutex::new(Held::default()),
        }
    }

    /// Derive user keys with `iterations` instead of [`kdf::KDF_ITERATIONS`].
    ///
    /// Keys derived this way do not open vaults written by other clients.
    /// Test harnesses use it to keep unlocks fast.
    pub fn with_kdf_iterations(mut self, iterations: u32) -> Self {
        self.kdf_iterations = iterations;
        self
    }

    /// Derive the user secret key from the master password and hold it.
    ///
    /// Key derivation runs on the blocking pool.
    pub async fn unlock(&self, password: &SecretString, salt: &str) -> Result<(), VaultError> {
        let password = Zeroizing::new(password.expose_secret().to_string());
        let salt = salt.to_string();
        let iterations = self.kdf_iterations;
        let key = tokio::task::spawn_blocking(move || {
            kdf::derive_key_with_iterations(&password, &salt, iterations)
        })
        .await
        .map_err(|e| VaultError::Internal(format!("key derivation task failed: {e}")))??;

        let mut held = self.held.lock().await;
        held.key = Some(key);
        held.remembered = false;
        info!(state = %SessionState::Unlocked, "session unlocked");
        Ok(())
    }

    /// Persist the held key for this device until `expires_at` (epoch ms).
    pub async fn remember(&self, expires_at: i64) -> Result<(), VaultError> {
        let mut held = self.held.lock().await;
        let key = held.key.clone().ok_or(VaultError::Locked)?;

        let fingerprint_key = self.fingerprint_key().await?;
        let encrypted_key = crypto::encrypt(&fingerprint_key, key.to_b64url().as_bytes())?;
        let record = PersistentKeyRecord {
            encrypted_key,
            fingerprint: self.fingerprint.generate()?,
            expires_at,
            version: CURRENT_VERSION.to_string(),
        };
        self.store
            .set(&self.config.record_key, &serde_json::to_string(&record)?)
            .await?;

        held.remembered = true;
        info!(expires_at, state = %SessionState::Remembered, "session remembered");
        Ok(())
    }

    /// Remember the held key for `days`, or the configured default, from now.
    /// Returns the expiry that was written.
    pub async fn remember_for(&self, days: Option<u32>) -> Result<i64, VaultError> {
        let days = days.unwrap_or(self.config.remember_days);
        let expires_at = self.clock.now_millis() + i64::from(days) * MILLIS_PER_DAY;
        self.remember(expires_at).await?;
        Ok(expires_at)
    }

    /// Recover the secret key from the persistent record.
    ///
    /// Checks run in a fixed order so the reported reason is stable when
    /// several would apply: missing, version, expiry, fingerprint, decryption.
    /// Unsupported, unparseable and expired records are deleted; a record from
    /// another device is left in place.
    ///
    /// Restoring only applies from Locked. When a key is already held it is
    /// returned as is and the store is not read.
    pub async fn restore(&self) -> Result<SecretKey, VaultError> {
        let mut held = self.held.lock().await;
        if let Some(key) = &held.key {
            debug!("restore requested while unlocked, keeping held key");
            return Ok(key.clone());
        }

        let Some(raw) = self.store.get(&self.config.record_key).await? else {
            return Err(self.fail(SessionFailure::NotFound));
        };

        let record = match serde_json::from_str::<PersistentKeyRecord>(&raw) {
            Ok(record) if record.version == CURRENT_VERSION => record,
            Ok(record) => {
                warn!(version = %record.version, "unsupported session record version");
                self.purge().await?;
                return Err(self.fail(SessionFailure::Corrupted));
            }
            Err(e) => {
                warn!(error = %e, "unparseable session record");
                self.purge().await?;
                return Err(self.fail(SessionFailure::Corrupted));
            }
        };

        if self.clock.now_millis() > record.expires_at {
            self.purge().await?;
            return Err(self.fail(SessionFailure::Expired));
        }

        if !self.fingerprint.validate(&record.fingerprint)? {
            return Err(self.fail(SessionFailure::FingerprintMismatch));
        }

        let key = match self.open_record(&record).await {
            Ok(key) => key,
            Err(e) => {
                debug!(error = %e, "remembered key did not open");
                return Err(self.fail(SessionFailure::DecryptionFailed));
            }
        };

        held.key = Some(key.clone());
        held.remembered = true;
        info!(state = %SessionState::Remembered, "session restored");
        Ok(key)
    }

    /// Discard the held key, delete the persistent record and clear `cache`.
    pub async fn lock(&self, cache: &VaultCache) -> Result<(), VaultError> {
        let mut held = self.held.lock().await;
        *held = Held::default();
        cache.clear().await;
        self.purge().await?;
        info!(state = %SessionState::Locked, "session locked");
        Ok(())
    }

    /// Delete the persistent record but keep the key in memory.
    pub async fn forget(&self) -> Result<(), VaultError> {
        let mut held = self.held.lock().await;
        self.purge().await?;
        held.remembered = false;
        info!("remembered session forgotten");
        Ok(())
    }

    pub async fn state(&self) -> SessionState {
        let held = self.held.lock().await;
        match (&held.key, held.remembered) {
            (None, _) => SessionState::Locked,
            (Some(_), false) => SessionState::Unlocked,
            (Some(_), true) => SessionState::Remembered,
        }
    }

    pub async fn is_unlocked(&self) -> bool {
        self.held.lock().await.key.is_some()
    }

    /// The held user secret key, or [`VaultError::Locked`].
    pub async fn secret_key(&self) -> Result<SecretKey, VaultError> {
        self.held.lock().await.key.clone().ok_or(VaultError::Locked)
    }

    /// Whether a persistent record exists, without validating it.
    pub async fn has_persistent_record(&self) -> Result<bool, VaultError> {
        Ok(self.store.get(&self.config.record_key).await?.is_some())
    }

    async fn open_record(&self, record: &PersistentKeyRecord) -> Result<SecretKey, VaultError> {
        let fingerprint_key = self.fingerprint_key().await?;
        let plaintext = crypto::decrypt_to_string(&fingerprint_key, &record.encrypted_key)?;
        if plaintext.is_empty() {
            return Err(VaultError::DecryptionFailure);
        }
        SecretKey::from_b64url(&plaintext)
    }

    async fn fingerprint_key(&self) -> Result<SecretKey, VaultError> {
        let fingerprint = self.fingerprint.clone();
        tokio::task::spawn_blocking(move || fingerprint.derive_fingerprint_key())
            .await
            .map_err(|e| VaultError::Internal(format!("key derivation task failed: {e}")))?
    }

    async fn purge(&self) -> Result<(), VaultError> {
        self.store.remove(&self.config.record_key).await?;
        debug!(key = %self.config.record_key, "session record purged");
        Ok(())
    }

    fn fail(&self, reason: SessionFailure) -> VaultError {
        info!(reason = %reason, "session restore failed");
        VaultError::Session(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_uses_camel_case_fields() {
        let record = PersistentKeyRecord {
            encrypted_key: "abc".into(),
            fingerprint: "{}".into(),
            expires_at: 1_700_000_000_000,
            version: CURRENT_VERSION.into(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["encryptedKey"], "abc");
        assert_eq!(json["expiresAt"], 1_700_000_000_000i64);
        assert_eq!(json["version"], "1.0");
    }

    #[test]
    fn state_display() {
        assert_eq!(SessionState::Locked.to_string(), "locked");
        assert_eq!(SessionState::Unlocked.to_string(), "unlocked");
        assert_eq!(SessionState::Remembered.to_string(), "remembered");
    }
}
