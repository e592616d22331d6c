// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `keyward session` command implementation.
//!
//! Inspects or deletes the remembered-session record in the local key store
//! without unlocking anything.

use keyward_core::{KeyValueStore, SessionFailure, VaultError};
use keyward_vault::{CURRENT_VERSION, DeviceFingerprint, PersistentKeyRecord};
use serde::Serialize;

/// What the key store says about a remembered session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RecordStatus {
    /// No record is stored.
    Absent,
    /// A record exists but could not be restored as-is.
    Unusable { reason: String },
    /// A record exists, is current, unexpired and bound to this device.
    Restorable { expires_at: String },
}

/// Classify the stored record without decrypting it.
pub async fn record_status(
    store: &dyn KeyValueStore,
    record_key: &str,
    fingerprint: &DeviceFingerprint,
    now_millis: i64,
) -> Result<RecordStatus, VaultError> {
    let Some(raw) = store.get(record_key).await? else {
        return Ok(RecordStatus::Absent);
    };
    let unusable = |reason: SessionFailure| RecordStatus::Unusable {
        reason: reason.to_string(),
    };

    let Ok(record) = serde_json::from_str::<PersistentKeyRecord>(&raw) else {
        return Ok(unusable(SessionFailure::Corrupted));
    };
    if record.version != CURRENT_VERSION {
        return Ok(unusable(SessionFailure::Corrupted));
    }
    if now_millis > record.expires_at {
        return Ok(unusable(SessionFailure::Expired));
    }
    if !fingerprint.validate(&record.fingerprint)? {
        return Ok(unusable(SessionFailure::FingerprintMismatch));
    }

    let expires_at = chrono::DateTime::from_timestamp_millis(record.expires_at)
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| record.expires_at.to_string());
    Ok(RecordStatus::Restorable { expires_at })
}

impl std::fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordStatus::Absent => write!(f, "no remembered session"),
            RecordStatus::Unusable { reason } => {
                write!(f, "remembered session present but not restorable ({reason})")
            }
            RecordStatus::Restorable { expires_at } => {
                write!(f, "remembered session restorable until {expires_at}")
            }
        }
    }
}

/// Delete the remembered-session record. Returns whether one existed.
pub async fn forget(store: &dyn KeyValueStore, record_key: &str) -> Result<bool, VaultError> {
    let existed = store.get(record_key).await?.is_some();
    store.remove(record_key).await?;
    Ok(existed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyward_test_utils::{FixedDeviceInfo, TestHarness};

    const KEY: &str = "keyward.session.persistent_key";

    #[tokio::test]
    async fn status_follows_record_lifecycle() {
        let harness = TestHarness::builder().build();
        let now = 1_767_225_600_000;
        let status = record_status(&*harness.store, KEY, &harness.fingerprint, now)
            .await
            .unwrap();
        assert_eq!(status, RecordStatus::Absent);

        harness.unlock().await.unwrap();
        harness.session.remember(now + 1_000).await.unwrap();
        let status = record_status(&*harness.store, KEY, &harness.fingerprint, now)
            .await
            .unwrap();
        assert!(matches!(status, RecordStatus::Restorable { .. }));

        let status = record_status(&*harness.store, KEY, &harness.fingerprint, now + 1_001)
            .await
            .unwrap();
        assert_eq!(
            status,
            RecordStatus::Unusable {
                reason: "expired".into()
            }
        );

        harness.device.replace(FixedDeviceInfo::other_device());
        let status = record_status(&*harness.store, KEY, &harness.fingerprint, now)
            .await
            .unwrap();
        assert_eq!(status.to_string(), "remembered session present but not restorable (fingerprint_mismatch)");
    }

    #[tokio::test]
    async fn status_reports_garbage_as_corrupted() {
        let harness = TestHarness::builder().build();
        harness.store.set(KEY, "garbage").await.unwrap();
        let status = record_status(&*harness.store, KEY, &harness.fingerprint, 0)
            .await
            .unwrap();
        assert_eq!(
            status,
            RecordStatus::Unusable {
                reason: "corrupted".into()
            }
        );
    }

    #[tokio::test]
    async fn forget_reports_whether_anything_was_removed() {
        let harness = TestHarness::builder().build();
        harness.store.set(KEY, "{}").await.unwrap();
        assert!(forget(&*harness.store, KEY).await.unwrap());
        assert!(!forget(&*harness.store, KEY).await.unwrap());
    }
}
