// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for remembered sessions.
//!
//! Restore failure reasons are a contract with the UI layer, so every reason
//! and the order in which they are checked is pinned here.

use std::sync::Arc;
use std::time::Duration;

use keyward_core::{Clock, KeyValueStore, SessionFailure, SystemClock, VaultError};
use keyward_test_utils::{
    FixedDeviceInfo, TEST_KDF_ITERATIONS, TEST_PASSWORD, TEST_SALT, TestHarness,
};
use keyward_vault::{
    CURRENT_VERSION, Item, PersistentKeyRecord, SessionKeyManager, SessionState, crypto, kdf,
};
use secrecy::SecretString;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// A manager sharing the harness's store, device and clock, as after a restart.
fn restarted(harness: &TestHarness) -> SessionKeyManager {
    SessionKeyManager::new(
        harness.store.clone(),
        harness.fingerprint.clone(),
        harness.clock.clone(),
        harness.config.session.clone(),
    )
    .with_kdf_iterations(TEST_KDF_ITERATIONS)
}

async fn stored_record(harness: &TestHarness) -> Option<PersistentKeyRecord> {
    let raw = harness
        .store
        .get(&harness.config.session.record_key)
        .await
        .unwrap()?;
    Some(serde_json::from_str(&raw).unwrap())
}

async fn write_record(harness: &TestHarness, record: &PersistentKeyRecord) {
    harness
        .store
        .set(
            &harness.config.session.record_key,
            &serde_json::to_string(record).unwrap(),
        )
        .await
        .unwrap();
}

fn reason(err: VaultError) -> SessionFailure {
    err.session_failure()
        .unwrap_or_else(|| panic!("expected session failure, got {err}"))
}

// ---- state machine ----

#[tokio::test]
async fn test_unlock_remember_lock_transitions() {
    let harness = TestHarness::builder().build();
    assert_eq!(harness.session.state().await, SessionState::Locked);
    assert!(matches!(
        harness.session.secret_key().await,
        Err(VaultError::Locked)
    ));

    harness.unlock().await.unwrap();
    assert_eq!(harness.session.state().await, SessionState::Unlocked);
    assert!(harness.session.is_unlocked().await);

    let now = harness.clock.now_millis();
    harness.session.remember(now + DAY_MS).await.unwrap();
    assert_eq!(harness.session.state().await, SessionState::Remembered);
    assert!(harness.session.has_persistent_record().await.unwrap());

    let key = harness.session.secret_key().await.unwrap();
    harness.cache.add(&key, Item::new_secure_note("n", "b").unwrap()).await.unwrap();

    harness.session.lock(&harness.cache).await.unwrap();
    assert_eq!(harness.session.state().await, SessionState::Locked);
    assert!(!harness.session.has_persistent_record().await.unwrap());
    assert!(harness.cache.is_empty().await);
}

#[tokio::test]
async fn test_remember_requires_unlocked_session() {
    let harness = TestHarness::builder().build();
    let err = harness.session.remember(i64::MAX).await.unwrap_err();
    assert!(matches!(err, VaultError::Locked));
    assert!(stored_record(&harness).await.is_none());
}

#[tokio::test]
async fn test_remember_for_uses_configured_days() {
    let harness = TestHarness::builder().build();
    harness.unlock().await.unwrap();
    let now = harness.clock.now_millis();

    let expires_at = harness.session.remember_for(None).await.unwrap();
    assert_eq!(expires_at, now + 30 * DAY_MS);

    let expires_at = harness.session.remember_for(Some(1)).await.unwrap();
    assert_eq!(expires_at, now + DAY_MS);

    let record = stored_record(&harness).await.unwrap();
    assert_eq!(record.expires_at, now + DAY_MS);
    assert_eq!(record.version, CURRENT_VERSION);
    assert_eq!(record.fingerprint, harness.fingerprint.generate().unwrap());
}

#[tokio::test]
async fn test_forget_keeps_key_in_memory() {
    let harness = TestHarness::builder().build();
    harness.unlock().await.unwrap();
    harness.session.remember_for(None).await.unwrap();

    harness.session.forget().await.unwrap();
    assert_eq!(harness.session.state().await, SessionState::Unlocked);
    assert!(stored_record(&harness).await.is_none());
}

// ---- restore ----

#[tokio::test]
async fn test_restore_recovers_the_same_key() {
    let harness = TestHarness::builder().build();
    let key = harness.unlock().await.unwrap();
    harness.session.remember_for(None).await.unwrap();

    let session = restarted(&harness);
    assert_eq!(session.state().await, SessionState::Locked);
    let restored = session.restore().await.unwrap();
    assert_eq!(restored, key);
    assert_eq!(session.state().await, SessionState::Remembered);
    assert_eq!(session.secret_key().await.unwrap(), key);
}

#[tokio::test]
async fn test_restore_while_unlocked_keeps_the_held_key() {
    let harness = TestHarness::builder().build();
    let key = harness.unlock().await.unwrap();
    let other = TestHarness::builder().build();
    other
        .session
        .unlock(&SecretString::from("another password".to_string()), TEST_SALT)
        .await
        .unwrap();
    other.session.remember_for(None).await.unwrap();
    let foreign = other
        .store
        .get(&other.config.session.record_key)
        .await
        .unwrap()
        .unwrap();
    harness
        .store
        .set(&harness.config.session.record_key, &foreign)
        .await
        .unwrap();

    let restored = harness.session.restore().await.unwrap();
    assert_eq!(restored, key);
    assert_eq!(harness.session.state().await, SessionState::Unlocked);
}

#[tokio::test]
async fn test_restore_without_record_is_not_found() {
    let harness = TestHarness::builder().build();
    let err = harness.session.restore().await.unwrap_err();
    assert_eq!(reason(err), SessionFailure::NotFound);
    assert_eq!(harness.session.state().await, SessionState::Locked);
}

#[tokio::test]
async fn test_restore_expired_record_is_purged() {
    let harness = TestHarness::builder().build();
    harness.unlock().await.unwrap();
    let now = harness.clock.now_millis();
    harness.session.remember(now - 1).await.unwrap();

    let err = restarted(&harness).restore().await.unwrap_err();
    assert_eq!(reason(err), SessionFailure::Expired);
    assert!(stored_record(&harness).await.is_none());
}

#[tokio::test]
async fn test_restore_at_exact_deadline_succeeds() {
    let harness = TestHarness::builder().build();
    harness.unlock().await.unwrap();
    let now = harness.clock.now_millis();
    harness.session.remember(now).await.unwrap();

    assert!(restarted(&harness).restore().await.is_ok());

    harness.clock.advance(Duration::from_millis(1));
    let err = restarted(&harness).restore().await.unwrap_err();
    assert_eq!(reason(err), SessionFailure::Expired);
}

#[tokio::test]
async fn test_restore_on_other_device_keeps_record() {
    let harness = TestHarness::builder().build();
    harness.unlock().await.unwrap();
    harness.session.remember_for(None).await.unwrap();

    harness.device.replace(FixedDeviceInfo::other_device());
    let err = restarted(&harness).restore().await.unwrap_err();
    assert_eq!(reason(err), SessionFailure::FingerprintMismatch);
    assert!(stored_record(&harness).await.is_some());
}

#[tokio::test]
async fn test_restore_undecryptable_key_is_decryption_failed() {
    let harness = TestHarness::builder().build();
    harness.unlock().await.unwrap();
    harness.session.remember_for(None).await.unwrap();

    let mut record = stored_record(&harness).await.unwrap();
    let stranger = crypto::generate_key().unwrap();
    record.encrypted_key = crypto::encrypt(&stranger, b"not the key").unwrap();
    write_record(&harness, &record).await;

    let err = restarted(&harness).restore().await.unwrap_err();
    assert_eq!(reason(err), SessionFailure::DecryptionFailed);
}

#[tokio::test]
async fn test_restore_wrapped_garbage_is_decryption_failed() {
    let harness = TestHarness::builder().build();
    harness.unlock().await.unwrap();
    harness.session.remember_for(None).await.unwrap();

    // Opens with the device key but is not a valid secret key.
    let mut record = stored_record(&harness).await.unwrap();
    let device_key = harness.fingerprint.derive_fingerprint_key().unwrap();
    record.encrypted_key = crypto::encrypt(&device_key, b"").unwrap();
    write_record(&harness, &record).await;

    let err = restarted(&harness).restore().await.unwrap_err();
    assert_eq!(reason(err), SessionFailure::DecryptionFailed);
}

#[tokio::test]
async fn test_restore_checks_version_before_expiry_and_fingerprint() {
    let harness = TestHarness::builder().build();
    harness.unlock().await.unwrap();
    let now = harness.clock.now_millis();
    harness.session.remember(now - 1).await.unwrap();

    let mut record = stored_record(&harness).await.unwrap();
    record.version = "2.0".to_string();
    write_record(&harness, &record).await;
    harness.device.replace(FixedDeviceInfo::other_device());

    let err = restarted(&harness).restore().await.unwrap_err();
    assert_eq!(reason(err), SessionFailure::Corrupted);
    assert!(stored_record(&harness).await.is_none());
}

#[tokio::test]
async fn test_restore_unsupported_version_alone_is_corrupted() {
    let harness = TestHarness::builder().build();
    harness.unlock().await.unwrap();
    harness.session.remember_for(None).await.unwrap();

    let mut record = stored_record(&harness).await.unwrap();
    record.version = "2.0".to_string();
    write_record(&harness, &record).await;

    let err = restarted(&harness).restore().await.unwrap_err();
    assert_eq!(reason(err), SessionFailure::Corrupted);
}

#[tokio::test]
async fn test_restore_unparseable_record_is_corrupted() {
    let harness = TestHarness::builder().build();
    harness
        .store
        .set(&harness.config.session.record_key, "{\"encryptedKey\":")
        .await
        .unwrap();

    let err = harness.session.restore().await.unwrap_err();
    assert_eq!(reason(err), SessionFailure::Corrupted);
    assert!(!harness.store.contains(&harness.config.session.record_key).await);
}

#[tokio::test]
async fn test_expiry_checked_before_fingerprint() {
    let harness = TestHarness::builder().build();
    harness.unlock().await.unwrap();
    let now = harness.clock.now_millis();
    harness.session.remember(now + 10).await.unwrap();

    harness.clock.advance(Duration::from_millis(11));
    harness.device.replace(FixedDeviceInfo::other_device());
    let err = restarted(&harness).restore().await.unwrap_err();
    assert_eq!(reason(err), SessionFailure::Expired);
}

// ---- end to end with production parameters ----

#[test]
fn test_default_derivation_is_deterministic() {
    let first = kdf::derive_key(TEST_PASSWORD, TEST_SALT).unwrap();
    let second = kdf::derive_key(TEST_PASSWORD, TEST_SALT).unwrap();
    assert_eq!(first, second);
    assert_ne!(first, kdf::derive_key(TEST_PASSWORD, "c2FsdB").unwrap());
}

#[tokio::test]
async fn test_remembered_key_expires_on_the_wall_clock() {
    let harness = TestHarness::builder().build();
    let wall_clock = || {
        SessionKeyManager::new(
            harness.store.clone(),
            harness.fingerprint.clone(),
            Arc::new(SystemClock),
            harness.config.session.clone(),
        )
        .with_kdf_iterations(TEST_KDF_ITERATIONS)
    };
    let session = wall_clock();
    session
        .unlock(&SecretString::from(TEST_PASSWORD.to_string()), TEST_SALT)
        .await
        .unwrap();

    let now = chrono::Utc::now().timestamp_millis();
    session.remember(now + 1_000).await.unwrap();
    tokio::time::sleep(Duration::from_millis(1_100)).await;

    let after_restart = wall_clock();
    let err = after_restart.restore().await.unwrap_err();
    assert_eq!(reason(err), SessionFailure::Expired);
    assert!(!after_restart.has_persistent_record().await.unwrap());
}

#[tokio::test]
async fn test_unlock_uses_the_vault_iteration_count() {
    let harness = TestHarness::builder().build();
    let session = SessionKeyManager::new(
        harness.store.clone(),
        harness.fingerprint.clone(),
        harness.clock.clone(),
        harness.config.session.clone(),
    );
    session
        .unlock(&SecretString::from(TEST_PASSWORD.to_string()), TEST_SALT)
        .await
        .unwrap();

    let expected = kdf::derive_key(TEST_PASSWORD, TEST_SALT).unwrap();
    assert_eq!(session.secret_key().await.unwrap(), expected);
    assert_eq!(kdf::KDF_ITERATIONS, 300_000);
}
