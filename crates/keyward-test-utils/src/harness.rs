// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end vault tests.
//!
//! `TestHarness` wires a `VaultCache` and a `SessionKeyManager` to in-memory
//! adapters, a fixed device and a manual clock, with a reduced KDF iteration
//! count so tests stay fast.

use std::sync::Arc;

use keyward_config::KeywardConfig;
use keyward_core::VaultError;
use keyward_vault::{DeviceFingerprint, SecretKey, SessionKeyManager, VaultCache};
use secrecy::SecretString;

use crate::clock::ManualClock;
use crate::device::FixedDeviceInfo;
use crate::memory_gateway::MemoryGateway;
use crate::memory_store::MemoryKeyStore;

/// Iteration count used for every derivation in harness-built components.
pub const TEST_KDF_ITERATIONS: u32 = 1_000;

pub const TEST_PASSWORD: &str = "Tr0ub4dor&3";

pub const TEST_SALT: &str = "c2FsdA";

/// 2026-01-01T00:00:00Z.
const DEFAULT_START_MILLIS: i64 = 1_767_225_600_000;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    config: KeywardConfig,
    start_millis: i64,
    device: Option<FixedDeviceInfo>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            config: KeywardConfig::default(),
            start_millis: DEFAULT_START_MILLIS,
            device: None,
        }
    }

    /// Replace the whole configuration.
    pub fn with_config(mut self, config: KeywardConfig) -> Self {
        self.config = config;
        self
    }

    /// Start the manual clock at `millis` since the epoch.
    pub fn with_clock_at(mut self, millis: i64) -> Self {
        self.start_millis = millis;
        self
    }

    pub fn with_device(mut self, device: FixedDeviceInfo) -> Self {
        self.device = Some(device);
        self
    }

    pub fn build(self) -> TestHarness {
        let gateway = Arc::new(MemoryGateway::new());
        let store = Arc::new(MemoryKeyStore::new());
        let clock = Arc::new(ManualClock::at(self.start_millis));
        let device = Arc::new(self.device.unwrap_or_default());

        let fingerprint =
            DeviceFingerprint::new(device.clone()).with_kdf_iterations(TEST_KDF_ITERATIONS);
        let cache = Arc::new(VaultCache::new(
            gateway.clone(),
            self.config.vault.collection_path.clone(),
        ));
        let session = Arc::new(
            SessionKeyManager::new(
                store.clone(),
                fingerprint.clone(),
                clock.clone(),
                self.config.session.clone(),
            )
            .with_kdf_iterations(TEST_KDF_ITERATIONS),
        );

        TestHarness {
            gateway,
            store,
            clock,
            device,
            fingerprint,
            cache,
            session,
            config: self.config,
        }
    }
}

/// A complete vault environment over in-memory adapters.
pub struct TestHarness {
    /// The in-memory document store behind the cache.
    pub gateway: Arc<MemoryGateway>,
    /// The in-memory key store behind the session manager.
    pub store: Arc<MemoryKeyStore>,
    pub clock: Arc<ManualClock>,
    /// Device source for the fingerprint; swap attributes to simulate a move.
    pub device: Arc<FixedDeviceInfo>,
    pub fingerprint: DeviceFingerprint,
    pub cache: Arc<VaultCache>,
    pub session: Arc<SessionKeyManager>,
    pub config: KeywardConfig,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Unlock with [`TEST_PASSWORD`] and [`TEST_SALT`] and return the key.
    pub async fn unlock(&self) -> Result<SecretKey, VaultError> {
        self.session
            .unlock(&SecretString::from(TEST_PASSWORD.to_string()), TEST_SALT)
            .await?;
        self.session.secret_key().await
    }
}
