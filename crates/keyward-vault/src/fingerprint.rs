// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Device fingerprinting and fingerprint-bound key derivation.
//!
//! The fingerprint binds a remembered session key to one device so a copied
//! key-store blob does not restore elsewhere. The wrapping key is derived
//! from a fixed, public constant salted with the fingerprint; anyone holding
//! this code and the device attributes can recompute it. It is not a
//! security boundary.

use std::collections::BTreeMap;
use std::sync::Arc;

use keyward_core::VaultError;
use serde::Serialize;

use crate::crypto::SecretKey;
use crate::kdf;

/// Fixed "password" fed to PBKDF2 with the fingerprint as salt.
pub const FINGERPRINT_MASTER_KEY: &str = "keyward-device-binding-master-key-v1";

/// Stable attributes describing the current device.
///
/// `None` fields are omitted from the fingerprint rather than serialized as
/// `null`, so adding a source for a new attribute changes the fingerprint only
/// on devices that report it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceAttributes {
    pub user_agent: String,
    pub platform: String,
    pub language: String,
    pub languages: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screen_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screen_height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_depth: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pixel_depth: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hardware_concurrency: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_memory: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installation_id: Option<String>,
}

/// Platform adapter that reports the device's attributes.
pub trait DeviceInfoSource: Send + Sync + 'static {
    fn attributes(&self) -> DeviceAttributes;
}

/// Attributes of the desktop host this process runs on.
///
/// Screen and network attributes are not observable here and are left out.
#[derive(Debug, Clone, Default)]
pub struct HostDeviceInfo {
    installation_id: Option<String>,
}

impl HostDeviceInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Include an embedder-provided installation identifier.
    pub fn with_installation_id(mut self, id: impl Into<String>) -> Self {
        self.installation_id = Some(id.into());
        self
    }
}

impl DeviceInfoSource for HostDeviceInfo {
    fn attributes(&self) -> DeviceAttributes {
        use sysinfo::{MemoryRefreshKind, RefreshKind, System};

        let os_name = System::name().unwrap_or_else(|| std::env::consts::OS.to_string());
        let os_version = System::os_version().unwrap_or_default();
        let arch = std::env::consts::ARCH;

        let language = std::env::var("LANG")
            .ok()
            .and_then(|lang| lang.split('.').next().map(|l| l.replace('_', "-")))
            .filter(|lang| !lang.is_empty())
            .unwrap_or_else(|| "en-US".to_string());
        let mut languages: Vec<String> = std::env::var("LANGUAGE")
            .ok()
            .map(|list| {
                list.split(':')
                    .filter(|l| !l.is_empty())
                    .map(|l| l.replace('_', "-"))
                    .collect()
            })
            .unwrap_or_default();
        if languages.is_empty() {
            languages.push(language.clone());
        }

        let system = System::new_with_specifics(
            RefreshKind::nothing().with_memory(MemoryRefreshKind::nothing().with_ram()),
        );
        let total_gib = system.total_memory() / (1024 * 1024 * 1024);

        DeviceAttributes {
            user_agent: format!("keyward ({os_name} {os_version}; {arch})"),
            platform: format!("{}-{arch}", std::env::consts::OS),
            language,
            languages,
            timezone: std::env::var("TZ").ok().filter(|tz| !tz.is_empty()),
            hardware_concurrency: std::thread::available_parallelism()
                .ok()
                .map(|n| u32::try_from(n.get()).unwrap_or(u32::MAX)),
            device_memory: (total_gib > 0).then_some(total_gib),
            installation_id: self.installation_id.clone(),
            ..DeviceAttributes::default()
        }
    }
}

/// Computes and checks the device fingerprint.
#[derive(Clone)]
pub struct DeviceFingerprint {
    source: Arc<dyn DeviceInfoSource>,
    kdf_iterations: u32,
}

impl std::fmt::Debug for DeviceFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceFingerprint")
            .field("kdf_iterations", &self.kdf_iterations)
            .finish_non_exhaustive()
    }
}

impl DeviceFingerprint {
    pub fn new(source: Arc<dyn DeviceInfoSource>) -> Self {
        Self {
            source,
            kdf_iterations: kdf::KDF_ITERATIONS,
        }
    }

    /// Derive the wrapping key with `iterations` instead of
    /// [`kdf::KDF_ITERATIONS`]. Used by test harnesses.
    pub fn with_kdf_iterations(mut self, iterations: u32) -> Self {
        self.kdf_iterations = iterations;
        self
    }

    /// Serialize the device attributes as JSON with keys in sorted order.
    pub fn generate(&self) -> Result<String, VaultError> {
        let value = serde_json::to_value(self.source.attributes())?;
        // Re-collect into a BTreeMap so ordering does not depend on
        // serde_json's map implementation.
        let sorted: BTreeMap<String, serde_json::Value> = match value {
            serde_json::Value::Object(map) => map.into_iter().collect(),
            other => {
                return Err(VaultError::Internal(format!(
                    "device attributes serialized to a non-object: {other}"
                )));
            }
        };
        Ok(serde_json::to_string(&sorted)?)
    }

    /// Derive the key that wraps a remembered session key on this device.
    pub fn derive_fingerprint_key(&self) -> Result<SecretKey, VaultError> {
        kdf::derive_key_with_iterations(
            FINGERPRINT_MASTER_KEY,
            &self.generate()?,
            self.kdf_iterations,
        )
    }

    /// Whether `stored` equals the fingerprint computed now.
    pub fn validate(&self, stored: &str) -> Result<bool, VaultError> {
        Ok(self.generate()? == stored)
    }
}
