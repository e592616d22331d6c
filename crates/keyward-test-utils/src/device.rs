// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Swappable device attribute source.

use std::sync::{PoisonError, RwLock};

use keyward_vault::{DeviceAttributes, DeviceInfoSource};

/// Reports a fixed set of attributes; [`FixedDeviceInfo::replace`] simulates
/// moving a persisted record to another device.
#[derive(Debug)]
pub struct FixedDeviceInfo {
    attributes: RwLock<DeviceAttributes>,
}

impl FixedDeviceInfo {
    pub fn new(attributes: DeviceAttributes) -> Self {
        Self {
            attributes: RwLock::new(attributes),
        }
    }

    /// A desktop browser with every optional attribute populated.
    pub fn laptop() -> Self {
        Self::new(DeviceAttributes {
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) Keyward/Test".to_string(),
            platform: "Linux x86_64".to_string(),
            language: "en-US".to_string(),
            languages: vec!["en-US".to_string(), "en".to_string()],
            screen_width: Some(1920),
            screen_height: Some(1080),
            color_depth: Some(24),
            pixel_depth: Some(24),
            timezone: Some("Europe/Berlin".to_string()),
            hardware_concurrency: Some(8),
            device_memory: Some(16),
            connection_type: Some("4g".to_string()),
            installation_id: Some("test-installation".to_string()),
        })
    }

    /// A different device: same browser, another user agent and timezone.
    pub fn other_device() -> DeviceAttributes {
        DeviceAttributes {
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_0) Keyward/Test".to_string(),
            platform: "MacIntel".to_string(),
            timezone: Some("America/New_York".to_string()),
            ..Self::laptop().attributes()
        }
    }

    pub fn replace(&self, attributes: DeviceAttributes) {
        *self.attributes.write().unwrap_or_else(PoisonError::into_inner) = attributes;
    }
}

impl Default for FixedDeviceInfo {
    fn default() -> Self {
        Self::laptop()
    }
}

impl DeviceInfoSource for FixedDeviceInfo {
    fn attributes(&self) -> DeviceAttributes {
        self.attributes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
