// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Key material commands: `derive-key`, `generate-key`, `generate-salt` and
//! `fingerprint`.

use std::sync::Arc;

use keyward_core::VaultError;
use keyward_vault::{DeviceFingerprint, HostDeviceInfo, crypto, kdf};
use secrecy::{ExposeSecret, SecretString};

/// Derive the user secret key exactly as an unlock would.
pub fn derive_key(password: &SecretString, salt: &str) -> Result<String, VaultError> {
    Ok(kdf::derive_key(password.expose_secret(), salt)?.to_b64url())
}

pub fn generate_key() -> Result<String, VaultError> {
    Ok(crypto::generate_key()?.to_b64url())
}

pub fn generate_salt() -> Result<String, VaultError> {
    crypto::generate_salt()
}

/// Fingerprint of this host, as a remembered session would be bound to it.
pub fn host_fingerprint(installation_id: Option<String>) -> DeviceFingerprint {
    let mut source = HostDeviceInfo::new();
    if let Some(id) = installation_id {
        source = source.with_installation_id(id);
    }
    DeviceFingerprint::new(Arc::new(source))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_key_matches_library_derivation() {
        let password = SecretString::from("Tr0ub4dor&3".to_string());
        let derived = derive_key(&password, "c2FsdA").unwrap();
        assert_eq!(derived.len(), 43);
        assert_eq!(derived, derive_key(&password, "c2FsdA").unwrap());
    }

    #[test]
    fn derive_key_matches_an_unlock_with_default_settings() {
        let password = SecretString::from("Tr0ub4dor&3".to_string());
        let expected = kdf::derive_key_with_iterations("Tr0ub4dor&3", "c2FsdA", kdf::KDF_ITERATIONS)
            .unwrap()
            .to_b64url();
        assert_eq!(derive_key(&password, "c2FsdA").unwrap(), expected);
    }

    #[test]
    fn generated_material_has_expected_lengths() {
        assert_eq!(generate_key().unwrap().len(), 43);
        assert_eq!(generate_salt().unwrap().len(), 22);
    }

    #[test]
    fn host_fingerprint_is_stable() {
        let fingerprint = host_fingerprint(Some("cli-test".to_string()));
        let first = fingerprint.generate().unwrap();
        assert!(first.contains("cli-test"));
        assert!(fingerprint.validate(&first).unwrap());
    }
}
