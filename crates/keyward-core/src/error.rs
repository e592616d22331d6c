// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Keyward vault engine.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

/// Why a remembered session could not be restored.
///
/// The string forms are the wire reasons surfaced to the UI layer, which
/// uses them to pick a recovery flow.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SessionFailure {
    /// No persistent key record exists.
    NotFound,
    /// The record's deadline has passed. The record has been purged.
    Expired,
    /// The record was written on a different device. The record is kept.
    FingerprintMismatch,
    /// The wrapped key could not be opened with the device key.
    DecryptionFailed,
    /// The record has an unsupported version or cannot be parsed.
    Corrupted,
}

/// The primary error type used across all Keyward crates.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Bad key material or input to a cryptographic primitive.
    #[error("crypto error: {0}")]
    Crypto(String),

    /// AEAD open failed. The cause (wrong key, tampering, truncation) is
    /// deliberately not reported.
    #[error("decryption failed")]
    DecryptionFailure,

    /// JSON encoding or decoding of an item or record failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The unencrypted `item_type` disagrees with the authenticated one.
    #[error("item type mismatch: metadata says `{outer}`, content says `{inner}`")]
    ItemTypeMismatch { outer: String, inner: String },

    /// The item is not present in the cache.
    #[error("item not found: {id}")]
    ItemNotFound { id: String },

    /// An update tried to change a field that is fixed for the item's lifetime.
    #[error("invalid update: {0}")]
    InvalidUpdate(String),

    /// The operation needs the user secret key but the session is locked.
    #[error("vault is locked")]
    Locked,

    /// The remote document store rejected a call.
    #[error("{source}")]
    Persistence {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The local key-value store rejected a call.
    #[error("key store error: {source}")]
    KeyStore {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A remembered session could not be restored.
    #[error("session restore failed: {0}")]
    Session(SessionFailure),

    /// Configuration errors.
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl VaultError {
    /// Returns the restore failure reason if this is a session error.
    pub fn session_failure(&self) -> Option<SessionFailure> {
        match self {
            VaultError::Session(reason) => Some(*reason),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for VaultError {
    fn from(e: serde_json::Error) -> Self {
        VaultError::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn session_failure_uses_wire_reasons() {
        let reasons = [
            (SessionFailure::NotFound, "not_found"),
            (SessionFailure::Expired, "expired"),
            (SessionFailure::FingerprintMismatch, "fingerprint_mismatch"),
            (SessionFailure::DecryptionFailed, "decryption_failed"),
            (SessionFailure::Corrupted, "corrupted"),
        ];
        for (reason, wire) in reasons {
            assert_eq!(reason.to_string(), wire);
            assert_eq!(SessionFailure::from_str(wire).unwrap(), reason);
            assert_eq!(serde_json::to_string(&reason).unwrap(), format!("\"{wire}\""));
        }
    }

    #[test]
    fn session_failure_is_recoverable_from_error() {
        let err = VaultError::Session(SessionFailure::FingerprintMismatch);
        assert_eq!(err.session_failure(), Some(SessionFailure::FingerprintMismatch));
        assert_eq!(VaultError::Locked.session_failure(), None);
    }

    #[test]
    fn persistence_error_renders_source_verbatim() {
        let err = VaultError::Persistence {
            source: "permission denied on users/u1".into(),
        };
        assert_eq!(err.to_string(), "permission denied on users/u1");
    }

    #[test]
    fn decryption_failure_does_not_leak_cause() {
        assert_eq!(VaultError::DecryptionFailure.to_string(), "decryption failed");
    }
}
