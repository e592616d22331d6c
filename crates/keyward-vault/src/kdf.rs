// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! PBKDF2-HMAC-SHA256 key derivation.
//!
//! The salt is an opaque string whose UTF-8 bytes feed PBKDF2 directly, so
//! account salts (base64url text) and device fingerprints (JSON text) go
//! through the same function.

use std::num::NonZeroU32;

use keyward_core::VaultError;
use ring::pbkdf2;

use crate::crypto::{SecretKey, KEY_LEN};

/// PBKDF2 iteration count of the vault format. Every client must use it.
pub const KDF_ITERATIONS: u32 = 300_000;

/// Derive the 256-bit key for `password` and `salt` with [`KDF_ITERATIONS`].
pub fn derive_key(password: &str, salt: &str) -> Result<SecretKey, VaultError> {
    derive_key_with_iterations(password, salt, KDF_ITERATIONS)
}

/// Derive a 256-bit key with an explicit iteration count.
///
/// Empty passwords, empty salts and a zero iteration count are rejected.
pub fn derive_key_with_iterations(
    password: &str,
    salt: &str,
    iterations: u32,
) -> Result<SecretKey, VaultError> {
    if password.is_empty() {
        return Err(VaultError::Crypto("password must not be empty".to_string()));
    }
    if salt.is_empty() {
        return Err(VaultError::Crypto("salt must not be empty".to_string()));
    }
    let iterations = NonZeroU32::new(iterations)
        .ok_or_else(|| VaultError::Crypto("KDF iteration count must be non-zero".to_string()))?;

    let mut output = [0u8; KEY_LEN];
    pbkdf2::derive(
        pbkdf2::PBKDF2_HMAC_SHA256,
        iterations,
        salt.as_bytes(),
        password.as_bytes(),
        &mut output,
    );
    let key = SecretKey::from_bytes(output);
    zeroize::Zeroize::zeroize(&mut output);
    Ok(key)
}
