// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! ChaCha20-Poly1305 seal/open and key material.
//!
//! Ciphertext format: standard base64 of `nonce (12) || ciphertext || tag (16)`.
//! Every call to [`encrypt`] draws a fresh random 96-bit nonce from the
//! system CSPRNG. No associated data is bound.

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use keyward_core::VaultError;
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, CHACHA20_POLY1305, NONCE_LEN};
use ring::rand::{SecureRandom, SystemRandom};
use zeroize::Zeroizing;

/// Length of every symmetric key in the vault.
pub const KEY_LEN: usize = 32;

const TAG_LEN: usize = 16;
const SALT_LEN: usize = 16;

/// A 256-bit symmetric key, zeroed on drop.
///
/// Debug output never includes the key bytes.
#[derive(Clone)]
pub struct SecretKey(Zeroizing<[u8; KEY_LEN]>);

impl SecretKey {
    /// Wrap raw key bytes.
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(Zeroizing::new(bytes))
    }

    /// Decode a key from unpadded base64url.
    pub fn from_b64url(encoded: &str) -> Result<Self, VaultError> {
        let bytes = Zeroizing::new(
            URL_SAFE_NO_PAD
                .decode(encoded.trim_end_matches('='))
                .map_err(|e| VaultError::Crypto(format!("key is not valid base64url: {e}")))?,
        );
        let array: [u8; KEY_LEN] = bytes.as_slice().try_into().map_err(|_| {
            VaultError::Crypto(format!(
                "key must be {KEY_LEN} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self::from_bytes(array))
    }

    /// Encode the key as unpadded base64url.
    pub fn to_b64url(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.0.as_slice())
    }

    /// Borrow the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl PartialEq for SecretKey {
    fn eq(&self, other: &Self) -> bool {
        self.0[..] == other.0[..]
    }
}

impl Eq for SecretKey {}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretKey([REDACTED])")
    }
}

fn aead_key(key: &SecretKey) -> Result<LessSafeKey, VaultError> {
    let unbound = UnboundKey::new(&CHACHA20_POLY1305, key.as_bytes())
        .map_err(|_| VaultError::Crypto("failed to create ChaCha20-Poly1305 key".to_string()))?;
    Ok(LessSafeKey::new(unbound))
}

/// Encrypt `plaintext` under `key` with a random nonce.
pub fn encrypt(key: &SecretKey, plaintext: &[u8]) -> Result<String, VaultError> {
    let sealing_key = aead_key(key)?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    SystemRandom::new()
        .fill(&mut nonce_bytes)
        .map_err(|_| VaultError::Crypto("failed to generate random nonce".to_string()))?;

    let mut in_out = plaintext.to_vec();
    sealing_key
        .seal_in_place_append_tag(
            Nonce::assume_unique_for_key(nonce_bytes),
            Aad::empty(),
            &mut in_out,
        )
        .map_err(|_| VaultError::Crypto("ChaCha20-Poly1305 encryption failed".to_string()))?;

    let mut framed = Vec::with_capacity(NONCE_LEN + in_out.len());
    framed.extend_from_slice(&nonce_bytes);
    framed.extend_from_slice(&in_out);
    Ok(STANDARD.encode(framed))
}

/// Decrypt a ciphertext produced by [`encrypt`].
///
/// Wrong key, tampering, bad base64 and truncation all yield the same
/// [`VaultError::DecryptionFailure`].
pub fn decrypt(key: &SecretKey, ciphertext: &str) -> Result<Zeroizing<Vec<u8>>, VaultError> {
    let framed = STANDARD
        .decode(ciphertext)
        .map_err(|_| VaultError::DecryptionFailure)?;
    if framed.len() < NONCE_LEN + TAG_LEN {
        return Err(VaultError::DecryptionFailure);
    }

    let (nonce_bytes, sealed) = framed.split_at(NONCE_LEN);
    let nonce = Nonce::try_assume_unique_for_key(nonce_bytes)
        .map_err(|_| VaultError::DecryptionFailure)?;

    let opening_key = aead_key(key)?;
    let mut in_out = Zeroizing::new(sealed.to_vec());
    let plaintext_len = opening_key
        .open_in_place(nonce, Aad::empty(), in_out.as_mut_slice())
        .map_err(|_| VaultError::DecryptionFailure)?
        .len();
    in_out.truncate(plaintext_len);
    Ok(in_out)
}

/// Decrypt and interpret the plaintext as UTF-8.
pub fn decrypt_to_string(key: &SecretKey, ciphertext: &str) -> Result<Zeroizing<String>, VaultError> {
    let bytes = decrypt(key, ciphertext)?;
    let text = std::str::from_utf8(&bytes).map_err(|_| VaultError::DecryptionFailure)?;
    Ok(Zeroizing::new(text.to_string()))
}

/// Generate a random 256-bit key. Used for item keys only.
pub fn generate_key() -> Result<SecretKey, VaultError> {
    let mut bytes = [0u8; KEY_LEN];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| VaultError::Crypto("failed to generate random key".to_string()))?;
    Ok(SecretKey::from_bytes(bytes))
}

/// Generate a random 128-bit salt, base64url-encoded, for a new account.
pub fn generate_salt() -> Result<String, VaultError> {
    let mut salt = [0u8; SALT_LEN];
    SystemRandom::new()
        .fill(&mut salt)
        .map_err(|_| VaultError::Crypto("failed to generate random salt".to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(salt))
}
