// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Envelope-encrypted item vault for the Keyward password manager.
//!
//! Every item's content is sealed with ChaCha20-Poly1305 under its own random
//! item key; the item key is sealed under the user secret key, which is
//! derived from the master password with PBKDF2-HMAC-SHA256. The user secret
//! key lives in memory inside [`SessionKeyManager`] and may be remembered
//! across restarts, wrapped by a device-bound key.

pub mod cache;
pub mod codec;
pub mod crypto;
pub mod fingerprint;
pub mod item;
pub mod kdf;
pub mod session;

pub use cache::VaultCache;
pub use crypto::SecretKey;
pub use fingerprint::{DeviceAttributes, DeviceFingerprint, DeviceInfoSource, HostDeviceInfo};
pub use item::{BankCard, Credential, EncryptedItem, Item, ItemContent, ItemDetails, ItemType};
pub use session::{PersistentKeyRecord, SessionKeyManager, SessionState, CURRENT_VERSION};
