// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Envelope encryption of vault items.
//!
//! `content_encrypted = seal(item_key, content_json)` and
//! `item_key_encrypted = seal(user_secret_key, item_key)`.

use std::str::FromStr;

use keyward_core::{Document, VaultError};
use tracing::warn;

use crate::crypto::{self, SecretKey};
use crate::item::{EncryptedItem, Item, ItemContent, ItemType};

/// Seal an item under its own key and wrap that key under `user_key`.
pub fn encrypt(user_key: &SecretKey, item: &Item) -> Result<EncryptedItem, VaultError> {
    let item_key = SecretKey::from_b64url(&item.item_key)?;
    let content_json = zeroize::Zeroizing::new(serde_json::to_vec(&item.content)?);

    Ok(EncryptedItem {
        id: item.id.clone(),
        created_at: item.created_at,
        last_used_at: item.last_used_at,
        item_type: item.item_type().to_string(),
        content_encrypted: crypto::encrypt(&item_key, &content_json)?,
        item_key_encrypted: crypto::encrypt(user_key, item.item_key.as_bytes())?,
    })
}

/// Open an encrypted item.
///
/// Returns `Ok(None)` only when the sealed content carries an `itemType`
/// this build does not know. Cryptographic and JSON failures are errors,
/// as is a sealed `itemType` that disagrees with the clear-text `item_type`.
pub fn decrypt(user_key: &SecretKey, encrypted: &EncryptedItem) -> Result<Option<Item>, VaultError> {
    let item_key = crypto::decrypt_to_string(user_key, &encrypted.item_key_encrypted)?;
    let plaintext = crypto::decrypt(
        &SecretKey::from_b64url(&item_key)?,
        &encrypted.content_encrypted,
    )?;

    let content: serde_json::Value = serde_json::from_slice(&plaintext)?;
    let tag = content
        .get("itemType")
        .and_then(serde_json::Value::as_str)
        .unwrap_or_default();
    let Ok(item_type) = ItemType::from_str(tag) else {
        warn!(id = %encrypted.id, item_type = %tag, "skipping item with unknown item type");
        return Ok(None);
    };
    if item_type.to_string() != encrypted.item_type {
        return Err(VaultError::ItemTypeMismatch {
            outer: encrypted.item_type.clone(),
            inner: item_type.to_string(),
        });
    }

    let content: ItemContent = serde_json::from_value(content)?;
    Ok(Some(Item {
        id: encrypted.id.clone(),
        created_at: encrypted.created_at,
        last_used_at: encrypted.last_used_at,
        item_key: (*item_key).clone(),
        content,
    }))
}

/// Decrypt a batch of raw documents.
///
/// Documents whose `content_encrypted` or `item_key_encrypted` is not a
/// string are skipped. Any error on a remaining document aborts the batch.
pub fn decrypt_all(user_key: &SecretKey, documents: &[Document]) -> Result<Vec<Item>, VaultError> {
    let mut items = Vec::with_capacity(documents.len());
    for document in documents {
        let well_formed = ["content_encrypted", "item_key_encrypted"]
            .iter()
            .all(|field| document.get(field).is_some_and(serde_json::Value::is_string));
        if !well_formed {
            let id = document.get("id").and_then(serde_json::Value::as_str).unwrap_or("?");
            warn!(id = %id, "skipping malformed vault document");
            continue;
        }

        let encrypted: EncryptedItem = serde_json::from_value(document.clone())?;
        if let Some(item) = decrypt(user_key, &encrypted)? {
            items.push(item);
        }
    }
    Ok(items)
}
