// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vault item model and its encrypted representation.
//!
//! An [`Item`] is a tagged union keyed by the `itemType` discriminant. Only
//! `id`, the timestamps and the item type travel in the clear; title, note
//! and every type-specific field are sealed inside `content_encrypted`.

use chrono::{DateTime, NaiveDate, Utc};
use keyward_core::VaultError;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::crypto;

/// Discriminant shared by the clear-text metadata and the sealed content.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Credential,
    BankCard,
    SecureNote,
}

/// Website login.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub url: String,
}

/// Payment card.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankCard {
    #[serde(default)]
    pub cardholder_name: String,
    #[serde(default)]
    pub card_number: String,
    /// Falls back to the decoding date when absent.
    #[serde(default = "today")]
    pub expiration_date: NaiveDate,
    #[serde(default)]
    pub cvv: String,
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Type-specific fields. Serialized with an embedded `itemType` tag.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "itemType", rename_all = "snake_case")]
pub enum ItemDetails {
    Credential(Credential),
    BankCard(BankCard),
    SecureNote {},
}

impl ItemDetails {
    pub fn item_type(&self) -> ItemType {
        match self {
            ItemDetails::Credential(_) => ItemType::Credential,
            ItemDetails::BankCard(_) => ItemType::BankCard,
            ItemDetails::SecureNote {} => ItemType::SecureNote,
        }
    }
}

impl std::fmt::Debug for ItemDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemDetails::Credential(c) => f
                .debug_struct("Credential")
                .field("username", &c.username)
                .field("password", &"[REDACTED]")
                .field("url", &c.url)
                .finish(),
            ItemDetails::BankCard(card) => f
                .debug_struct("BankCard")
                .field("cardholder_name", &card.cardholder_name)
                .field("card_number", &"[REDACTED]")
                .field("expiration_date", &card.expiration_date)
                .field("cvv", &"[REDACTED]")
                .finish(),
            ItemDetails::SecureNote {} => f.write_str("SecureNote"),
        }
    }
}

/// The sealed part of an item: everything except id, timestamps and key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemContent {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub note: String,
    #[serde(flatten)]
    pub details: ItemDetails,
}

/// A decrypted vault item.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Assigned by the document store; empty until the item is persisted.
    #[serde(default)]
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub last_used_at: DateTime<Utc>,
    /// Per-item key, base64url. Generated once, never rotated.
    pub item_key: String,
    #[serde(flatten)]
    pub content: ItemContent,
}

impl std::fmt::Debug for Item {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Item")
            .field("id", &self.id)
            .field("created_at", &self.created_at)
            .field("last_used_at", &self.last_used_at)
            .field("item_key", &"[REDACTED]")
            .field("content", &self.content)
            .finish()
    }
}

impl Item {
    /// Create a new, not yet persisted item with a fresh item key.
    pub fn new(
        title: impl Into<String>,
        note: impl Into<String>,
        details: ItemDetails,
    ) -> Result<Self, VaultError> {
        let now = Utc::now();
        Ok(Self {
            id: String::new(),
            created_at: now,
            last_used_at: now,
            item_key: crypto::generate_key()?.to_b64url(),
            content: ItemContent {
                title: title.into(),
                note: note.into(),
                details,
            },
        })
    }

    pub fn new_credential(
        title: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        url: impl Into<String>,
    ) -> Result<Self, VaultError> {
        Self::new(
            title,
            "",
            ItemDetails::Credential(Credential {
                username: username.into(),
                password: password.into(),
                url: url.into(),
            }),
        )
    }

    pub fn new_bank_card(title: impl Into<String>, card: BankCard) -> Result<Self, VaultError> {
        Self::new(title, "", ItemDetails::BankCard(card))
    }

    pub fn new_secure_note(
        title: impl Into<String>,
        note: impl Into<String>,
    ) -> Result<Self, VaultError> {
        Self::new(title, note, ItemDetails::SecureNote {})
    }

    pub fn item_type(&self) -> ItemType {
        self.content.details.item_type()
    }

    pub fn title(&self) -> &str {
        &self.content.title
    }

    /// The credential fields, if this item is a credential.
    pub fn as_credential(&self) -> Option<&Credential> {
        match &self.content.details {
            ItemDetails::Credential(c) => Some(c),
            _ => None,
        }
    }

    /// Record a use of the item.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_used_at = now;
    }

    /// Shallow-merge `updates` (camelCase top-level keys) onto this item.
    ///
    /// `id`, `itemKey` and `itemType` are fixed for the item's lifetime;
    /// an update that changes any of them is rejected.
    pub fn merged(
        &self,
        updates: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<Item, VaultError> {
        let mut current = match serde_json::to_value(self)? {
            serde_json::Value::Object(map) => map,
            _ => return Err(VaultError::Internal("item did not serialize to an object".into())),
        };

        for fixed in ["id", "itemKey", "itemType"] {
            if let Some(new_value) = updates.get(fixed)
                && current.get(fixed) != Some(new_value)
            {
                return Err(VaultError::InvalidUpdate(format!("`{fixed}` cannot be changed")));
            }
        }

        for (field, value) in updates {
            current.insert(field.clone(), value.clone());
        }
        serde_json::from_value(serde_json::Value::Object(current))
            .map_err(|e| VaultError::InvalidUpdate(e.to_string()))
    }
}

/// The persisted form of an item.
///
/// `item_type` is kept as a string so that documents written by newer
/// clients with unknown types still deserialize and can be skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncryptedItem {
    #[serde(default)]
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub last_used_at: DateTime<Utc>,
    pub item_type: String,
    /// `ItemContent` JSON sealed under the item key.
    pub content_encrypted: String,
    /// The item key sealed under the user secret key.
    pub item_key_encrypted: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn content_embeds_item_type_tag() {
        let item = Item::new_credential("GitHub", "octo", "hunter2", "https://github.com").unwrap();
        let json = serde_json::to_value(&item.content).unwrap();
        assert_eq!(json["itemType"], "credential");
        assert_eq!(json["title"], "GitHub");
        assert_eq!(json["username"], "octo");
        assert!(json.get("itemKey").is_none());
    }

    #[test]
    fn new_items_get_distinct_keys_and_no_id() {
        let a = Item::new_secure_note("a", "first").unwrap();
        let b = Item::new_secure_note("b", "second").unwrap();
        assert!(a.id.is_empty());
        assert_ne!(a.item_key, b.item_key);
        assert_eq!(a.item_type(), ItemType::SecureNote);
    }

    #[test]
    fn missing_bank_card_fields_take_defaults() {
        let content: ItemContent =
            serde_json::from_value(json!({ "itemType": "bank_card", "cardNumber": "4111" })).unwrap();
        match content.details {
            ItemDetails::BankCard(card) => {
                assert_eq!(card.card_number, "4111");
                assert_eq!(card.cvv, "");
                assert_eq!(card.expiration_date, Utc::now().date_naive());
            }
            other => panic!("expected bank card, got {other:?}"),
        }
        assert_eq!(content.title, "");
    }

    #[test]
    fn merged_applies_shallow_updates() {
        let item = Item::new_credential("Mail", "me", "old", "mail.example.com").unwrap();
        let updates = json!({ "password": "new", "title": "Webmail" });
        let merged = item.merged(updates.as_object().unwrap()).unwrap();
        assert_eq!(merged.title(), "Webmail");
        assert_eq!(merged.as_credential().unwrap().password, "new");
        assert_eq!(merged.as_credential().unwrap().username, "me");
        assert_eq!(merged.item_key, item.item_key);
    }

    #[test]
    fn merged_rejects_changing_fixed_fields() {
        let item = Item::new_credential("Mail", "me", "pw", "mail.example.com").unwrap();
        for updates in [
            json!({ "itemType": "secure_note" }),
            json!({ "itemKey": "AAAA" }),
            json!({ "id": "other" }),
        ] {
            let err = item.merged(updates.as_object().unwrap()).unwrap_err();
            assert!(matches!(err, VaultError::InvalidUpdate(_)), "{err}");
        }
        let same_type = json!({ "itemType": "credential", "url": "x.example.com" });
        assert!(item.merged(same_type.as_object().unwrap()).is_ok());
    }

    #[test]
    fn debug_redacts_secrets() {
        let item = Item::new_credential("Bank", "me", "s3cr3t-pass", "bank.example").unwrap();
        let debug = format!("{item:?}");
        assert!(!debug.contains("s3cr3t-pass"));
        assert!(!debug.contains(&item.item_key));
        assert!(debug.contains("bank.example"));
    }
}
