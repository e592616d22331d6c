// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-through/write-through cache of decrypted items.
//!
//! The cache owns three partitions (credentials, bank cards, secure notes)
//! keyed by item id. Reads are served from memory once anything is cached;
//! writes go to the [`PersistenceGateway`] first and update memory only after
//! the gateway accepts them. Gateway errors propagate unchanged.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use keyward_core::{Document, PersistenceGateway, VaultError, document_path};
use tokio::sync::RwLock;
use tracing::debug;

use crate::codec;
use crate::crypto::SecretKey;
use crate::item::{EncryptedItem, Item, ItemType};

#[derive(Debug, Default)]
struct Partitions {
    credentials: BTreeMap<String, Item>,
    bank_cards: BTreeMap<String, Item>,
    secure_notes: BTreeMap<String, Item>,
    /// Set once a collection read has completed, so an empty vault is not
    /// re-fetched on every call.
    loaded: bool,
}

impl Partitions {
    fn is_empty(&self) -> bool {
        self.credentials.is_empty() && self.bank_cards.is_empty() && self.secure_notes.is_empty()
    }

    fn is_hit(&self) -> bool {
        self.loaded || !self.is_empty()
    }

    fn partition_mut(&mut self, item_type: ItemType) -> &mut BTreeMap<String, Item> {
        match item_type {
            ItemType::Credential => &mut self.credentials,
            ItemType::BankCard => &mut self.bank_cards,
            ItemType::SecureNote => &mut self.secure_notes,
        }
    }

    fn insert(&mut self, item: Item) {
        self.partition_mut(item.item_type()).insert(item.id.clone(), item);
    }

    fn find(&self, id: &str) -> Option<&Item> {
        self.credentials
            .get(id)
            .or_else(|| self.bank_cards.get(id))
            .or_else(|| self.secure_notes.get(id))
    }

    fn remove(&mut self, id: &str) -> Option<Item> {
        self.credentials
            .remove(id)
            .or_else(|| self.bank_cards.remove(id))
            .or_else(|| self.secure_notes.remove(id))
    }

    fn replace_all(&mut self, items: Vec<Item>) {
        self.clear();
        for item in items {
            self.insert(item);
        }
        self.loaded = true;
    }

    fn clear(&mut self) {
        self.credentials.clear();
        self.bank_cards.clear();
        self.secure_notes.clear();
        self.loaded = false;
    }

    fn union(&self) -> Vec<Item> {
        self.credentials
            .values()
            .chain(self.bank_cards.values())
            .chain(self.secure_notes.values())
            .cloned()
            .collect()
    }
}

/// In-memory vault contents backed by a remote document collection.
///
/// Create one per unlocked session and [`clear`](Self::clear) it on lock.
/// Concurrent writers to different ids are safe; callers serialize writes
/// to the same id.
pub struct VaultCache {
    gateway: Arc<dyn PersistenceGateway>,
    collection: String,
    partitions: RwLock<Partitions>,
}

impl std::fmt::Debug for VaultCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultCache")
            .field("collection", &self.collection)
            .finish_non_exhaustive()
    }
}

impl VaultCache {
    pub fn new(gateway: Arc<dyn PersistenceGateway>, collection: impl Into<String>) -> Self {
        Self {
            gateway,
            collection: collection.into(),
            partitions: RwLock::new(Partitions::default()),
        }
    }

    /// Collection path the cache reads from and writes to.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Every cached item, fetching and decrypting the collection on a miss.
    ///
    /// A cache that holds anything at all counts as a hit, including one
    /// populated only by [`get_by_id`](Self::get_by_id) or [`add`](Self::add).
    /// Use [`refresh`](Self::refresh) to force a remote read.
    pub async fn get_all(&self, key: &SecretKey) -> Result<Vec<Item>, VaultError> {
        {
            let partitions = self.partitions.read().await;
            if partitions.is_hit() {
                return Ok(partitions.union());
            }
        }

        let mut partitions = self.partitions.write().await;
        if partitions.is_hit() {
            return Ok(partitions.union());
        }
        let documents = self.gateway.get_collection(&self.collection).await?;
        let items = codec::decrypt_all(key, &documents)?;
        debug!(
            collection = %self.collection,
            documents = documents.len(),
            items = items.len(),
            "vault cache loaded"
        );
        partitions.replace_all(items);
        Ok(partitions.union())
    }

    /// Look up one item, falling back to a single-document fetch on a miss.
    ///
    /// Returns `None` when the document does not exist remotely or carries an
    /// unknown item type.
    pub async fn get_by_id(&self, key: &SecretKey, id: &str) -> Result<Option<Item>, VaultError> {
        if let Some(item) = self.partitions.read().await.find(id) {
            return Ok(Some(item.clone()));
        }

        let path = document_path(&self.collection, id);
        let Some(mut document) = self.gateway.get_document(&path).await? else {
            return Ok(None);
        };
        if let Some(fields) = document.as_object_mut() {
            fields
                .entry("id")
                .or_insert_with(|| serde_json::Value::String(id.to_string()));
        }
        let encrypted: EncryptedItem = serde_json::from_value(document)?;
        let Some(item) = codec::decrypt(key, &encrypted)? else {
            return Ok(None);
        };

        debug!(id = %id, "vault cache filled from single document");
        self.partitions.write().await.insert(item.clone());
        Ok(Some(item))
    }

    /// Encrypt and persist a new item, returning its id.
    ///
    /// Items without an id get one from the store; an item that already
    /// carries an id (a re-import) is written under that id.
    pub async fn add(&self, key: &SecretKey, mut item: Item) -> Result<String, VaultError> {
        let document = to_document(&codec::encrypt(key, &item)?)?;
        let id = if item.id.is_empty() {
            self.gateway.add_document(&self.collection, document).await?
        } else {
            self.gateway
                .add_document_with_id(&self.collection, &item.id, document)
                .await?
        };

        item.id = id.clone();
        debug!(id = %id, item_type = %item.item_type(), "item added");
        self.partitions.write().await.insert(item);
        Ok(id)
    }

    /// Shallow-merge `updates` onto a cached item, persist it and return the
    /// merged item.
    ///
    /// Only cached items can be updated; a miss is [`VaultError::ItemNotFound`]
    /// and never triggers a remote fetch.
    pub async fn update(
        &self,
        key: &SecretKey,
        id: &str,
        updates: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<Item, VaultError> {
        let current = self
            .partitions
            .read()
            .await
            .find(id)
            .cloned()
            .ok_or_else(|| VaultError::ItemNotFound { id: id.to_string() })?;

        let merged = current.merged(updates)?;
        self.replace(key, merged.clone()).await?;
        debug!(id = %id, "item updated");
        Ok(merged)
    }

    /// Stamp a cached item's `lastUsedAt` and persist it.
    pub async fn mark_used(
        &self,
        key: &SecretKey,
        id: &str,
        now: DateTime<Utc>,
    ) -> Result<(), VaultError> {
        let mut item = self
            .partitions
            .read()
            .await
            .find(id)
            .cloned()
            .ok_or_else(|| VaultError::ItemNotFound { id: id.to_string() })?;
        item.touch(now);
        self.replace(key, item).await
    }

    async fn replace(&self, key: &SecretKey, item: Item) -> Result<(), VaultError> {
        let document = to_document(&codec::encrypt(key, &item)?)?;
        self.gateway
            .update_document(&document_path(&self.collection, &item.id), document)
            .await?;
        self.partitions.write().await.insert(item);
        Ok(())
    }

    /// Delete an item remotely, then drop it from the cache.
    pub async fn remove(&self, id: &str) -> Result<(), VaultError> {
        self.gateway
            .delete_document(&document_path(&self.collection, id))
            .await?;
        self.partitions.write().await.remove(id);
        debug!(id = %id, "item removed");
        Ok(())
    }

    /// Drop everything and reload from the store.
    pub async fn refresh(&self, key: &SecretKey) -> Result<Vec<Item>, VaultError> {
        self.clear().await;
        self.get_all(key).await
    }

    /// Empty every partition and forget that the collection was loaded.
    pub async fn clear(&self) {
        self.partitions.write().await.clear();
        debug!("vault cache cleared");
    }

    /// Replace the cache contents with a batch of already-fetched encrypted
    /// documents, as delivered by another context.
    pub async fn load_documents(
        &self,
        key: &SecretKey,
        documents: &[Document],
    ) -> Result<usize, VaultError> {
        let items = codec::decrypt_all(key, documents)?;
        let count = items.len();
        self.partitions.write().await.replace_all(items);
        debug!(items = count, "vault cache loaded from documents");
        Ok(count)
    }

    /// Snapshot of the credential partition.
    pub async fn credentials(&self) -> Vec<Item> {
        self.partitions.read().await.credentials.values().cloned().collect()
    }

    pub async fn has_credentials(&self) -> bool {
        !self.partitions.read().await.credentials.is_empty()
    }

    /// True when no partition holds anything.
    pub async fn is_empty(&self) -> bool {
        self.partitions.read().await.is_empty()
    }
}

/// The stored form: the encrypted item without its id, which lives in the path.
fn to_document(encrypted: &EncryptedItem) -> Result<Document, VaultError> {
    let mut document = serde_json::to_value(encrypted)?;
    if let Some(fields) = document.as_object_mut() {
        fields.remove("id");
    }
    Ok(document)
}
