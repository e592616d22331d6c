// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory document store.
//!
//! `MemoryGateway` implements `PersistenceGateway` over a map from document
//! path to JSON, assigning v4 UUIDs on `add_document`. Returned documents
//! carry their id in an `id` field, as a real document store would.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use keyward_core::{Document, PersistenceGateway, VaultError, document_path};
use tokio::sync::Mutex;

/// Message carried by every error while the gateway is failing.
pub const UNAVAILABLE: &str = "document store unavailable";

/// A document store held in memory.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    documents: Mutex<BTreeMap<String, Document>>,
    reads: AtomicUsize,
    failing: AtomicBool,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `get_collection` and `get_document` calls served so far.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Make every subsequent call fail with a persistence error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Store a document directly, bypassing the vault.
    pub async fn insert(&self, path: &str, document: Document) {
        self.documents.lock().await.insert(path.to_string(), document);
    }

    /// The raw stored document at `path`.
    pub async fn document(&self, path: &str) -> Option<Document> {
        self.documents.lock().await.get(path).cloned()
    }

    /// Every stored document in `collection`, with ids, as a client would
    /// receive them.
    pub async fn export(&self, collection: &str) -> Vec<Document> {
        let documents = self.documents.lock().await;
        collect(&documents, collection)
    }

    pub async fn len(&self) -> usize {
        self.documents.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.lock().await.is_empty()
    }

    fn check(&self) -> Result<(), VaultError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(VaultError::Persistence {
                source: std::io::Error::other(UNAVAILABLE).into(),
            });
        }
        Ok(())
    }
}

fn with_id(id: &str, mut document: Document) -> Document {
    if let Some(fields) = document.as_object_mut() {
        fields.insert("id".to_string(), serde_json::Value::String(id.to_string()));
    }
    document
}

fn collect(documents: &BTreeMap<String, Document>, collection: &str) -> Vec<Document> {
    let prefix = format!("{}/", collection.trim_end_matches('/'));
    documents
        .iter()
        .filter_map(|(path, document)| {
            let id = path.strip_prefix(&prefix)?;
            (!id.contains('/')).then(|| with_id(id, document.clone()))
        })
        .collect()
}

#[async_trait]
impl PersistenceGateway for MemoryGateway {
    async fn get_collection(&self, path: &str) -> Result<Vec<Document>, VaultError> {
        self.check()?;
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(collect(&*self.documents.lock().await, path))
    }

    async fn get_document(&self, path: &str) -> Result<Option<Document>, VaultError> {
        self.check()?;
        self.reads.fetch_add(1, Ordering::SeqCst);
        let id = path.rsplit('/').next().unwrap_or(path);
        Ok(self
            .documents
            .lock()
            .await
            .get(path)
            .cloned()
            .map(|document| with_id(id, document)))
    }

    async fn add_document(&self, path: &str, document: Document) -> Result<String, VaultError> {
        self.check()?;
        let id = uuid::Uuid::new_v4().to_string();
        self.documents
            .lock()
            .await
            .insert(document_path(path, &id), document);
        Ok(id)
    }

    async fn add_document_with_id(
        &self,
        path: &str,
        id: &str,
        document: Document,
    ) -> Result<String, VaultError> {
        self.check()?;
        self.documents
            .lock()
            .await
            .insert(document_path(path, id), document);
        Ok(id.to_string())
    }

    async fn update_document(&self, path: &str, document: Document) -> Result<(), VaultError> {
        self.check()?;
        let mut documents = self.documents.lock().await;
        match documents.get_mut(path) {
            Some(existing) => {
                *existing = document;
                Ok(())
            }
            None => Err(VaultError::Persistence {
                source: format!("no document at {path}").into(),
            }),
        }
    }

    async fn delete_document(&self, path: &str) -> Result<(), VaultError> {
        self.check()?;
        self.documents.lock().await.remove(path);
        Ok(())
    }
}
