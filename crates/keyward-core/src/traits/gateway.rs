// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Remote document store adapter.

use async_trait::async_trait;

use crate::error::VaultError;
use crate::types::Document;

/// Adapter for the remote document store holding encrypted items.
///
/// Paths are slash-separated (`vault_items` for a collection,
/// `vault_items/<id>` for a document). Implementations report rejections as
/// [`VaultError::Persistence`]; callers propagate them unchanged and never
/// retry.
#[async_trait]
pub trait PersistenceGateway: Send + Sync + 'static {
    /// Returns every document in the collection at `path`.
    async fn get_collection(&self, path: &str) -> Result<Vec<Document>, VaultError>;

    /// Returns the document at `path`, or `None` if it does not exist.
    async fn get_document(&self, path: &str) -> Result<Option<Document>, VaultError>;

    /// Adds a document to the collection at `path` and returns the id the
    /// store assigned to it.
    async fn add_document(&self, path: &str, document: Document) -> Result<String, VaultError>;

    /// Adds a document under a caller-chosen id and returns that id.
    async fn add_document_with_id(
        &self,
        path: &str,
        id: &str,
        document: Document,
    ) -> Result<String, VaultError>;

    /// Replaces the document at `path`.
    async fn update_document(&self, path: &str, document: Document) -> Result<(), VaultError>;

    /// Deletes the document at `path`.
    async fn delete_document(&self, path: &str) -> Result<(), VaultError>;
}
