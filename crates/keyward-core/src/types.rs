// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across the Keyward crates.

/// A schemaless document as exchanged with the remote store.
pub type Document = serde_json::Value;

/// Joins a collection path and a document id.
pub fn document_path(collection: &str, id: &str) -> String {
    format!("{}/{}", collection.trim_end_matches('/'), id)
}
