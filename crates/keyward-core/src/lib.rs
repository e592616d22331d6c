// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Keyward vault engine.
//!
//! This crate provides the error taxonomy, the gateway traits that stand in
//! for the remote document store and the local key-value store, and the
//! clock abstraction used by session expiry. Every other Keyward crate
//! depends on it; it depends on no other Keyward crate.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{SessionFailure, VaultError};
pub use types::{document_path, Document};

pub use traits::{Clock, KeyValueStore, PersistenceGateway, SystemClock};
