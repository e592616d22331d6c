// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence for Keyward's local key-value store.
//!
//! Provides a WAL-mode SQLite database with embedded migrations and a
//! single-writer concurrency model via `tokio-rusqlite`.

pub mod database;
pub mod key_value;
pub mod migrations;

pub use database::Database;
pub use key_value::SqliteKeyValueStore;
