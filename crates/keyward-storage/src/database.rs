// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with WAL mode and migrations.
//!
//! All queries are serialized through tokio-rusqlite's single background
//! thread. Do NOT create additional Connection instances for writes.

use std::path::Path;

use keyward_core::VaultError;
use tracing::debug;

use crate::migrations::run_migrations;

/// An open, migrated database.
#[derive(Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish_non_exhaustive()
    }
}

impl Database {
    /// Open (creating if needed) the database at `path`, switch it to WAL
    /// and apply pending migrations.
    pub async fn open(path: &str) -> Result<Self, VaultError> {
        let owned = path.to_string();
        tokio::task::spawn_blocking(move || prepare(&owned))
            .await
            .map_err(|e| VaultError::Internal(format!("database setup task failed: {e}")))??;

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| VaultError::KeyStore {
                source: Box::new(e),
            })?;
        debug!(path = %path, "key store database opened");
        Ok(Self { conn })
    }

    /// The connection all queries go through.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }
}

fn prepare(path: &str) -> Result<(), VaultError> {
    if let Some(parent) = Path::new(path).parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| VaultError::KeyStore {
            source: Box::new(e),
        })?;
    }

    let mut conn = rusqlite::Connection::open(path).map_err(sqlite_err)?;
    let mode: String = conn
        .query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))
        .map_err(sqlite_err)?;
    debug!(journal_mode = %mode, "journal mode set");
    run_migrations(&mut conn)
}

fn sqlite_err(e: rusqlite::Error) -> VaultError {
    VaultError::KeyStore {
        source: Box::new(e),
    }
}

/// Map a tokio-rusqlite error into the key store error variant.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> VaultError {
    VaultError::KeyStore {
        source: Box::new(e),
    }
}
