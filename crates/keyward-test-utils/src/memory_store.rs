// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory key-value store.

use std::collections::HashMap;

use async_trait::async_trait;
use keyward_core::{KeyValueStore, VaultError};
use tokio::sync::Mutex;

#[derive(Debug, Default)]
pub struct MemoryKeyStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.values.lock().await.contains_key(key)
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyStore {
    async fn get(&self, key: &str) -> Result<Option<String>, VaultError> {
        Ok(self.values.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), VaultError> {
        self.values
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), VaultError> {
        self.values.lock().await.remove(key);
        Ok(())
    }
}
