// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The background service that owns the session and answers bridge requests.

use std::sync::Arc;

use async_trait::async_trait;
use keyward_autofill::{AutofillMatcher, InjectableCredential};
use keyward_core::{Clock, Document, KeyValueStore, VaultError};
use keyward_vault::{SecretKey, SessionKeyManager, VaultCache};
use tracing::{debug, info, warn};

use crate::protocol::{BridgeRequest, BridgeResponse, Outcome};

/// Adapter that fills a credential into the page that asked for it.
#[async_trait]
pub trait CredentialInjector: Send + Sync + 'static {
    async fn inject(&self, credential: &InjectableCredential) -> Result<(), VaultError>;
}

/// Answers [`BridgeRequest`]s against one session and its vault cache.
pub struct BackgroundService {
    session: Arc<SessionKeyManager>,
    cache: Arc<VaultCache>,
    matcher: AutofillMatcher,
    store: Arc<dyn KeyValueStore>,
    injector: Arc<dyn CredentialInjector>,
    clock: Arc<dyn Clock>,
    vault_blob_key: String,
}

impl std::fmt::Debug for BackgroundService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackgroundService")
            .field("vault_blob_key", &self.vault_blob_key)
            .finish_non_exhaustive()
    }
}

impl BackgroundService {
    pub fn new(
        session: Arc<SessionKeyManager>,
        cache: Arc<VaultCache>,
        store: Arc<dyn KeyValueStore>,
        injector: Arc<dyn CredentialInjector>,
        clock: Arc<dyn Clock>,
        vault_blob_key: impl Into<String>,
    ) -> Self {
        Self {
            matcher: AutofillMatcher::new(cache.clone()),
            session,
            cache,
            store,
            injector,
            clock,
            vault_blob_key: vault_blob_key.into(),
        }
    }

    /// Answer one request.
    pub async fn handle(&self, request: BridgeRequest) -> BridgeResponse {
        debug!(request = request.kind(), "bridge request");
        match request {
            BridgeRequest::GetSessionStatus => BridgeResponse::SessionStatus {
                is_valid: self.session.is_unlocked().await,
            },
            BridgeRequest::GetMatchingCredentials { domain } => BridgeResponse::Credentials {
                credentials: self.matcher.matching_credentials(&domain).await,
            },
            BridgeRequest::InjectCredential { credential_id } => {
                self.inject(&credential_id).await.into()
            }
            BridgeRequest::RestoreVault => outcome(self.restore_vault().await).into(),
            BridgeRequest::SyncVault { vault_data } => {
                outcome(self.sync_vault(vault_data).await).into()
            }
        }
    }

    /// Answer one JSON-encoded request with a JSON-encoded response.
    ///
    /// An envelope that does not parse is answered with a failed outcome.
    pub async fn handle_json(&self, raw: &str) -> String {
        let response = match serde_json::from_str::<BridgeRequest>(raw) {
            Ok(request) => self.handle(request).await,
            Err(e) => {
                warn!(error = %e, "malformed bridge request");
                Outcome::failed(format!("invalid request: {e}")).into()
            }
        };
        serde_json::to_string(&response).unwrap_or_else(|e| {
            format!(r#"{{"success":false,"error":"failed to encode response: {e}"}}"#)
        })
    }

    async fn inject(&self, id: &str) -> Outcome {
        let Some(credential) = self.matcher.credential_for_injection(id).await else {
            return Outcome::failed("credential not available");
        };
        if let Err(e) = self.injector.inject(&credential).await {
            warn!(id = %id, error = %e, "credential injection failed");
            return Outcome::failed(e.to_string());
        }

        if let Ok(key) = self.session.secret_key().await
            && let Err(e) = self.cache.mark_used(&key, id, self.clock.now()).await
        {
            warn!(id = %id, error = %e, "failed to record credential use");
        }
        info!(id = %id, "credential injected");
        Outcome::ok()
    }

    /// The outcome reflects the session only. A stored vault copy that does
    /// not load leaves the cache empty; the caller refetches from the remote
    /// store.
    async fn restore_vault(&self) -> Result<(), VaultError> {
        let key = self.session.restore().await?;
        match self.load_stored_vault(&key).await {
            Ok(items) => info!(items, "vault restored"),
            Err(e) => warn!(error = %e, "session restored, stored vault not loaded"),
        }
        Ok(())
    }

    async fn load_stored_vault(&self, key: &SecretKey) -> Result<usize, VaultError> {
        let Some(blob) = self.store.get(&self.vault_blob_key).await? else {
            return Ok(0);
        };
        let documents: Vec<Document> = serde_json::from_str(&blob)?;
        self.cache.load_documents(key, &documents).await
    }

    async fn sync_vault(&self, documents: Vec<Document>) -> Result<(), VaultError> {
        self.store
            .set(&self.vault_blob_key, &serde_json::to_string(&documents)?)
            .await?;
        if let Ok(key) = self.session.secret_key().await {
            self.cache.load_documents(&key, &documents).await?;
        }
        debug!(documents = documents.len(), "vault synced");
        Ok(())
    }
}

/// Session failures travel as their bare reason so the UI can branch on it.
fn outcome(result: Result<(), VaultError>) -> Outcome {
    match result {
        Ok(()) => Outcome::ok(),
        Err(e) => match e.session_failure() {
            Some(reason) => Outcome::failed(reason.to_string()),
            None => Outcome::failed(e.to_string()),
        },
    }
}
