// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential lookup over the vault cache.
//!
//! Only the credential partition is consulted. Listing returns metadata
//! without passwords; the password leaves the cache only through
//! [`AutofillMatcher::credential_for_injection`].

use std::sync::Arc;

use keyward_vault::{Item, VaultCache};
use serde::Serialize;
use tracing::debug;

use crate::domain::{hostname, root_domain};

/// A matching credential as shown in a picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialMeta {
    pub id: String,
    pub title: String,
    pub username: String,
    pub url: String,
}

/// Everything needed to fill a login form.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InjectableCredential {
    pub id: String,
    pub title: String,
    pub username: String,
    pub password: String,
    pub url: String,
}

impl std::fmt::Debug for InjectableCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InjectableCredential")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("url", &self.url)
            .finish()
    }
}

/// Answers "which credentials fit this page" from the cached vault.
#[derive(Debug, Clone)]
pub struct AutofillMatcher {
    cache: Arc<VaultCache>,
}

impl AutofillMatcher {
    pub fn new(cache: Arc<VaultCache>) -> Self {
        Self { cache }
    }

    /// True once at least one credential is cached.
    pub async fn is_available(&self) -> bool {
        self.cache.has_credentials().await
    }

    /// Credentials whose URL belongs to `page_domain`, without passwords.
    ///
    /// A credential matches when its host or root domain equals the page's
    /// domain or root domain, or when the page is a subdomain of the
    /// credential's root domain.
    pub async fn matching_credentials(&self, page_domain: &str) -> Vec<CredentialMeta> {
        if !self.is_available().await {
            return Vec::new();
        }

        let page = page_domain.to_lowercase();
        let page_root = root_domain(&page);
        let matched: Vec<CredentialMeta> = self
            .cache
            .credentials()
            .await
            .iter()
            .filter_map(|item| {
                let credential = item.as_credential()?;
                if credential.url.is_empty() {
                    return None;
                }
                let host = hostname(&credential.url).unwrap_or_else(|| credential.url.to_lowercase());
                let host_root = root_domain(&host);
                if host_root.is_empty() {
                    return None;
                }
                let fits = host == page
                    || host == page_root
                    || host_root == page
                    || host_root == page_root
                    || (page.contains(&host_root) && page != host_root);
                fits.then(|| CredentialMeta {
                    id: item.id.clone(),
                    title: item.title().to_string(),
                    username: credential.username.clone(),
                    url: credential.url.clone(),
                })
            })
            .collect();

        debug!(domain = %page, matches = matched.len(), "autofill lookup");
        matched
    }

    /// Full credential for `id`, or `None` when nothing is available or the
    /// id is not a cached credential.
    pub async fn credential_for_injection(&self, id: &str) -> Option<InjectableCredential> {
        if !self.is_available().await {
            return None;
        }
        self.cache
            .credentials()
            .await
            .into_iter()
            .find(|item| item.id == id)
            .and_then(|item| injectable(&item))
    }
}

fn injectable(item: &Item) -> Option<InjectableCredential> {
    let credential = item.as_credential()?;
    Some(InjectableCredential {
        id: item.id.clone(),
        title: item.title().to_string(),
        username: credential.username.clone(),
        password: credential.password.clone(),
        url: credential.url.clone(),
    })
}
