// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message envelopes.
//!
//! Requests (JSON):
//! ```json
//! {"type": "GET_SESSION_STATUS"}
//! {"type": "GET_MATCHING_CREDENTIALS", "domain": "example.com"}
//! {"type": "INJECT_CREDENTIAL", "credentialId": "..."}
//! {"type": "RESTORE_VAULT"}
//! {"type": "SYNC_VAULT", "vaultData": [ ...encrypted documents... ]}
//! ```
//!
//! Responses (JSON):
//! ```json
//! {"isValid": true}
//! {"credentials": [{"id": "...", "title": "...", "username": "...", "url": "..."}]}
//! {"success": false, "error": "expired"}
//! ```

use keyward_autofill::CredentialMeta;
use keyward_core::Document;
use serde::{Deserialize, Serialize};

/// A request from another context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum BridgeRequest {
    GetSessionStatus,
    GetMatchingCredentials { domain: String },
    InjectCredential { credential_id: String },
    RestoreVault,
    SyncVault { vault_data: Vec<Document> },
}

impl BridgeRequest {
    /// Wire name of the request type, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            BridgeRequest::GetSessionStatus => "GET_SESSION_STATUS",
            BridgeRequest::GetMatchingCredentials { .. } => "GET_MATCHING_CREDENTIALS",
            BridgeRequest::InjectCredential { .. } => "INJECT_CREDENTIAL",
            BridgeRequest::RestoreVault => "RESTORE_VAULT",
            BridgeRequest::SyncVault { .. } => "SYNC_VAULT",
        }
    }
}

/// Result of a request that only reports success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Outcome {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

/// The single answer to a [`BridgeRequest`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BridgeResponse {
    SessionStatus {
        #[serde(rename = "isValid")]
        is_valid: bool,
    },
    Credentials { credentials: Vec<CredentialMeta> },
    Outcome(Outcome),
}

impl From<Outcome> for BridgeResponse {
    fn from(outcome: Outcome) -> Self {
        BridgeResponse::Outcome(outcome)
    }
}
