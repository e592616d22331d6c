// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cross-context messaging for Keyward.
//!
//! A UI or page context never shares memory with the background service that
//! owns the vault; it sends a [`BridgeRequest`] and receives exactly one
//! [`BridgeResponse`]. Anything read this way may already be stale.

pub mod protocol;
pub mod service;

pub use protocol::{BridgeRequest, BridgeResponse, Outcome};
pub use service::{BackgroundService, CredentialInjector};
