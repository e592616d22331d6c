// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Autofill support: which stored credentials belong to the page in front
//! of the user.
//!
//! Domain comparison uses a two-label heuristic (`a.b.example.com` reduces to
//! `example.com`), not the public suffix list, so `www.example.co.uk` reduces
//! to `co.uk`.

pub mod domain;
pub mod matcher;

pub use domain::{hostname, matches, registered_domain, root_domain};
pub use matcher::{AutofillMatcher, CredentialMeta, InjectableCredential};
