// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter traits for the collaborators the vault engine does not own.
//!
//! Persistence adapters use `#[async_trait]` so they can be held as
//! `Arc<dyn Trait>` by the cache and session manager.

pub mod clock;
pub mod gateway;
pub mod key_store;

pub use clock::{Clock, SystemClock};
pub use gateway::PersistenceGateway;
pub use key_store::KeyValueStore;
