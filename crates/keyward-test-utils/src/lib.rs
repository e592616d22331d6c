// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Keyward integration tests.
//!
//! Provides in-memory adapters and a harness for fast, deterministic tests
//! without a remote document store or platform key storage.
//!
//! # Components
//!
//! - [`MemoryGateway`] - In-memory document store that counts reads and can be told to fail
//! - [`MemoryKeyStore`] - In-memory key-value store
//! - [`FixedDeviceInfo`] - Device attribute source that tests can swap out
//! - [`ManualClock`] - Clock that only moves when told to
//! - [`TestHarness`] - Cache and session manager wired to all of the above

pub mod clock;
pub mod device;
pub mod harness;
pub mod memory_gateway;
pub mod memory_store;

pub use clock::ManualClock;
pub use device::FixedDeviceInfo;
pub use harness::{TEST_KDF_ITERATIONS, TEST_PASSWORD, TEST_SALT, TestHarness};
pub use memory_gateway::MemoryGateway;
pub use memory_store::MemoryKeyStore;
