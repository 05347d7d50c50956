// SPDX-FileCopyrightText: 2026 Omnigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! TTL cache for the Omnigate flow bridge.
//!
//! - [`KvStore`]: capability interface any expiring key-value store can satisfy
//! - [`MemoryStore`]: in-process implementation with atomic guarded writes
//! - [`ChatCache`]: the namespaced operations the bridge uses (sessions,
//!   confirmation tokens, buffered messages, node affinity)

pub mod chat;
pub mod keys;
pub mod memory;
pub mod store;

pub use chat::ChatCache;
pub use memory::MemoryStore;
pub use store::{Guard, KvStore};
