// SPDX-FileCopyrightText: 2026 Omnigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Key-value store capability required by the bridge.

use std::time::Duration;

use async_trait::async_trait;
use omnigate_core::OmnigateError;

/// Precondition for [`KvStore::set_guarded`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard<'a> {
    /// Write only if this exact key is absent.
    KeyAbsent(&'a str),
    /// Write only if no key starts with this prefix.
    PrefixEmpty(&'a str),
}

/// An expiring key-value store.
///
/// Missing keys are `Ok(None)` / empty results; `Err` always means the store
/// itself failed.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, OmnigateError>;

    /// Unconditional write with expiry.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), OmnigateError>;

    /// Deleting an absent key succeeds.
    async fn delete(&self, key: &str) -> Result<(), OmnigateError>;

    /// Every live entry whose key starts with `prefix`, oldest write first.
    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, String)>, OmnigateError>;

    /// Writes `key` only if `guard` holds, returning whether the write happened.
    ///
    /// The default implementation checks then writes in two steps, so a
    /// concurrent writer can slip in between them. Stores with a native
    /// conditional write must override it to make the check atomic.
    async fn set_guarded(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
        guard: Guard<'_>,
    ) -> Result<bool, OmnigateError> {
        let blocked = match guard {
            Guard::KeyAbsent(other) => self.get(other).await?.is_some(),
            Guard::PrefixEmpty(prefix) => !self.scan_prefix(prefix).await?.is_empty(),
        };
        if blocked {
            return Ok(false);
        }
        self.set(key, value, ttl).await?;
        Ok(true)
    }

    /// Deletes `key` only while it still holds `expected`, returning whether
    /// it was removed.
    ///
    /// Same caveat as [`KvStore::set_guarded`]: the default checks then deletes.
    async fn delete_if(&self, key: &str, expected: &str) -> Result<bool, OmnigateError> {
        if self.get(key).await?.as_deref() != Some(expected) {
            return Ok(false);
        }
        self.delete(key).await?;
        Ok(true)
    }
}
