// SPDX-FileCopyrightText: 2026 Omnigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process [`KvStore`] with lazy expiry and a background sweeper.
//!
//! All entries live behind one mutex, which is what makes
//! [`KvStore::set_guarded`] atomic here: the guard check and the write happen
//! under the same lock.

use std::collections::BTreeMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use async_trait::async_trait;
use omnigate_core::OmnigateError;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

use crate::store::{Guard, KvStore};

#[derive(Debug)]
struct Entry {
    value: String,
    expires_at: Instant,
    /// Write sequence number, used to return prefix scans in arrival order.
    seq: u64,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

#[derive(Debug, Default)]
struct Inner {
    entries: BTreeMap<String, Entry>,
    next_seq: u64,
}

impl Inner {
    fn insert(&mut self, key: &str, value: &str, ttl: Duration) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Instant::now() + ttl,
                seq,
            },
        );
    }

    fn live(&self, key: &str, now: Instant) -> Option<&Entry> {
        self.entries.get(key).filter(|e| e.is_live(now))
    }

    fn scan(&self, prefix: &str, now: Instant) -> Vec<(&String, &Entry)> {
        let mut hits: Vec<_> = self
            .entries
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .filter(|(_, e)| e.is_live(now))
            .collect();
        hits.sort_by_key(|(_, e)| e.seq);
        hits
    }

    fn purge_expired(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, e| e.is_live(now));
        before - self.entries.len()
    }
}

/// Expiring in-memory key-value store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, including expired ones not yet swept.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drops every expired entry and returns how many were removed.
    pub async fn sweep(&self) -> usize {
        self.inner.lock().await.purge_expired(Instant::now())
    }

    /// Spawns a task that sweeps every `interval` until the store is dropped.
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let store: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(store) = store.upgrade() else {
                    break;
                };
                let removed = store.sweep().await;
                if removed > 0 {
                    debug!(removed, "swept expired cache entries");
                }
            }
        })
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, OmnigateError> {
        let inner = self.inner.lock().await;
        Ok(inner.live(key, Instant::now()).map(|e| e.value.clone()))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), OmnigateError> {
        self.inner.lock().await.insert(key, value, ttl);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), OmnigateError> {
        self.inner.lock().await.entries.remove(key);
        Ok(())
    }

    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, String)>, OmnigateError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .scan(prefix, Instant::now())
            .into_iter()
            .map(|(k, e)| (k.clone(), e.value.clone()))
            .collect())
    }

    async fn set_guarded(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
        guard: Guard<'_>,
    ) -> Result<bool, OmnigateError> {
        let mut inner = self.inner.lock().await;
        let now = Instant::now();
        let blocked = match guard {
            Guard::KeyAbsent(other) => inner.live(other, now).is_some(),
            Guard::PrefixEmpty(prefix) => !inner.scan(prefix, now).is_empty(),
        };
        if blocked {
            return Ok(false);
        }
        inner.insert(key, value, ttl);
        Ok(true)
    }

    async fn delete_if(&self, key: &str, expected: &str) -> Result<bool, OmnigateError> {
        let mut inner = self.inner.lock().await;
        let matches = inner
            .live(key, Instant::now())
            .is_some_and(|e| e.value == expected);
        if matches {
            inner.entries.remove(key);
        }
        Ok(matches)
    }
}
