//! In-memory keyed expiring store.
//!
//! Entries carry their deadline and are reaped lazily on access. The atomic
//! `take` contract rides on `DashMap::remove`: exactly one of any number of
//! concurrent removals of the same key gets the entry back.

use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use time::OffsetDateTime;

use grantd_auth::{AuthResult, KeyedExpiringStore};

struct Entry {
    value: String,
    expires_at: OffsetDateTime,
}

impl Entry {
    fn is_expired(&self) -> bool {
        OffsetDateTime::now_utc() > self.expires_at
    }
}

/// Concurrent in-memory store with per-entry TTL.
#[derive(Default)]
pub struct MemoryExpiringStore {
    entries: DashMap<String, Entry>,
}

impl MemoryExpiringStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes every expired entry and returns how many were dropped.
    ///
    /// Expiry is otherwise lazy; long-running processes call this
    /// periodically to bound memory.
    pub fn purge_expired(&self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired());
        before - self.entries.len()
    }

    /// Number of live (possibly expired, not yet reaped) entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the store holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl KeyedExpiringStore for MemoryExpiringStore {
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> AuthResult<()> {
        self.entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: OffsetDateTime::now_utc() + ttl,
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> AuthResult<Option<String>> {
        // Reap on access so an expired entry can never be observed.
        if let Some(entry) = self.entries.get(key) {
            if entry.is_expired() {
                drop(entry);
                self.entries.remove(key);
                return Ok(None);
            }
            return Ok(Some(entry.value.clone()));
        }
        Ok(None)
    }

    async fn take(&self, key: &str) -> AuthResult<Option<String>> {
        // DashMap::remove is atomic: one winner, everyone else sees None.
        // An expired entry is removed but not returned.
        Ok(self
            .entries
            .remove(key)
            .filter(|(_, entry)| !entry.is_expired())
            .map(|(_, entry)| entry.value))
    }

    async fn delete(&self, key: &str) -> AuthResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}
