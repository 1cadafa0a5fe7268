//! Keyed expiring store trait.
//!
//! The one shared-state primitive in the system. Codes and refresh tokens
//! are single-use credentials, and their consumption must be a single atomic
//! store operation: under concurrent replay of the same key, exactly one
//! caller observes the value and every other caller observes nothing.

use std::time::Duration;

use async_trait::async_trait;

use crate::AuthResult;

/// Atomic put/get/delete-with-TTL storage (Redis-equivalent).
///
/// # Contract
///
/// - `put` upserts `value` under `key`, bounded by `ttl`. After the TTL
///   elapses the entry behaves exactly as if it never existed.
/// - `take` is an atomic get-and-delete (compare-and-delete, or an
///   equivalent atomic script). Two concurrent `take` calls on the same key
///   must yield exactly one `Some`.
/// - Unavailability and timeouts surface as `ServerError`; callers fail
///   closed and never retry a consumption into a duplicate grant.
#[async_trait]
pub trait KeyedExpiringStore: Send + Sync {
    /// Stores `value` under `key` with the given time-to-live.
    ///
    /// # Errors
    ///
    /// Returns `ServerError` if the store is unavailable.
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> AuthResult<()>;

    /// Returns the value under `key`, or `None` if absent or expired.
    ///
    /// # Errors
    ///
    /// Returns `ServerError` if the store is unavailable.
    async fn get(&self, key: &str) -> AuthResult<Option<String>>;

    /// Atomically removes and returns the value under `key`.
    ///
    /// Returns `None` if the key is absent, expired, or was already taken.
    /// This is the first-writer-wins primitive behind single-use codes and
    /// refresh-token rotation.
    ///
    /// # Errors
    ///
    /// Returns `ServerError` if the store is unavailable.
    async fn take(&self, key: &str) -> AuthResult<Option<String>>;

    /// Removes the value under `key`. Idempotent; deleting an absent key
    /// succeeds.
    ///
    /// # Errors
    ///
    /// Returns `ServerError` if the store is unavailable.
    async fn delete(&self, key: &str) -> AuthResult<()>;
}
