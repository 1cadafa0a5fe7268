//! In-memory user registry.

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use grantd_auth::{AuthResult, User, UserStore};

use crate::secret;

/// Concurrent in-memory user store with argon2-hashed passwords.
#[derive(Default)]
pub struct MemoryUserStore {
    users: DashMap<String, (User, String)>,
}

impl MemoryUserStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a user; the plaintext password is hashed and never kept.
    ///
    /// # Errors
    ///
    /// Returns `ServerError` if hashing fails.
    pub fn register(&self, user: User, password: &str) -> AuthResult<()> {
        let hash = secret::hash_secret(password)?;
        debug!(username = %user.username, "user registered");
        self.users.insert(user.username.clone(), (user, hash));
        Ok(())
    }

    /// Number of registered users.
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Returns `true` if no users are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_username(&self, username: &str) -> AuthResult<Option<User>> {
        Ok(self.users.get(username).map(|entry| entry.value().0.clone()))
    }

    async fn verify_password(&self, username: &str, password: &str) -> AuthResult<bool> {
        let Some(entry) = self.users.get(username) else {
            return Ok(false);
        };
        let hash = entry.value().1.clone();
        drop(entry);

        secret::verify_secret(password, &hash)
    }
}
