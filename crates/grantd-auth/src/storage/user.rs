//! User store trait.
//!
//! Resource-owner authentication for the consent step of the authorization
//! code flow. Password hashing mechanics live behind the trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::AuthResult;

/// A resource owner known to the authorization server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier; ends up as the `sub` claim of access tokens.
    pub id: String,

    /// Username used on the consent form.
    pub username: String,

    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,

    /// Email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Inactive users cannot authorize clients.
    pub active: bool,
}

/// Storage and authentication for resource owners.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Finds a user by username.
    ///
    /// # Errors
    ///
    /// Returns `ServerError` if the backend is unavailable.
    async fn find_by_username(&self, username: &str) -> AuthResult<Option<User>>;

    /// Verifies a password against the stored hash.
    ///
    /// Returns `false` for unknown users and mismatched passwords alike.
    ///
    /// # Errors
    ///
    /// Returns `ServerError` if the backend is unavailable.
    async fn verify_password(&self, username: &str, password: &str) -> AuthResult<bool>;
}
