//! Client store trait.

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::Client;

/// Storage for OAuth client registrations.
///
/// Secret verification goes through the store so hashing mechanics stay in
/// the backend; the core only ever sees the boolean outcome.
#[async_trait]
pub trait ClientStore: Send + Sync {
    /// Finds a client registration by its client ID.
    ///
    /// # Errors
    ///
    /// Returns `ServerError` if the backend is unavailable.
    async fn find_by_client_id(&self, client_id: &str) -> AuthResult<Option<Client>>;

    /// Verifies a client secret against the stored hash.
    ///
    /// Returns `false` for unknown clients, public clients, and mismatched
    /// secrets alike.
    ///
    /// # Errors
    ///
    /// Returns `ServerError` if the backend is unavailable.
    async fn verify_secret(&self, client_id: &str, secret: &str) -> AuthResult<bool>;
}
