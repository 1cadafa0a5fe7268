//! In-memory client registry.

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use grantd_auth::types::{Client, ClientType};
use grantd_auth::{AuthError, AuthResult, ClientStore};

use crate::secret;

/// Concurrent in-memory client store.
///
/// Registrations are validated on insert; confidential client secrets are
/// argon2-hashed before they are kept.
#[derive(Default)]
pub struct MemoryClientStore {
    clients: DashMap<String, Client>,
}

impl MemoryClientStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a client. For confidential clients the plaintext secret is
    /// hashed here and never kept.
    ///
    /// # Errors
    ///
    /// - `ServerError` when the registration is inconsistent (for example a
    ///   confidential client without a secret) or hashing fails
    pub fn register(&self, mut client: Client, secret: Option<&str>) -> AuthResult<()> {
        client.secret_hash = match (client.client_type, secret) {
            (ClientType::Confidential, Some(secret)) => Some(secret::hash_secret(secret)?),
            (ClientType::Confidential, None) => {
                return Err(AuthError::server_error(format!(
                    "confidential client '{}' registered without a secret",
                    client.client_id
                )));
            }
            (ClientType::Public, Some(_)) => {
                return Err(AuthError::server_error(format!(
                    "public client '{}' registered with a secret",
                    client.client_id
                )));
            }
            (ClientType::Public, None) => None,
        };

        client
            .validate()
            .map_err(|e| AuthError::server_error(format!("invalid client registration: {e}")))?;

        debug!(client_id = %client.client_id, "client registered");
        self.clients.insert(client.client_id.clone(), client);
        Ok(())
    }

    /// Number of registered clients.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Returns `true` if no clients are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

#[async_trait]
impl ClientStore for MemoryClientStore {
    async fn find_by_client_id(&self, client_id: &str) -> AuthResult<Option<Client>> {
        Ok(self.clients.get(client_id).map(|entry| entry.value().clone()))
    }

    async fn verify_secret(&self, client_id: &str, secret: &str) -> AuthResult<bool> {
        let Some(client) = self.clients.get(client_id) else {
            return Ok(false);
        };
        let Some(hash) = client.secret_hash.clone() else {
            return Ok(false);
        };
        drop(client);

        secret::verify_secret(secret, &hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn confidential() -> Client {
        Client {
            client_id: "auth-code-client".to_string(),
            secret_hash: None,
            redirect_uris: vec!["http://localhost:8001/callback".to_string()],
            allowed_scopes: vec!["get_user_info".to_string()],
            client_type: ClientType::Confidential,
        }
    }

    fn public() -> Client {
        Client {
            client_id: "pkce-public-client".to_string(),
            secret_hash: None,
            redirect_uris: vec!["http://localhost:8002/callback".to_string()],
            allowed_scopes: vec!["get_user_info".to_string()],
            client_type: ClientType::Public,
        }
    }

    #[tokio::test]
    async fn test_register_and_find() {
        let store = MemoryClientStore::new();
        store
            .register(confidential(), Some("auth-code-secret-123"))
            .unwrap();

        let found = store.find_by_client_id("auth-code-client").await.unwrap();
        let found = found.unwrap();
        assert_eq!(found.client_id, "auth-code-client");
        // The stored hash is not the plaintext
        assert_ne!(found.secret_hash.as_deref(), Some("auth-code-secret-123"));

        assert!(store.find_by_client_id("ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_verify_secret() {
        let store = MemoryClientStore::new();
        store
            .register(confidential(), Some("auth-code-secret-123"))
            .unwrap();

        assert!(
            store
                .verify_secret("auth-code-client", "auth-code-secret-123")
                .await
                .unwrap()
        );
        assert!(
            !store
                .verify_secret("auth-code-client", "wrong")
                .await
                .unwrap()
        );
        assert!(!store.verify_secret("ghost", "anything").await.unwrap());
    }

    #[tokio::test]
    async fn test_public_client_never_verifies() {
        let store = MemoryClientStore::new();
        store.register(public(), None).unwrap();

        assert!(
            !store
                .verify_secret("pkce-public-client", "anything")
                .await
                .unwrap()
        );
    }

    #[test]
    fn test_register_rejects_inconsistent_registrations() {
        let store = MemoryClientStore::new();

        assert!(store.register(confidential(), None).is_err());
        assert!(store.register(public(), Some("unexpected")).is_err());
    }
}
