//! OAuth2 service facade.
//!
//! Entry point for both endpoints. For `/token` it authenticates the calling
//! client exactly once, then routes by grant type to the matching handler;
//! for `/authorize` it delegates to the [`AuthorizeValidator`].

use std::sync::Arc;

use tracing::{info, warn};

use crate::AuthResult;
use crate::error::AuthError;
use crate::oauth::authorize::{AuthorizeRequest, AuthorizeValidator, ConsentForm, ValidatedAuthorize};
use crate::oauth::client_auth::{ClientCredentials, authenticate_client};
use crate::oauth::grants::{AuthorizationCodeGrant, ClientCredentialsGrant, RefreshTokenGrant};
use crate::storage::{ClientStore, UserStore};
use crate::token::service::TokenService;
use crate::types::{TokenRequest, TokenResponse};

/// Dispatcher over the grant handlers and the authorize flow.
pub struct OAuth2Service {
    clients: Arc<dyn ClientStore>,
    authorize: AuthorizeValidator,
    authorization_code: AuthorizationCodeGrant,
    client_credentials: ClientCredentialsGrant,
    refresh_token: RefreshTokenGrant,
}

impl OAuth2Service {
    /// Creates a new service over the given capabilities.
    #[must_use]
    pub fn new(
        clients: Arc<dyn ClientStore>,
        users: Arc<dyn UserStore>,
        tokens: Arc<TokenService>,
    ) -> Self {
        Self {
            authorize: AuthorizeValidator::new(clients.clone(), users, tokens.clone()),
            authorization_code: AuthorizationCodeGrant::new(tokens.clone()),
            client_credentials: ClientCredentialsGrant::new(tokens.clone()),
            refresh_token: RefreshTokenGrant::new(tokens),
            clients,
        }
    }

    /// Processes a token request.
    ///
    /// The client is authenticated once; the request then dispatches on its
    /// grant type. Absent credentials fail with `invalid_request` before any
    /// lookup.
    ///
    /// # Errors
    ///
    /// Propagates the typed error of the failing step; see the grant
    /// handlers for the per-grant taxonomy.
    pub async fn token(
        &self,
        credentials: Option<ClientCredentials>,
        request: TokenRequest,
    ) -> AuthResult<TokenResponse> {
        let credentials = credentials
            .ok_or_else(|| AuthError::invalid_request("client authentication required"))?;

        let client = match authenticate_client(&credentials, self.clients.as_ref()).await {
            Ok(client) => client,
            Err(e) => {
                warn!(client_id = %credentials.client_id, error = %e, "client authentication failed");
                return Err(e);
            }
        };

        let result = match &request {
            TokenRequest::AuthorizationCode(req) => {
                self.authorization_code.handle(&client, req).await
            }
            TokenRequest::ClientCredentials(req) => {
                self.client_credentials.handle(&client, req).await
            }
            TokenRequest::RefreshToken(req) => self.refresh_token.handle(&client, req).await,
        };

        match &result {
            Ok(_) => info!(
                client_id = %client.client_id,
                grant_type = %request.grant_type(),
                "token issued"
            ),
            Err(e) => warn!(
                client_id = %client.client_id,
                grant_type = %request.grant_type(),
                error = %e,
                "token request failed"
            ),
        }

        result
    }

    /// Validates a `GET /authorize` request.
    ///
    /// # Errors
    ///
    /// See [`AuthorizeValidator::validate`].
    pub async fn authorize(&self, request: &AuthorizeRequest) -> AuthResult<ValidatedAuthorize> {
        self.authorize.validate(request).await
    }

    /// Processes a consent submission; returns the redirect URL for the
    /// user agent.
    ///
    /// # Errors
    ///
    /// See [`AuthorizeValidator::submit_consent`].
    pub async fn submit_consent(&self, form: &ConsentForm) -> AuthResult<url::Url> {
        self.authorize.submit_consent(form).await
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::RwLock;

    use async_trait::async_trait;

    use crate::oauth::testing::make_token_service;
    use crate::storage::User;
    use crate::token::service::TokenConfig;
    use crate::types::{Client, ClientType, TokenRequestForm};

    struct MockClientStore {
        clients: RwLock<HashMap<String, (Client, Option<String>)>>,
    }

    #[async_trait]
    impl ClientStore for MockClientStore {
        async fn find_by_client_id(&self, client_id: &str) -> AuthResult<Option<Client>> {
            Ok(self
                .clients
                .read()
                .unwrap()
                .get(client_id)
                .map(|(c, _)| c.clone()))
        }

        async fn verify_secret(&self, client_id: &str, secret: &str) -> AuthResult<bool> {
            Ok(self
                .clients
                .read()
                .unwrap()
                .get(client_id)
                .and_then(|(_, s)| s.as_deref())
                .is_some_and(|s| s == secret))
        }
    }

    struct MockUserStore;

    #[async_trait]
    impl UserStore for MockUserStore {
        async fn find_by_username(&self, username: &str) -> AuthResult<Option<User>> {
            Ok((username == "alice").then(|| User {
                id: "1".to_string(),
                username: "alice".to_string(),
                full_name: None,
                email: None,
                active: true,
            }))
        }

        async fn verify_password(&self, username: &str, password: &str) -> AuthResult<bool> {
            Ok(username == "alice" && password == "123")
        }
    }

    fn make_service() -> OAuth2Service {
        let mut clients = HashMap::new();
        clients.insert(
            "client-credentials-client".to_string(),
            (
                Client {
                    client_id: "client-credentials-client".to_string(),
                    secret_hash: Some("hashed".to_string()),
                    redirect_uris: vec![],
                    allowed_scopes: vec![
                        "get_admin_info".to_string(),
                        "get_user_info".to_string(),
                        "get_client_info".to_string(),
                    ],
                    client_type: ClientType::Confidential,
                },
                Some("client-credentials-secret-456".to_string()),
            ),
        );

        OAuth2Service::new(
            Arc::new(MockClientStore {
                clients: RwLock::new(clients),
            }),
            Arc::new(MockUserStore),
            make_token_service(TokenConfig::default()),
        )
    }

    fn credentials(secret: &str) -> Option<ClientCredentials> {
        Some(ClientCredentials {
            client_id: "client-credentials-client".to_string(),
            client_secret: Some(secret.to_string()),
        })
    }

    #[tokio::test]
    async fn test_token_requires_credentials() {
        let service = make_service();
        let request = TokenRequest::from_form(&TokenRequestForm {
            grant_type: "client_credentials".to_string(),
            ..TokenRequestForm::default()
        })
        .unwrap();

        let result = service.token(None, request).await;
        assert!(matches!(result, Err(AuthError::InvalidRequest { .. })));
    }

    #[tokio::test]
    async fn test_token_authenticates_and_dispatches() {
        let service = make_service();
        let request = TokenRequest::from_form(&TokenRequestForm {
            grant_type: "client_credentials".to_string(),
            scope: Some("get_client_info".to_string()),
            ..TokenRequestForm::default()
        })
        .unwrap();

        let response = service
            .token(credentials("client-credentials-secret-456"), request)
            .await
            .unwrap();
        assert_eq!(response.scope, "get_client_info");
        assert!(response.refresh_token.is_none());
    }

    #[tokio::test]
    async fn test_token_rejects_bad_secret() {
        let service = make_service();
        let request = TokenRequest::from_form(&TokenRequestForm {
            grant_type: "client_credentials".to_string(),
            ..TokenRequestForm::default()
        })
        .unwrap();

        let result = service.token(credentials("wrong"), request).await;
        assert!(matches!(result, Err(AuthError::UnauthorizedClient { .. })));
    }

    #[test]
    fn test_unknown_grant_type_rejected_at_parse() {
        let form = TokenRequestForm {
            grant_type: "device_code".to_string(),
            ..TokenRequestForm::default()
        };
        let err = TokenRequest::from_form(&form).unwrap_err();
        assert!(matches!(err, AuthError::UnsupportedGrantType { .. }));
    }
}
