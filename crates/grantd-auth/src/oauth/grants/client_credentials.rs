//! Client credentials grant handler.
//!
//! Machine-to-machine tokens: the authenticated client is itself the
//! subject. No refresh token is issued since there is no user context to
//! refresh on behalf of.

use std::sync::Arc;

use tracing::debug;

use crate::AuthResult;
use crate::error::AuthError;
use crate::token::service::TokenService;
use crate::types::{Client, ClientCredentialsRequest, TokenResponse};

/// Handles `grant_type=client_credentials`.
pub struct ClientCredentialsGrant {
    tokens: Arc<TokenService>,
}

impl ClientCredentialsGrant {
    /// Creates a new handler.
    #[must_use]
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self { tokens }
    }

    /// Issues an access token for the client itself.
    ///
    /// # Errors
    ///
    /// - `unauthorized_client` - public clients cannot use this grant
    /// - `invalid_scope` - requested scope exceeds the client's allowed set
    /// - `server_error` - signer failure
    pub async fn handle(
        &self,
        client: &Client,
        request: &ClientCredentialsRequest,
    ) -> AuthResult<TokenResponse> {
        if client.is_public() {
            return Err(AuthError::unauthorized_client(
                "public clients cannot use the client_credentials grant",
            ));
        }

        // Empty request defaults to the client's full allowed set.
        let scope = match request.scope.as_deref().filter(|s| !s.trim().is_empty()) {
            None => client.default_scope(),
            Some(requested) => {
                if let Err(bad) = client.check_scope(requested) {
                    return Err(AuthError::invalid_scope(format!(
                        "scope '{bad}' is not allowed for this client"
                    )));
                }
                requested.to_string()
            }
        };

        debug!(client_id = %client.client_id, "client credentials grant");

        let access_token =
            self.tokens
                .issue_access_token(&client.client_id, &scope, Some(&client.client_id))?;

        // No refresh token: there is no resource owner behind this grant.
        Ok(TokenResponse::new(
            access_token,
            self.tokens.access_token_ttl_secs(),
            scope,
        ))
    }
}

// =============================================================================
// Tests
// =============================================================================
