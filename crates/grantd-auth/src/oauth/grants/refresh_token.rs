//! Refresh token grant handler.
//!
//! Redeems a refresh token for a new access token and a rotated refresh
//! token. Redemption consumes the presented token first; a token presented
//! by the wrong client still burns, which limits the replay window of a
//! stolen token.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::AuthResult;
use crate::error::AuthError;
use crate::token::service::TokenService;
use crate::types::{Client, RefreshRequest, TokenResponse};

/// Handles `grant_type=refresh_token`.
pub struct RefreshTokenGrant {
    tokens: Arc<TokenService>,
}

impl RefreshTokenGrant {
    /// Creates a new handler.
    #[must_use]
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self { tokens }
    }

    /// Rotates a refresh token and issues a new access token.
    ///
    /// # Errors
    ///
    /// - `invalid_grant` - dead token or cross-client use
    /// - `invalid_scope` - requested scope widens the original grant
    /// - `server_error` - store or signer failure
    pub async fn handle(
        &self,
        client: &Client,
        request: &RefreshRequest,
    ) -> AuthResult<TokenResponse> {
        // Consume first: one-shot semantics hold even when the binding
        // check below fails.
        let record = self.tokens.redeem_refresh_token(&request.refresh_token).await?;

        if record.client_id != client.client_id {
            return Err(AuthError::invalid_grant(
                "refresh token was issued to a different client",
            ));
        }

        // Scope may narrow, never widen.
        let scope = match request.scope.as_deref().filter(|s| !s.trim().is_empty()) {
            None => record.scope.clone(),
            Some(requested) => {
                let original: HashSet<&str> = record.scope.split_whitespace().collect();
                let narrowed: HashSet<&str> = requested.split_whitespace().collect();
                if !narrowed.is_subset(&original) {
                    return Err(AuthError::invalid_scope(
                        "requested scope exceeds the original grant",
                    ));
                }
                requested.to_string()
            }
        };

        debug!(
            client_id = %client.client_id,
            user_id = %record.user_id,
            "refresh token rotated"
        );

        let access_token =
            self.tokens
                .issue_access_token(&record.user_id, &scope, Some(&client.client_id))?;

        // Rotation: the consumed predecessor is already gone; issue the
        // successor bound to the (possibly narrowed) scope.
        let new_refresh_token = self
            .tokens
            .issue_refresh_token(&record.user_id, &client.client_id, &scope)
            .await?;

        Ok(
            TokenResponse::new(access_token, self.tokens.access_token_ttl_secs(), scope)
                .with_refresh_token(new_refresh_token),
        )
    }
}

// =============================================================================
// Tests
// =============================================================================
