//! Authorization code grant handler.
//!
//! Redeems a single-use authorization code for an access token and a
//! refresh token. The code is consumed atomically before any further
//! validation, so a failed exchange still burns it: under concurrent replay
//! exactly one request can get as far as the binding checks.

use std::sync::Arc;

use tracing::debug;

use crate::AuthResult;
use crate::error::AuthError;
use crate::oauth::pkce::{PkceChallenge, PkceMethod, PkceVerifier};
use crate::token::service::TokenService;
use crate::types::{Client, CodeExchangeRequest, TokenResponse};

/// Handles `grant_type=authorization_code`.
pub struct AuthorizationCodeGrant {
    tokens: Arc<TokenService>,
}

impl AuthorizationCodeGrant {
    /// Creates a new handler.
    #[must_use]
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self { tokens }
    }

    /// Exchanges an authorization code for tokens.
    ///
    /// # Errors
    ///
    /// - `invalid_request` - public client without `code_verifier`
    /// - `invalid_grant` - absent/expired/consumed code, client or
    ///   redirect_uri mismatch, PKCE failure
    /// - `server_error` - store or signer failure
    pub async fn handle(
        &self,
        client: &Client,
        request: &CodeExchangeRequest,
    ) -> AuthResult<TokenResponse> {
        // Public clients must prove possession of the verifier before the
        // code is spent on them.
        if client.is_public() && request.code_verifier.is_none() {
            return Err(AuthError::invalid_request(
                "code_verifier is required for public clients",
            ));
        }

        // Atomic one-time consumption; first caller wins.
        let data = self
            .tokens
            .get_and_consume_code(&request.code)
            .await?
            .ok_or_else(|| {
                AuthError::invalid_grant("authorization code is invalid or expired")
            })?;

        // Binding checks: the code only works for the client and redirect
        // URI it was issued to.
        if data.client_id != client.client_id {
            return Err(AuthError::invalid_grant(
                "authorization code was issued to a different client",
            ));
        }

        if data.redirect_uri != request.redirect_uri {
            return Err(AuthError::invalid_grant(
                "redirect_uri does not match the authorization request",
            ));
        }

        // PKCE: verify whenever a challenge was bound at /authorize
        // (always, for public clients).
        if let Some(challenge) = &data.code_challenge {
            let method = data.code_challenge_method.unwrap_or(PkceMethod::Plain);
            self.verify_pkce(challenge, method, request.code_verifier.as_deref())?;
        }

        debug!(
            client_id = %client.client_id,
            user_id = %data.user_id,
            "authorization code redeemed"
        );

        let access_token =
            self.tokens
                .issue_access_token(&data.user_id, &data.scope, Some(&client.client_id))?;
        let refresh_token = self
            .tokens
            .issue_refresh_token(&data.user_id, &client.client_id, &data.scope)
            .await?;

        Ok(
            TokenResponse::new(access_token, self.tokens.access_token_ttl_secs(), data.scope)
                .with_refresh_token(refresh_token),
        )
    }

    fn verify_pkce(
        &self,
        challenge: &str,
        method: PkceMethod,
        verifier: Option<&str>,
    ) -> AuthResult<()> {
        let verifier = verifier
            .ok_or_else(|| AuthError::invalid_request("missing required parameter: code_verifier"))?;

        let verifier = PkceVerifier::new(verifier.to_string())
            .map_err(|e| AuthError::invalid_grant(format!("invalid code_verifier: {e}")))?;
        let challenge = PkceChallenge::parse(challenge.to_string(), method)
            .map_err(|e| AuthError::invalid_grant(format!("invalid stored challenge: {e}")))?;

        challenge
            .verify(method, &verifier)
            .map_err(|_| AuthError::invalid_grant("PKCE verification failed"))
    }
}

// =============================================================================
// Tests
// =============================================================================
