//! Token service.
//!
//! Issues signed access tokens, and manages opaque authorization codes and
//! refresh tokens through the [`KeyedExpiringStore`]. All single-use
//! semantics funnel through the store's atomic `take`: under concurrent
//! redemption of the same code or token, exactly one caller wins.
//!
//! Store failures surface as `ServerError` and fail closed; a token is never
//! returned when the underlying state transition cannot be proven to have
//! succeeded.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use time::{Duration, OffsetDateTime};

use crate::AuthResult;
use crate::error::AuthError;
use crate::storage::KeyedExpiringStore;
use crate::token::jwt::{AccessTokenClaims, JwtService};
use crate::types::code::AuthorizationCodeData;
use crate::types::refresh_token::RefreshTokenRecord;

/// Store key namespace for authorization codes.
const CODE_PREFIX: &str = "oauth2:code:";

/// Store key namespace for refresh tokens.
const REFRESH_PREFIX: &str = "oauth2:refresh:";

/// Configuration for the token service.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Authorization code lifetime. Default: 5 minutes.
    pub code_ttl: Duration,

    /// Access token lifetime. Default: 15 minutes.
    pub access_token_ttl: Duration,

    /// Refresh token lifetime. Default: 7 days.
    pub refresh_token_ttl: Duration,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            code_ttl: Duration::minutes(5),
            access_token_ttl: Duration::minutes(15),
            refresh_token_ttl: Duration::days(7),
        }
    }
}

impl TokenConfig {
    /// Sets the authorization code lifetime.
    #[must_use]
    pub fn with_code_ttl(mut self, ttl: Duration) -> Self {
        self.code_ttl = ttl;
        self
    }

    /// Sets the access token lifetime.
    #[must_use]
    pub fn with_access_token_ttl(mut self, ttl: Duration) -> Self {
        self.access_token_ttl = ttl;
        self
    }

    /// Sets the refresh token lifetime.
    #[must_use]
    pub fn with_refresh_token_ttl(mut self, ttl: Duration) -> Self {
        self.refresh_token_ttl = ttl;
        self
    }
}

/// Issues and manages tokens and authorization codes.
///
/// Stateless between requests; all shared state lives in the store, so the
/// service scales horizontally with no coordination beyond it.
pub struct TokenService {
    /// JWT signer for access tokens.
    jwt: Arc<JwtService>,

    /// Keyed expiring store backing codes and refresh tokens.
    store: Arc<dyn KeyedExpiringStore>,

    /// Service configuration.
    config: TokenConfig,
}

impl TokenService {
    /// Creates a new token service.
    #[must_use]
    pub fn new(jwt: Arc<JwtService>, store: Arc<dyn KeyedExpiringStore>, config: TokenConfig) -> Self {
        Self { jwt, store, config }
    }

    /// Returns the service configuration.
    #[must_use]
    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    /// Access token lifetime in whole seconds, for `expires_in`.
    #[must_use]
    pub fn access_token_ttl_secs(&self) -> u64 {
        self.config.access_token_ttl.whole_seconds().max(0) as u64
    }

    /// Generates a fresh opaque credential: 32 random bytes, base64url.
    fn opaque_token() -> String {
        let mut bytes = [0u8; 32];
        rand::Rng::fill(&mut rand::thread_rng(), &mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }

    fn refresh_key(token: &str) -> String {
        format!("{REFRESH_PREFIX}{}", RefreshTokenRecord::hash_token(token))
    }

    /// Stores authorization data under a fresh random code.
    ///
    /// The code carries 256 bits of entropy and is bounded by the configured
    /// code TTL.
    ///
    /// # Errors
    ///
    /// Returns `ServerError` if the store is unavailable.
    pub async fn generate_code(&self, data: &AuthorizationCodeData) -> AuthResult<String> {
        let code = Self::opaque_token();
        let value = serde_json::to_string(data)
            .map_err(|e| AuthError::server_error(format!("failed to encode code data: {e}")))?;

        self.store
            .put(
                &format!("{CODE_PREFIX}{code}"),
                &value,
                self.config.code_ttl.unsigned_abs(),
            )
            .await?;

        Ok(code)
    }

    /// Atomically consumes an authorization code.
    ///
    /// Returns `None` if the code is absent, expired, or already consumed.
    /// Two concurrent calls on the same code yield exactly one `Some`.
    ///
    /// # Errors
    ///
    /// Returns `ServerError` if the store is unavailable or the stored
    /// payload is corrupt.
    pub async fn get_and_consume_code(
        &self,
        code: &str,
    ) -> AuthResult<Option<AuthorizationCodeData>> {
        let Some(value) = self.store.take(&format!("{CODE_PREFIX}{code}")).await? else {
            return Ok(None);
        };

        let data = serde_json::from_str(&value)
            .map_err(|e| AuthError::server_error(format!("corrupt code data in store: {e}")))?;
        Ok(Some(data))
    }

    /// Builds and signs an access token.
    ///
    /// Claims are `{sub, scope, client_id, iat: now, exp: now + access_ttl}`.
    ///
    /// # Errors
    ///
    /// Returns `ServerError` if signing fails.
    pub fn issue_access_token(
        &self,
        subject: &str,
        scope: &str,
        client_id: Option<&str>,
    ) -> AuthResult<String> {
        let claims = AccessTokenClaims::new(
            subject,
            scope,
            client_id,
            OffsetDateTime::now_utc(),
            self.config.access_token_ttl,
        );

        self.jwt
            .encode(&claims)
            .map_err(|e| AuthError::server_error(format!("failed to sign access token: {e}")))
    }

    /// Validates an access token and returns its claims.
    ///
    /// # Errors
    ///
    /// Returns `InvalidToken` on bad signature, malformed payload, or
    /// expiry.
    pub fn validate_access_token(&self, token: &str) -> AuthResult<AccessTokenClaims> {
        self.jwt
            .decode::<AccessTokenClaims>(token)
            .map(|data| data.claims)
            .map_err(|e| AuthError::invalid_token(e.to_string()))
    }

    /// Issues an opaque refresh token bound to a user, client, and scope.
    ///
    /// The store key is a SHA-256 hash of the token; the TTL is the
    /// configured refresh lifetime.
    ///
    /// # Errors
    ///
    /// Returns `ServerError` if the store is unavailable.
    pub async fn issue_refresh_token(
        &self,
        user_id: &str,
        client_id: &str,
        scope: &str,
    ) -> AuthResult<String> {
        let token = Self::opaque_token();
        let now = OffsetDateTime::now_utc();

        let record = RefreshTokenRecord {
            user_id: user_id.to_string(),
            client_id: client_id.to_string(),
            scope: scope.to_string(),
            created_at: now,
            expires_at: now + self.config.refresh_token_ttl,
        };
        let value = serde_json::to_string(&record).map_err(|e| {
            AuthError::server_error(format!("failed to encode refresh token record: {e}"))
        })?;

        self.store
            .put(
                &Self::refresh_key(&token),
                &value,
                self.config.refresh_token_ttl.unsigned_abs(),
            )
            .await?;

        Ok(token)
    }

    /// Atomically redeems a refresh token.
    ///
    /// The token is consumed (one-shot) before the record is returned;
    /// callers issue a rotated successor. A missing, expired, or revoked
    /// token fails with `InvalidGrant`.
    ///
    /// # Errors
    ///
    /// - `InvalidGrant` when the token is not redeemable
    /// - `ServerError` if the store is unavailable or the payload is corrupt
    pub async fn redeem_refresh_token(&self, token: &str) -> AuthResult<RefreshTokenRecord> {
        let Some(value) = self.store.take(&Self::refresh_key(token)).await? else {
            return Err(AuthError::invalid_grant(
                "refresh token is invalid, expired, or revoked",
            ));
        };

        let record: RefreshTokenRecord = serde_json::from_str(&value).map_err(|e| {
            AuthError::server_error(format!("corrupt refresh token record in store: {e}"))
        })?;

        // Store TTL already bounds the lifetime; this is the server-side
        // double check for backends with coarse expiry.
        if record.is_expired() {
            return Err(AuthError::invalid_grant("refresh token has expired"));
        }

        Ok(record)
    }

    /// Revokes a refresh token. Idempotent: revoking an unknown or already
    /// revoked token succeeds.
    ///
    /// # Errors
    ///
    /// Returns `ServerError` if the store is unavailable.
    pub async fn revoke_refresh_token(&self, token: &str) -> AuthResult<()> {
        self.store.delete(&Self::refresh_key(token)).await
    }
}

// ============================================================================
// Tests
// ============================================================================
