//! Refresh token record.
//!
//! Refresh tokens are opaque 256-bit random strings. The store key is a
//! SHA-256 hash of the token, never the plaintext; this record is the value
//! stored under it.
//!
//! Rotation and revocation both remove the record from the store: a revoked
//! token becomes indistinguishable from an expired or never-issued one, and
//! every dead token redeems as `invalid_grant`.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Refresh token state persisted in the expiring store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenRecord {
    /// Resource owner the grant belongs to.
    pub user_id: String,

    /// Client the token was issued to. A different authenticated client
    /// presenting this token is rejected (and the token burns).
    pub client_id: String,

    /// Granted scopes (space-separated). Refreshed tokens may narrow this,
    /// never widen it.
    pub scope: String,

    /// When this token was issued.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// When this token expires. Enforced by the store TTL; kept in the
    /// record as a server-side double check.
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

impl RefreshTokenRecord {
    /// Returns `true` if this token has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        OffsetDateTime::now_utc() > self.expires_at
    }

    /// Hash a token value with SHA-256 for use as the store key.
    #[must_use]
    pub fn hash_token(token: &str) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Generate a cryptographically secure random token.
    ///
    /// 32 random bytes encoded as base64url without padding (43 characters,
    /// 256 bits of entropy).
    #[must_use]
    pub fn generate_token() -> String {
        let mut bytes = [0u8; 32];
        rand::Rng::fill(&mut rand::thread_rng(), &mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }
}
