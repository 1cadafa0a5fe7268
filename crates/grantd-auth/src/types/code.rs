//! Authorization code payload.
//!
//! The opaque code handed to the client is a random key into the expiring
//! store; this is the value stored under it. Created on consent, destroyed on
//! first redemption or TTL expiry.

use serde::{Deserialize, Serialize};

use crate::oauth::pkce::PkceMethod;

/// Data bound to an authorization code.
///
/// Everything needed to validate the token request that redeems the code:
/// the client and redirect URI it was issued to, the granted scope, and the
/// PKCE challenge to check the verifier against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizationCodeData {
    /// Resource owner who granted the authorization.
    pub user_id: String,

    /// Client the code was issued to. The redeeming client must match
    /// exactly (blocks code injection across clients).
    pub client_id: String,

    /// Redirect URI used at `/authorize`. The token request must repeat it
    /// exactly.
    pub redirect_uri: String,

    /// Granted scopes (space-separated).
    pub scope: String,

    /// PKCE code challenge, if one was supplied at `/authorize`.
    /// Always present for public clients.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_challenge: Option<String>,

    /// PKCE challenge method for `code_challenge`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_challenge_method: Option<PkceMethod>,
}
