//! Client authentication for the token endpoint.
//!
//! Credentials are resolved once per request: an HTTP Basic `Authorization`
//! header is preferred, body fields (`client_id`/`client_secret`) are the
//! fallback. Authentication itself happens against the [`ClientStore`]:
//! confidential clients must present the correct secret, public clients must
//! present none.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::AuthResult;
use crate::error::AuthError;
use crate::storage::ClientStore;
use crate::types::{Client, TokenRequestForm};

/// Client credentials extracted from a token request.
#[derive(Debug, Clone)]
pub struct ClientCredentials {
    /// The client identifier.
    pub client_id: String,

    /// The client secret, when one was presented.
    pub client_secret: Option<String>,
}

impl ClientCredentials {
    /// Resolves client credentials from the request.
    ///
    /// The Basic Auth header wins over body fields when both are present.
    /// Returns `None` when neither carries a client ID.
    #[must_use]
    pub fn resolve(
        basic: Option<(String, String)>,
        form: &TokenRequestForm,
    ) -> Option<Self> {
        if let Some((client_id, client_secret)) = basic {
            return Some(Self {
                client_id,
                client_secret: Some(client_secret),
            });
        }

        form.client_id.as_ref().map(|client_id| Self {
            client_id: client_id.clone(),
            client_secret: form.client_secret.clone(),
        })
    }
}

/// Parses an HTTP Basic `Authorization` header value.
///
/// Returns `Some((client_id, client_secret))` for a well-formed
/// `Basic <base64(id:secret)>` value, `None` otherwise. The secret may
/// contain colons; the split happens on the first one.
#[must_use]
pub fn parse_basic_auth(header_value: &str) -> Option<(String, String)> {
    let encoded = header_value.trim().strip_prefix("Basic ")?;
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let credentials = String::from_utf8(decoded).ok()?;

    let (client_id, client_secret) = credentials.split_once(':')?;
    Some((client_id.to_string(), client_secret.to_string()))
}

/// Authenticates a client against the store.
///
/// # Errors
///
/// Returns `UnauthorizedClient` if:
/// - the client is unknown
/// - a confidential client presented no secret or the wrong one
/// - a public client presented a secret
pub async fn authenticate_client(
    credentials: &ClientCredentials,
    clients: &dyn ClientStore,
) -> AuthResult<Client> {
    let client = clients
        .find_by_client_id(&credentials.client_id)
        .await?
        .ok_or_else(|| AuthError::unauthorized_client("unknown client"))?;

    match (client.is_public(), credentials.client_secret.as_deref()) {
        (false, Some(secret)) => {
            if !clients.verify_secret(&credentials.client_id, secret).await? {
                return Err(AuthError::unauthorized_client("invalid client secret"));
            }
        }
        (false, None) => {
            return Err(AuthError::unauthorized_client(
                "confidential clients must authenticate with a client secret",
            ));
        }
        (true, Some(_)) => {
            return Err(AuthError::unauthorized_client(
                "public clients must not send a client secret",
            ));
        }
        (true, None) => {}
    }

    Ok(client)
}

// =============================================================================
// Tests
// =============================================================================
