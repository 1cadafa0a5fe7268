//! OAuth 2.0 client registration types.
//!
//! A [`Client`] is an immutable registration record resolved through the
//! [`ClientStore`](crate::storage::ClientStore) capability. The secret is
//! stored hashed; verification happens behind the store trait so hashing
//! mechanics stay out of the core.

use serde::{Deserialize, Serialize};

// =============================================================================
// Grant Type
// =============================================================================

/// OAuth 2.0 grant types supported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
    /// Authorization Code flow (with PKCE for public clients).
    AuthorizationCode,
    /// Client Credentials flow (confidential clients only).
    ClientCredentials,
    /// Refresh Token flow.
    RefreshToken,
}

impl GrantType {
    /// Returns the OAuth 2.0 `grant_type` parameter value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthorizationCode => "authorization_code",
            Self::ClientCredentials => "client_credentials",
            Self::RefreshToken => "refresh_token",
        }
    }
}

impl std::fmt::Display for GrantType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Client Type
// =============================================================================

/// Whether a client can securely hold a secret.
///
/// Confidential clients (server-side apps) authenticate with a secret.
/// Public clients (browser/mobile apps) cannot keep one, so PKCE is
/// mandatory for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientType {
    /// Server-side application that can hold a secret.
    Confidential,
    /// Browser or mobile application; PKCE required.
    Public,
}

// =============================================================================
// Client
// =============================================================================

/// An OAuth 2.0 client registration.
///
/// Immutable once registered; lifecycle is owned by the
/// [`ClientStore`](crate::storage::ClientStore) backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    /// Unique client identifier used in OAuth flows.
    pub client_id: String,

    /// Hashed client secret (`None` for public clients).
    /// The plaintext secret is never stored; verification goes through
    /// `ClientStore::verify_secret`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_hash: Option<String>,

    /// Allowed redirect URIs for the authorization code flow.
    /// Matching is exact string equality, never prefix or substring.
    #[serde(default)]
    pub redirect_uris: Vec<String>,

    /// Scopes this client is allowed to request.
    #[serde(default)]
    pub allowed_scopes: Vec<String>,

    /// Whether this client is confidential or public.
    pub client_type: ClientType,
}

impl Client {
    /// Returns `true` if this is a public client.
    #[must_use]
    pub fn is_public(&self) -> bool {
        self.client_type == ClientType::Public
    }

    /// Checks if the given redirect URI is registered for this client.
    ///
    /// Comparison is exact string equality. `https://a/cb` does not match
    /// `https://a/cb/` or `https://a/cb?x=1` (open-redirect prevention).
    #[must_use]
    pub fn is_redirect_uri_allowed(&self, uri: &str) -> bool {
        self.redirect_uris.iter().any(|allowed| allowed == uri)
    }

    /// Checks if a single scope token is allowed for this client.
    #[must_use]
    pub fn is_scope_allowed(&self, scope: &str) -> bool {
        self.allowed_scopes.iter().any(|allowed| allowed == scope)
    }

    /// Checks that every token of a space-separated scope string is allowed.
    ///
    /// # Errors
    ///
    /// Returns the first scope token that is not allowed.
    pub fn check_scope<'a>(&self, scope: &'a str) -> Result<(), &'a str> {
        for s in scope.split_whitespace() {
            if !self.is_scope_allowed(s) {
                return Err(s);
            }
        }
        Ok(())
    }

    /// Returns the client's full allowed scope set as a space-separated
    /// string, used when a request omits `scope`.
    #[must_use]
    pub fn default_scope(&self) -> String {
        self.allowed_scopes.join(" ")
    }

    /// Validates the client registration.
    ///
    /// # Errors
    ///
    /// Returns an error if the registration is internally inconsistent.
    pub fn validate(&self) -> Result<(), ClientValidationError> {
        if self.client_id.is_empty() {
            return Err(ClientValidationError::EmptyClientId);
        }

        match self.client_type {
            ClientType::Confidential if self.secret_hash.is_none() => {
                Err(ClientValidationError::MissingSecret)
            }
            ClientType::Public if self.secret_hash.is_some() => {
                Err(ClientValidationError::PublicClientSecret)
            }
            _ => Ok(()),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Errors that can occur during client registration validation.
#[derive(Debug, thiserror::Error)]
pub enum ClientValidationError {
    /// Client ID cannot be empty.
    #[error("Client ID cannot be empty")]
    EmptyClientId,

    /// Confidential clients require a hashed secret.
    #[error("Confidential clients require a client secret")]
    MissingSecret,

    /// Public clients must not carry a secret.
    #[error("Public clients must not have a client secret")]
    PublicClientSecret,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn make_confidential_client() -> Client {
        Client {
            client_id: "auth-code-client".to_string(),
            secret_hash: Some("$argon2id$stub".to_string()),
            redirect_uris: vec![
                "http://localhost:8001/callback".to_string(),
                "http://127.0.0.1:8001/callback".to_string(),
            ],
            allowed_scopes: vec![
                "get_admin_info".to_string(),
                "get_user_info".to_string(),
                "get_client_info".to_string(),
            ],
            client_type: ClientType::Confidential,
        }
    }

    fn make_public_client() -> Client {
        Client {
            client_id: "pkce-public-client".to_string(),
            secret_hash: None,
            redirect_uris: vec!["http://localhost:8002/callback".to_string()],
            allowed_scopes: vec!["get_user_info".to_string()],
            client_type: ClientType::Public,
        }
    }

    #[test]
    fn test_is_public() {
        assert!(!make_confidential_client().is_public());
        assert!(make_public_client().is_public());
    }

    #[test]
    fn test_redirect_uri_exact_match_only() {
        let client = make_confidential_client();
        assert!(client.is_redirect_uri_allowed("http://localhost:8001/callback"));

        // No trailing-slash, prefix, or query-string tolerance
        assert!(!client.is_redirect_uri_allowed("http://localhost:8001/callback/"));
        assert!(!client.is_redirect_uri_allowed("http://localhost:8001/callback?x=1"));
        assert!(!client.is_redirect_uri_allowed("http://localhost:8001/call"));
        assert!(!client.is_redirect_uri_allowed("http://evil.example.com/callback"));
    }

    #[test]
    fn test_scope_checks() {
        let client = make_confidential_client();
        assert!(client.is_scope_allowed("get_user_info"));
        assert!(!client.is_scope_allowed("delete_everything"));

        assert!(client.check_scope("get_user_info get_admin_info").is_ok());
        assert_eq!(
            client.check_scope("get_user_info unknown_scope"),
            Err("unknown_scope")
        );
    }

    #[test]
    fn test_default_scope_joins_allowed_set() {
        let client = make_confidential_client();
        assert_eq!(
            client.default_scope(),
            "get_admin_info get_user_info get_client_info"
        );
    }

    #[test]
    fn test_validate_confidential_requires_secret() {
        let mut client = make_confidential_client();
        client.secret_hash = None;
        assert!(matches!(
            client.validate(),
            Err(ClientValidationError::MissingSecret)
        ));
    }

    #[test]
    fn test_validate_public_rejects_secret() {
        let mut client = make_public_client();
        client.secret_hash = Some("hash".to_string());
        assert!(matches!(
            client.validate(),
            Err(ClientValidationError::PublicClientSecret)
        ));
    }

    #[test]
    fn test_validate_empty_client_id() {
        let mut client = make_public_client();
        client.client_id = String::new();
        assert!(matches!(
            client.validate(),
            Err(ClientValidationError::EmptyClientId)
        ));
    }

    #[test]
    fn test_grant_type_as_str() {
        assert_eq!(GrantType::AuthorizationCode.as_str(), "authorization_code");
        assert_eq!(GrantType::ClientCredentials.as_str(), "client_credentials");
        assert_eq!(GrantType::RefreshToken.as_str(), "refresh_token");
    }

    #[test]
    fn test_serde_roundtrip() {
        let client = make_confidential_client();
        let json = serde_json::to_string(&client).unwrap();
        let parsed: Client = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.client_id, client.client_id);
        assert_eq!(parsed.client_type, client.client_type);
        assert_eq!(parsed.redirect_uris, client.redirect_uris);
    }
}
