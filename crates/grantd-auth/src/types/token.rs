//! Token endpoint request and response types.
//!
//! The wire format of `POST /token` is a flat form ([`TokenRequestForm`]).
//! It is parsed into [`TokenRequest`], a union tagged by grant type that
//! carries only the fields valid for that variant; missing required fields
//! surface as `invalid_request` and an unrecognized `grant_type` as
//! `unsupported_grant_type` before any handler runs.

use serde::{Deserialize, Serialize};

use crate::AuthResult;
use crate::error::AuthError;
use crate::types::client::GrantType;

// =============================================================================
// Wire Form
// =============================================================================

/// Raw `POST /token` form body.
///
/// Client credentials may arrive here (`client_id`/`client_secret`) or via
/// an HTTP Basic `Authorization` header; the header wins when both are
/// present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenRequestForm {
    /// OAuth 2.0 grant type. Required.
    pub grant_type: String,

    /// Client ID (body authentication or public clients).
    #[serde(default)]
    pub client_id: Option<String>,

    /// Client secret (body authentication).
    #[serde(default)]
    pub client_secret: Option<String>,

    /// Authorization code (authorization_code grant).
    #[serde(default)]
    pub code: Option<String>,

    /// Redirect URI; must repeat the one used at `/authorize`.
    #[serde(default)]
    pub redirect_uri: Option<String>,

    /// PKCE code verifier (authorization_code grant).
    #[serde(default)]
    pub code_verifier: Option<String>,

    /// Refresh token (refresh_token grant).
    #[serde(default)]
    pub refresh_token: Option<String>,

    /// Requested scope (client_credentials and refresh_token grants).
    #[serde(default)]
    pub scope: Option<String>,
}

// =============================================================================
// Typed Request
// =============================================================================

/// Authorization code exchange parameters.
#[derive(Debug, Clone)]
pub struct CodeExchangeRequest {
    /// The authorization code being redeemed.
    pub code: String,
    /// Redirect URI from the authorization request.
    pub redirect_uri: String,
    /// PKCE code verifier; required for public clients.
    pub code_verifier: Option<String>,
}

/// Client credentials grant parameters.
#[derive(Debug, Clone)]
pub struct ClientCredentialsRequest {
    /// Requested scope; `None` defaults to the client's full allowed set.
    pub scope: Option<String>,
}

/// Refresh token grant parameters.
#[derive(Debug, Clone)]
pub struct RefreshRequest {
    /// The refresh token being redeemed.
    pub refresh_token: String,
    /// Requested scope; must not exceed the original grant.
    pub scope: Option<String>,
}

/// A token request, tagged by grant type.
#[derive(Debug, Clone)]
pub enum TokenRequest {
    /// `grant_type=authorization_code`
    AuthorizationCode(CodeExchangeRequest),
    /// `grant_type=client_credentials`
    ClientCredentials(ClientCredentialsRequest),
    /// `grant_type=refresh_token`
    RefreshToken(RefreshRequest),
}

impl TokenRequest {
    /// Parses the wire form into a typed request.
    ///
    /// # Errors
    ///
    /// - `invalid_request` when a field required by the grant type is missing
    /// - `unsupported_grant_type` for an unrecognized `grant_type`
    pub fn from_form(form: &TokenRequestForm) -> AuthResult<Self> {
        match form.grant_type.as_str() {
            "authorization_code" => {
                let code = form
                    .code
                    .clone()
                    .ok_or_else(|| AuthError::invalid_request("missing required parameter: code"))?;
                let redirect_uri = form.redirect_uri.clone().ok_or_else(|| {
                    AuthError::invalid_request("missing required parameter: redirect_uri")
                })?;
                Ok(Self::AuthorizationCode(CodeExchangeRequest {
                    code,
                    redirect_uri,
                    code_verifier: form.code_verifier.clone(),
                }))
            }
            "client_credentials" => Ok(Self::ClientCredentials(ClientCredentialsRequest {
                scope: form.scope.clone(),
            })),
            "refresh_token" => {
                let refresh_token = form.refresh_token.clone().ok_or_else(|| {
                    AuthError::invalid_request("missing required parameter: refresh_token")
                })?;
                Ok(Self::RefreshToken(RefreshRequest {
                    refresh_token,
                    scope: form.scope.clone(),
                }))
            }
            other => Err(AuthError::unsupported_grant_type(other)),
        }
    }

    /// Returns the grant type of this request.
    #[must_use]
    pub fn grant_type(&self) -> GrantType {
        match self {
            Self::AuthorizationCode(_) => GrantType::AuthorizationCode,
            Self::ClientCredentials(_) => GrantType::ClientCredentials,
            Self::RefreshToken(_) => GrantType::RefreshToken,
        }
    }
}

// =============================================================================
// Response
// =============================================================================

/// Successful token response (RFC 6749 §5.1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    /// The signed access token.
    pub access_token: String,

    /// Token type, always "Bearer".
    pub token_type: String,

    /// Access token lifetime in seconds.
    pub expires_in: u64,

    /// Granted scopes (space-separated).
    pub scope: String,

    /// Refresh token; absent for the client_credentials grant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl TokenResponse {
    /// Creates a new token response without a refresh token.
    #[must_use]
    pub fn new(access_token: String, expires_in: u64, scope: String) -> Self {
        Self {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in,
            scope,
            refresh_token: None,
        }
    }

    /// Sets the refresh token.
    #[must_use]
    pub fn with_refresh_token(mut self, token: String) -> Self {
        self.refresh_token = Some(token);
        self
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn form(grant_type: &str) -> TokenRequestForm {
        TokenRequestForm {
            grant_type: grant_type.to_string(),
            ..TokenRequestForm::default()
        }
    }

    #[test]
    fn test_parse_authorization_code() {
        let mut f = form("authorization_code");
        f.code = Some("abc123".to_string());
        f.redirect_uri = Some("http://localhost:8001/callback".to_string());
        f.code_verifier = Some("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk".to_string());

        let request = TokenRequest::from_form(&f).unwrap();
        match request {
            TokenRequest::AuthorizationCode(req) => {
                assert_eq!(req.code, "abc123");
                assert_eq!(req.redirect_uri, "http://localhost:8001/callback");
                assert!(req.code_verifier.is_some());
            }
            other => panic!("unexpected variant: {}", other.grant_type()),
        }
    }

    #[test]
    fn test_parse_authorization_code_missing_code() {
        let mut f = form("authorization_code");
        f.redirect_uri = Some("http://localhost:8001/callback".to_string());

        let err = TokenRequest::from_form(&f).unwrap_err();
        assert!(matches!(err, AuthError::InvalidRequest { .. }));
    }

    #[test]
    fn test_parse_authorization_code_missing_redirect_uri() {
        let mut f = form("authorization_code");
        f.code = Some("abc123".to_string());

        let err = TokenRequest::from_form(&f).unwrap_err();
        assert!(matches!(err, AuthError::InvalidRequest { .. }));
    }

    #[test]
    fn test_parse_client_credentials() {
        let mut f = form("client_credentials");
        f.scope = Some("get_client_info".to_string());

        let request = TokenRequest::from_form(&f).unwrap();
        match request {
            TokenRequest::ClientCredentials(req) => {
                assert_eq!(req.scope.as_deref(), Some("get_client_info"));
            }
            other => panic!("unexpected variant: {}", other.grant_type()),
        }
    }

    #[test]
    fn test_parse_refresh_token() {
        let mut f = form("refresh_token");
        f.refresh_token = Some("tGzv3JOkF0XG5Qx2TlKWIA".to_string());

        let request = TokenRequest::from_form(&f).unwrap();
        match request {
            TokenRequest::RefreshToken(req) => {
                assert_eq!(req.refresh_token, "tGzv3JOkF0XG5Qx2TlKWIA");
                assert!(req.scope.is_none());
            }
            other => panic!("unexpected variant: {}", other.grant_type()),
        }
    }

    #[test]
    fn test_parse_refresh_token_missing_token() {
        let f = form("refresh_token");
        let err = TokenRequest::from_form(&f).unwrap_err();
        assert!(matches!(err, AuthError::InvalidRequest { .. }));
    }

    #[test]
    fn test_parse_unknown_grant_type() {
        let f = form("implicit");
        let err = TokenRequest::from_form(&f).unwrap_err();
        assert!(matches!(err, AuthError::UnsupportedGrantType { .. }));
        assert_eq!(err.oauth_error_code(), "unsupported_grant_type");
    }

    #[test]
    fn test_response_serialization_skips_absent_refresh_token() {
        let response = TokenResponse::new("jwt".to_string(), 900, "get_user_info".to_string());
        let json = serde_json::to_string(&response).unwrap();

        assert!(json.contains(r#""token_type":"Bearer""#));
        assert!(json.contains(r#""expires_in":900"#));
        assert!(!json.contains("refresh_token"));
    }

    #[test]
    fn test_response_serialization_with_refresh_token() {
        let response = TokenResponse::new("jwt".to_string(), 900, "get_user_info".to_string())
            .with_refresh_token("opaque".to_string());
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains(r#""refresh_token":"opaque""#));
    }

    #[test]
    fn test_form_deserializes_from_urlencoded_shape() {
        let json = r#"{
            "grant_type": "authorization_code",
            "code": "abc123",
            "client_id": "auth-code-client",
            "client_secret": "auth-code-secret-123",
            "redirect_uri": "http://localhost:8001/callback"
        }"#;
        let f: TokenRequestForm = serde_json::from_str(json).unwrap();
        assert_eq!(f.grant_type, "authorization_code");
        assert_eq!(f.client_id.as_deref(), Some("auth-code-client"));
        assert!(f.refresh_token.is_none());
    }
}
