//! Authorization endpoint validation and consent handling.
//!
//! `GET /authorize` parameters are validated into a [`ValidatedAuthorize`]
//! before any consent step is shown. The consent submission authenticates
//! the resource owner and either mints an authorization code or builds an
//! `error=access_denied` redirect — denial is a normal control-flow outcome,
//! not a fault.
//!
//! Failures are split by whether the client/redirect pair can be trusted:
//! until both validate, nothing is ever redirected to the supplied URI.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::AuthResult;
use crate::error::AuthError;
use crate::oauth::pkce::{PkceChallenge, PkceMethod};
use crate::storage::{ClientStore, UserStore};
use crate::token::service::TokenService;
use crate::types::{AuthorizationCodeData, Client};

// =============================================================================
// Requests
// =============================================================================

/// `GET /authorize` query parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthorizeRequest {
    /// Must be "code".
    pub response_type: String,

    /// Client requesting authorization.
    pub client_id: String,

    /// Where to send the user back; must be registered exactly.
    pub redirect_uri: String,

    /// Requested scope; defaults to the client's full allowed set.
    #[serde(default)]
    pub scope: Option<String>,

    /// Opaque client state echoed back on the redirect.
    #[serde(default)]
    pub state: Option<String>,

    /// PKCE challenge; required for public clients.
    #[serde(default)]
    pub code_challenge: Option<String>,

    /// PKCE challenge method: "plain" or "S256".
    #[serde(default)]
    pub code_challenge_method: Option<String>,
}

/// `POST /authorize` form: the consent submission.
#[derive(Debug, Clone, Deserialize)]
pub struct ConsentForm {
    /// Resource owner credentials from the login form.
    pub username: String,
    /// Resource owner password.
    pub password: String,
    /// Whether the resource owner granted the request.
    pub consent: bool,

    /// Client requesting authorization.
    pub client_id: String,
    /// Redirect target carried through the form.
    pub redirect_uri: String,

    /// Requested scope carried through the form.
    #[serde(default)]
    pub scope: Option<String>,
    /// Client state carried through the form.
    #[serde(default)]
    pub state: Option<String>,
    /// PKCE challenge carried through the form.
    #[serde(default)]
    pub code_challenge: Option<String>,
    /// PKCE challenge method carried through the form.
    #[serde(default)]
    pub code_challenge_method: Option<String>,
}

/// A validated authorization request: the client resolved, the redirect URI
/// trusted, the scope normalized, and PKCE parameters parsed.
#[derive(Debug, Clone)]
pub struct ValidatedAuthorize {
    /// The resolved client registration.
    pub client: Client,
    /// The exact registered redirect URI.
    pub redirect_uri: String,
    /// Normalized scope (defaulted to the client's allowed set if absent).
    pub scope: String,
    /// Client state to echo back.
    pub state: Option<String>,
    /// PKCE challenge to bind to the code.
    pub code_challenge: Option<String>,
    /// Parsed PKCE method.
    pub code_challenge_method: Option<PkceMethod>,
}

// =============================================================================
// Validator
// =============================================================================

/// Validates `/authorize` requests and handles the consent submission.
pub struct AuthorizeValidator {
    clients: Arc<dyn ClientStore>,
    users: Arc<dyn UserStore>,
    tokens: Arc<TokenService>,
}

impl AuthorizeValidator {
    /// Creates a new validator.
    #[must_use]
    pub fn new(
        clients: Arc<dyn ClientStore>,
        users: Arc<dyn UserStore>,
        tokens: Arc<TokenService>,
    ) -> Self {
        Self {
            clients,
            users,
            tokens,
        }
    }

    /// Validates a `GET /authorize` request.
    ///
    /// # Errors
    ///
    /// - `unsupported_response_type` - `response_type` is not "code"
    /// - `unauthorized_client` - unknown client
    /// - `invalid_request` - unregistered redirect URI or malformed PKCE
    /// - `invalid_scope` - scope outside the client's allowed set
    ///
    /// None of these may be redirected to the supplied URI.
    pub async fn validate(&self, request: &AuthorizeRequest) -> AuthResult<ValidatedAuthorize> {
        if request.response_type != "code" {
            return Err(AuthError::unsupported_response_type(&request.response_type));
        }

        self.validate_core(
            &request.client_id,
            &request.redirect_uri,
            request.scope.as_deref(),
            request.state.clone(),
            request.code_challenge.clone(),
            request.code_challenge_method.as_deref(),
        )
        .await
    }

    /// Processes a consent submission.
    ///
    /// Returns the redirect URL for the user agent: `?code=…&state=…` on
    /// success, `?error=…` for recoverable authorization failures (denied
    /// consent, failed login, store outage). An `Err` is returned only when
    /// the client/redirect pair itself cannot be trusted.
    ///
    /// # Errors
    ///
    /// Same as [`AuthorizeValidator::validate`], for the re-validation of
    /// the submitted form.
    pub async fn submit_consent(&self, form: &ConsentForm) -> AuthResult<Url> {
        // Re-validate: the form round-tripped through the user agent and
        // nothing it carries is trusted.
        let validated = self
            .validate_core(
                &form.client_id,
                &form.redirect_uri,
                form.scope.as_deref(),
                form.state.clone(),
                form.code_challenge.clone(),
                form.code_challenge_method.as_deref(),
            )
            .await?;

        // From here on the redirect target is trusted; failures go back to
        // the client as redirect parameters.
        let user = match self.authenticate_owner(&form.username, &form.password).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                debug!(client_id = %form.client_id, "resource owner authentication failed");
                return error_redirect(
                    &validated,
                    &AuthError::access_denied("resource owner authentication failed"),
                );
            }
            Err(e) => {
                warn!(error = %e, "user store failure during consent");
                return error_redirect(&validated, &e);
            }
        };

        if !form.consent {
            debug!(client_id = %form.client_id, "resource owner denied the request");
            return error_redirect(
                &validated,
                &AuthError::access_denied("the resource owner denied the request"),
            );
        }

        let data = AuthorizationCodeData {
            user_id: user,
            client_id: validated.client.client_id.clone(),
            redirect_uri: validated.redirect_uri.clone(),
            scope: validated.scope.clone(),
            code_challenge: validated.code_challenge.clone(),
            code_challenge_method: validated.code_challenge_method,
        };

        match self.tokens.generate_code(&data).await {
            Ok(code) => success_redirect(&validated, &code),
            Err(e) => {
                warn!(error = %e, "failed to store authorization code");
                error_redirect(&validated, &e)
            }
        }
    }

    /// Authenticates the resource owner; `Ok(Some(user_id))` on success.
    async fn authenticate_owner(
        &self,
        username: &str,
        password: &str,
    ) -> AuthResult<Option<String>> {
        let Some(user) = self.users.find_by_username(username).await? else {
            return Ok(None);
        };

        if !user.active {
            return Ok(None);
        }

        if !self.users.verify_password(username, password).await? {
            return Ok(None);
        }

        Ok(Some(user.id))
    }

    async fn validate_core(
        &self,
        client_id: &str,
        redirect_uri: &str,
        scope: Option<&str>,
        state: Option<String>,
        code_challenge: Option<String>,
        code_challenge_method: Option<&str>,
    ) -> AuthResult<ValidatedAuthorize> {
        let client = self
            .clients
            .find_by_client_id(client_id)
            .await?
            .ok_or_else(|| AuthError::unauthorized_client("unknown client"))?;

        // Exact match against the registered set; no prefix or substring
        // tolerance (open-redirect prevention).
        if !client.is_redirect_uri_allowed(redirect_uri) {
            return Err(AuthError::invalid_request(
                "redirect_uri is not registered for this client",
            ));
        }

        let scope = match scope.filter(|s| !s.trim().is_empty()) {
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

        let method = match (code_challenge.as_deref(), code_challenge_method) {
            (None, None) => {
                if client.is_public() {
                    return Err(AuthError::invalid_request(
                        "code_challenge is required for public clients",
                    ));
                }
                None
            }
            (Some(challenge), Some(method)) => {
                let method = PkceMethod::parse(method).map_err(|e| {
                    AuthError::invalid_request(format!("invalid code_challenge_method: {e}"))
                })?;
                PkceChallenge::parse(challenge.to_string(), method).map_err(|e| {
                    AuthError::invalid_request(format!("invalid code_challenge: {e}"))
                })?;
                Some(method)
            }
            _ => {
                return Err(AuthError::invalid_request(
                    "code_challenge and code_challenge_method must be provided together",
                ));
            }
        };

        Ok(ValidatedAuthorize {
            redirect_uri: redirect_uri.to_string(),
            scope,
            state,
            code_challenge,
            code_challenge_method: method,
            client,
        })
    }
}

// =============================================================================
// Redirect building
// =============================================================================

fn success_redirect(validated: &ValidatedAuthorize, code: &str) -> AuthResult<Url> {
    build_redirect(
        &validated.redirect_uri,
        &[
            ("code", Some(code)),
            ("state", validated.state.as_deref()),
        ],
    )
}

fn error_redirect(validated: &ValidatedAuthorize, error: &AuthError) -> AuthResult<Url> {
    build_redirect(
        &validated.redirect_uri,
        &[
            ("error", Some(error.oauth_error_code())),
            ("error_description", Some(&error.description())),
            ("state", validated.state.as_deref()),
        ],
    )
}

fn build_redirect(redirect_uri: &str, params: &[(&str, Option<&str>)]) -> AuthResult<Url> {
    // The URI was validated against the registered set; a parse failure
    // here means a corrupt registration.
    let mut url = Url::parse(redirect_uri).map_err(|e| {
        AuthError::server_error(format!("registered redirect URI does not parse: {e}"))
    })?;

    {
        let mut query = url.query_pairs_mut();
        for (key, value) in params {
            if let Some(value) = value {
                query.append_pair(key, value);
            }
        }
    }

    Ok(url)
}

// =============================================================================
// Tests
// =============================================================================
