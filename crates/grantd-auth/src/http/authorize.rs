//! Authorize endpoint handlers.
//!
//! `GET /oauth/authorize` validates the request and returns the consent
//! step as JSON (login-page rendering is an external collaborator).
//! `POST /oauth/authorize` processes the consent submission and answers
//! with a 302 redirect; a JSON error is returned only when the
//! client/redirect pair itself cannot be trusted enough to redirect to.

use axum::{
    Form, Json,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::http::token::{OAuth2State, error_response};
use crate::oauth::authorize::{AuthorizeRequest, ConsentForm};

/// The consent step returned by `GET /oauth/authorize`: everything a login
/// page needs to render and to round-trip through the consent form.
#[derive(Debug, Serialize)]
pub struct ConsentPrompt {
    /// Client requesting authorization.
    pub client_id: String,
    /// Redirect target to carry through the form.
    pub redirect_uri: String,
    /// Normalized scope being granted.
    pub scope: String,
    /// Client state to carry through the form.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// PKCE challenge to carry through the form.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_challenge: Option<String>,
    /// PKCE method to carry through the form.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_challenge_method: Option<String>,
}

/// `GET /oauth/authorize`
pub async fn authorize_handler(
    State(state): State<OAuth2State>,
    Query(request): Query<AuthorizeRequest>,
) -> Response {
    match state.service.authorize(&request).await {
        Ok(validated) => Json(ConsentPrompt {
            client_id: validated.client.client_id,
            redirect_uri: validated.redirect_uri,
            scope: validated.scope,
            state: validated.state,
            code_challenge: validated.code_challenge,
            code_challenge_method: validated
                .code_challenge_method
                .map(|m| m.as_str().to_string()),
        })
        .into_response(),
        Err(e) => error_response(&e),
    }
}

/// `POST /oauth/authorize`
pub async fn consent_handler(
    State(state): State<OAuth2State>,
    Form(form): Form<ConsentForm>,
) -> Response {
    match state.service.submit_consent(&form).await {
        Ok(url) => found_redirect(url.as_str()),
        Err(e) => error_response(&e),
    }
}

/// A 302 Found redirect to the given location.
fn found_redirect(location: &str) -> Response {
    match location.parse() {
        Ok(value) => {
            let mut response = StatusCode::FOUND.into_response();
            response.headers_mut().insert(header::LOCATION, value);
            response
        }
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}
