//! Token endpoint handler.
//!
//! Handles `POST /oauth/token` with an `application/x-www-form-urlencoded`
//! body. Client credentials are taken from the HTTP Basic `Authorization`
//! header when present, from body fields otherwise.

use std::sync::Arc;

use axum::{
    Form, Json,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::debug;

use crate::error::AuthError;
use crate::oauth::client_auth::{ClientCredentials, parse_basic_auth};
use crate::oauth::service::OAuth2Service;
use crate::types::{TokenRequest, TokenRequestForm, TokenResponse};

/// Shared state for the OAuth endpoints.
#[derive(Clone)]
pub struct OAuth2State {
    /// The dispatcher facade.
    pub service: Arc<OAuth2Service>,
}

impl OAuth2State {
    /// Creates new endpoint state.
    #[must_use]
    pub fn new(service: Arc<OAuth2Service>) -> Self {
        Self { service }
    }
}

/// Wire shape of an error response: `{error, error_description}`.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    error_description: String,
}

/// `POST /oauth/token`
pub async fn token_handler(
    State(state): State<OAuth2State>,
    headers: HeaderMap,
    Form(form): Form<TokenRequestForm>,
) -> Response {
    debug!(grant_type = %form.grant_type, "processing token request");

    let basic = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_basic_auth);
    let credentials = ClientCredentials::resolve(basic, &form);

    let request = match TokenRequest::from_form(&form) {
        Ok(request) => request,
        Err(e) => return error_response(&e),
    };

    match state.service.token(credentials, request).await {
        Ok(response) => success_response(&response),
        Err(e) => error_response(&e),
    }
}

fn success_response(response: &TokenResponse) -> Response {
    (
        StatusCode::OK,
        [
            ("Cache-Control", "no-store"),
            ("Pragma", "no-cache"),
        ],
        Json(response),
    )
        .into_response()
}

pub(crate) fn error_response(error: &AuthError) -> Response {
    let status =
        StatusCode::from_u16(error.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    (
        status,
        [
            ("Cache-Control", "no-store"),
            ("Pragma", "no-cache"),
        ],
        Json(ErrorBody {
            error: error.oauth_error_code(),
            error_description: error.description(),
        }),
    )
        .into_response()
}
