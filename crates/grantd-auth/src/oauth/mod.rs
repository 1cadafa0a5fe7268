//! OAuth 2.0 grant-flow engine.
//!
//! - [`pkce`] - RFC 7636 verifier/challenge handling
//! - [`client_auth`] - token-endpoint client authentication
//! - [`authorize`] - `/authorize` validation and consent handling
//! - [`grants`] - one handler per grant type
//! - [`service`] - the dispatcher facade

pub mod authorize;
pub mod client_auth;
pub mod grants;
pub mod pkce;
pub mod service;

pub use authorize::{AuthorizeRequest, AuthorizeValidator, ConsentForm, ValidatedAuthorize};
pub use client_auth::{ClientCredentials, authenticate_client, parse_basic_auth};
pub use grants::{AuthorizationCodeGrant, ClientCredentialsGrant, RefreshTokenGrant};
pub use pkce::{PkceChallenge, PkceError, PkceMethod, PkceVerifier};
pub use service::OAuth2Service;
