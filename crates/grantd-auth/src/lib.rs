//! # grantd-auth
//!
//! OAuth 2.0 authorization server core for grantd.
//!
//! This crate implements the grant-flow engine and token service of an
//! RFC 6749 authorization server:
//!
//! - Authorization code flow with PKCE (RFC 7636)
//! - Client credentials flow
//! - Refresh token flow with rotation
//!
//! External collaborators (client registry, user authentication, keyed
//! expiring storage) are consumed through the capability traits in
//! [`storage`]; backends live in separate crates.
//!
//! ## Modules
//!
//! - [`error`] - OAuth 2.0 error taxonomy
//! - [`types`] - Domain types: clients, grants, token requests/responses
//! - [`storage`] - Capability traits for external collaborators
//! - [`oauth`] - PKCE, client authentication, authorize flow, grant handlers
//! - [`token`] - JWT signing and the token service
//! - [`http`] - Axum handlers for the token and authorize endpoints

pub mod error;
pub mod http;
pub mod oauth;
pub mod storage;
pub mod token;
pub mod types;

pub use error::AuthError;
pub use oauth::{
    AuthorizationCodeGrant, AuthorizeRequest, AuthorizeValidator, ClientCredentials,
    ClientCredentialsGrant, ConsentForm, OAuth2Service, PkceChallenge, PkceMethod, PkceVerifier,
    RefreshTokenGrant, ValidatedAuthorize, authenticate_client, parse_basic_auth,
};
pub use storage::{ClientStore, KeyedExpiringStore, User, UserStore};
pub use token::{
    AccessTokenClaims, JwtService, SigningAlgorithm, SigningKey, TokenConfig, TokenService,
};
pub use types::{
    AuthorizationCodeData, Client, ClientCredentialsRequest, ClientType, CodeExchangeRequest,
    GrantType, RefreshRequest, RefreshTokenRecord, TokenRequest, TokenRequestForm, TokenResponse,
};

/// Type alias for results in the authorization server.
pub type AuthResult<T> = Result<T, AuthError>;
