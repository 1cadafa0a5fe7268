//! Grant handlers, one per grant type.
//!
//! Common contract: `handle(client, request) -> AuthResult<TokenResponse>`.
//! The client has already been authenticated by the dispatcher; each handler
//! validates its grant-specific preconditions and calls the token service.
//! There is no partial success; the first violated check aborts the request
//! with a typed error.

pub mod authorization_code;
pub mod client_credentials;
pub mod refresh_token;

pub use authorization_code::AuthorizationCodeGrant;
pub use client_credentials::ClientCredentialsGrant;
pub use refresh_token::RefreshTokenGrant;
