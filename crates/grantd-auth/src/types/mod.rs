//! Domain types for the authorization server.

pub mod client;
pub mod code;
pub mod refresh_token;
pub mod token;

pub use client::{Client, ClientType, ClientValidationError, GrantType};
pub use code::AuthorizationCodeData;
pub use refresh_token::RefreshTokenRecord;
pub use token::{
    ClientCredentialsRequest, CodeExchangeRequest, RefreshRequest, TokenRequest, TokenRequestForm,
    TokenResponse,
};
