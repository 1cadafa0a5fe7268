//! Token generation, validation, and management.

pub mod jwt;
pub mod service;

pub use jwt::{AccessTokenClaims, JwtError, JwtService, SigningAlgorithm, SigningKey};
pub use service::{TokenConfig, TokenService};
