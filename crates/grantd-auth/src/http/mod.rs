//! Axum handlers for the OAuth 2.0 endpoints.
//!
//! Only the error-to-status boundary lives here; routing beyond the two
//! endpoint paths, templating, and middleware belong to the embedding
//! server.

pub mod authorize;
pub mod token;

pub use authorize::{ConsentPrompt, authorize_handler, consent_handler};
pub use token::{OAuth2State, token_handler};
