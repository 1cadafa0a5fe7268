//! # grantd-server
//!
//! Wires the grantd-auth core to its backends and exposes the OAuth
//! endpoints over axum. The binary in `main.rs` is a thin shell around
//! [`build_state`] and [`router`].

pub mod config;

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use axum::routing::{get, post};
use tracing::warn;

use grantd_auth::http::{OAuth2State, authorize_handler, consent_handler, token_handler};
use grantd_auth::types::Client;
use grantd_auth::{
    JwtService, OAuth2Service, SigningAlgorithm, SigningKey, TokenConfig, TokenService, User,
};
use grantd_memory::{MemoryClientStore, MemoryExpiringStore, MemoryUserStore};

pub use config::ServerConfig;

/// Builds the endpoint state from configuration: signing key, memory
/// backends seeded with the configured clients and users, token service,
/// and dispatcher.
///
/// # Errors
///
/// Returns an error on invalid signing configuration, unreadable key
/// files, or inconsistent client/user registrations.
pub fn build_state(config: &ServerConfig) -> anyhow::Result<OAuth2State> {
    let signing_key = build_signing_key(&config.signing)?;

    let token_config = TokenConfig::default()
        .with_code_ttl(config.tokens.code_ttl.try_into().context("code_ttl out of range")?)
        .with_access_token_ttl(
            config
                .tokens
                .access_token_ttl
                .try_into()
                .context("access_token_ttl out of range")?,
        )
        .with_refresh_token_ttl(
            config
                .tokens
                .refresh_token_ttl
                .try_into()
                .context("refresh_token_ttl out of range")?,
        );

    let clients = Arc::new(MemoryClientStore::new());
    for entry in &config.clients {
        clients
            .register(
                Client {
                    client_id: entry.client_id.clone(),
                    secret_hash: None,
                    redirect_uris: entry.redirect_uris.clone(),
                    allowed_scopes: entry.scopes.clone(),
                    client_type: entry.client_type,
                },
                entry.client_secret.as_deref(),
            )
            .with_context(|| format!("failed to register client '{}'", entry.client_id))?;
    }

    let users = Arc::new(MemoryUserStore::new());
    for entry in &config.users {
        users
            .register(
                User {
                    id: entry.id.clone(),
                    username: entry.username.clone(),
                    full_name: entry.full_name.clone(),
                    email: entry.email.clone(),
                    active: entry.active,
                },
                &entry.password,
            )
            .with_context(|| format!("failed to register user '{}'", entry.username))?;
    }

    let tokens = Arc::new(TokenService::new(
        Arc::new(JwtService::new(signing_key)),
        Arc::new(MemoryExpiringStore::new()),
        token_config,
    ));

    let service = Arc::new(OAuth2Service::new(clients, users, tokens));
    Ok(OAuth2State::new(service))
}

/// Builds the access token signing key from configuration.
fn build_signing_key(config: &config::SigningConfig) -> anyhow::Result<SigningKey> {
    match config.algorithm {
        SigningAlgorithm::HS256 => {
            let secret = config
                .secret
                .as_deref()
                .context("signing.secret is required for HS256")?;
            Ok(SigningKey::hs256(secret))
        }
        SigningAlgorithm::RS256 => match (&config.private_key_pem, &config.public_key_pem) {
            (Some(private_path), Some(public_path)) => {
                let private = std::fs::read_to_string(private_path).with_context(|| {
                    format!("failed to read private key {}", private_path.display())
                })?;
                let public = std::fs::read_to_string(public_path).with_context(|| {
                    format!("failed to read public key {}", public_path.display())
                })?;
                Ok(SigningKey::rs256_from_pem(&private, &public)?)
            }
            _ => {
                warn!("no RS256 key pair configured; generating an ephemeral development key");
                Ok(SigningKey::generate_rs256()?)
            }
        },
    }
}

/// Builds the OAuth endpoint router.
#[must_use]
pub fn router(state: OAuth2State) -> Router {
    Router::new()
        .route("/oauth/token", post(token_handler))
        .route("/oauth/authorize", get(authorize_handler).post(consent_handler))
        .with_state(state)
}
