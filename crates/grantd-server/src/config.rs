//! Server configuration.
//!
//! Loaded from a TOML file. Client and user registrations live here as
//! static entries seeded into the memory backends at startup; durations use
//! humantime strings ("5m", "7d").
//!
//! # Example (TOML)
//!
//! ```toml
//! listen = "127.0.0.1:8080"
//!
//! [signing]
//! algorithm = "HS256"
//! secret = "change-me"
//!
//! [tokens]
//! code_ttl = "5m"
//! access_token_ttl = "15m"
//! refresh_token_ttl = "7d"
//!
//! [[clients]]
//! client_id = "auth-code-client"
//! client_secret = "auth-code-secret-123"
//! type = "confidential"
//! redirect_uris = ["http://localhost:8001/callback"]
//! scopes = ["get_user_info"]
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

use grantd_auth::types::ClientType;
use grantd_auth::SigningAlgorithm;

/// Root server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on.
    pub listen: String,

    /// Access token signing configuration.
    pub signing: SigningConfig,

    /// Token and code lifetimes.
    pub tokens: TokenTtls,

    /// Statically registered clients.
    pub clients: Vec<ClientEntry>,

    /// Statically registered users.
    pub users: Vec<UserEntry>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:8080".to_string(),
            signing: SigningConfig::default(),
            tokens: TokenTtls::default(),
            clients: Vec::new(),
            users: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }
}

/// Access token signing configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SigningConfig {
    /// "HS256" (shared secret) or "RS256" (key pair).
    pub algorithm: SigningAlgorithm,

    /// Shared secret; required for HS256.
    pub secret: Option<String>,

    /// PEM-encoded RSA private key path; RS256 only.
    pub private_key_pem: Option<PathBuf>,

    /// PEM-encoded RSA public key path; RS256 only.
    pub public_key_pem: Option<PathBuf>,
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            algorithm: SigningAlgorithm::HS256,
            secret: None,
            private_key_pem: None,
            public_key_pem: None,
        }
    }
}

/// Code and token lifetimes.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TokenTtls {
    /// Authorization code lifetime.
    #[serde(with = "humantime_serde")]
    pub code_ttl: Duration,

    /// Access token lifetime.
    #[serde(with = "humantime_serde")]
    pub access_token_ttl: Duration,

    /// Refresh token lifetime.
    #[serde(with = "humantime_serde")]
    pub refresh_token_ttl: Duration,
}

impl Default for TokenTtls {
    fn default() -> Self {
        Self {
            code_ttl: Duration::from_secs(5 * 60),
            access_token_ttl: Duration::from_secs(15 * 60),
            refresh_token_ttl: Duration::from_secs(7 * 24 * 3600),
        }
    }
}

/// A statically registered client.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientEntry {
    /// Client identifier.
    pub client_id: String,

    /// Plaintext secret; hashed at registration. Confidential clients only.
    #[serde(default)]
    pub client_secret: Option<String>,

    /// Registered redirect URIs.
    #[serde(default)]
    pub redirect_uris: Vec<String>,

    /// Allowed scopes.
    #[serde(default)]
    pub scopes: Vec<String>,

    /// "confidential" or "public".
    #[serde(rename = "type")]
    pub client_type: ClientType,
}

/// A statically registered user.
#[derive(Debug, Clone, Deserialize)]
pub struct UserEntry {
    /// User identifier (the `sub` claim of issued tokens).
    pub id: String,

    /// Login name.
    pub username: String,

    /// Plaintext password; hashed at registration.
    pub password: String,

    /// Display name.
    #[serde(default)]
    pub full_name: Option<String>,

    /// Email address.
    #[serde(default)]
    pub email: Option<String>,

    /// Inactive users cannot authorize clients.
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}
