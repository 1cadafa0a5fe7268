//! JWT access token signing and validation.
//!
//! Access tokens are self-contained signed claim sets; nothing is persisted.
//! The signing key is symmetric (HS256) or asymmetric (RS256) depending on
//! deployment.

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation, decode, encode,
};
use rand::rngs::OsRng;
use rsa::RsaPrivateKey;
use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during JWT operations.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to encode a token.
    #[error("Failed to encode token: {message}")]
    EncodingError {
        /// Description of the encoding error.
        message: String,
    },

    /// Failed to decode a token (malformed or wrong algorithm).
    #[error("Failed to decode token: {message}")]
    DecodingError {
        /// Description of the decoding error.
        message: String,
    },

    /// The token has expired.
    #[error("Token expired")]
    Expired,

    /// The token signature is invalid.
    #[error("Invalid signature")]
    InvalidSignature,

    /// The token claims are invalid.
    #[error("Invalid claims: {message}")]
    InvalidClaims {
        /// Description of why claims are invalid.
        message: String,
    },

    /// Invalid key material.
    #[error("Invalid key: {message}")]
    InvalidKey {
        /// Description of why the key is invalid.
        message: String,
    },

    /// Failed to generate a cryptographic key.
    #[error("Key generation error: {message}")]
    KeyGenerationError {
        /// Description of the key generation error.
        message: String,
    },
}

impl JwtError {
    fn decoding_error(message: impl Into<String>) -> Self {
        Self::DecodingError {
            message: message.into(),
        }
    }

    fn invalid_claims(message: impl Into<String>) -> Self {
        Self::InvalidClaims {
            message: message.into(),
        }
    }

    fn invalid_key(message: impl Into<String>) -> Self {
        Self::InvalidKey {
            message: message.into(),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::InvalidAudience
            | ErrorKind::InvalidIssuer
            | ErrorKind::InvalidSubject
            | ErrorKind::MissingRequiredClaim(_) => Self::invalid_claims(err.to_string()),
            ErrorKind::InvalidRsaKey(_) | ErrorKind::InvalidKeyFormat => {
                Self::invalid_key(err.to_string())
            }
            _ => Self::decoding_error(err.to_string()),
        }
    }
}

// ============================================================================
// Signing Algorithm
// ============================================================================

/// Supported signing algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SigningAlgorithm {
    /// HMAC with SHA-256 (symmetric shared secret).
    HS256,
    /// RSA with SHA-256 (asymmetric key pair).
    RS256,
}

impl SigningAlgorithm {
    /// Converts to the `jsonwebtoken` Algorithm type.
    #[must_use]
    pub fn to_jwt_algorithm(self) -> Algorithm {
        match self {
            Self::HS256 => Algorithm::HS256,
            Self::RS256 => Algorithm::RS256,
        }
    }

    /// Returns the algorithm name as used in JWT headers.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HS256 => "HS256",
            Self::RS256 => "RS256",
        }
    }
}

impl std::fmt::Display for SigningAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Access Token Claims
// ============================================================================

/// Claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccessTokenClaims {
    /// Subject: the user ID, or the client ID for client_credentials.
    pub sub: String,

    /// Granted scopes (space-separated).
    pub scope: String,

    /// Client the token was issued to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    /// Issued at (Unix timestamp).
    pub iat: i64,

    /// Expiration time (Unix timestamp).
    pub exp: i64,
}

impl AccessTokenClaims {
    /// Builds a claim set for a token issued at `issued_at` with the given
    /// lifetime. Pure construction; signing happens separately.
    #[must_use]
    pub fn new(
        subject: impl Into<String>,
        scope: impl Into<String>,
        client_id: Option<&str>,
        issued_at: OffsetDateTime,
        lifetime: Duration,
    ) -> Self {
        let iat = issued_at.unix_timestamp();
        Self {
            sub: subject.into(),
            scope: scope.into(),
            client_id: client_id.map(ToOwned::to_owned),
            iat,
            exp: iat + lifetime.whole_seconds(),
        }
    }

    /// Returns `true` if the claim set grants the given scope token.
    #[must_use]
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scope.split_whitespace().any(|s| s == scope)
    }
}

// ============================================================================
// Signing Key
// ============================================================================

/// Key material for signing and verifying access tokens.
pub struct SigningKey {
    algorithm: SigningAlgorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl SigningKey {
    /// Creates an HS256 key from a shared secret.
    #[must_use]
    pub fn hs256(secret: &str) -> Self {
        Self {
            algorithm: SigningAlgorithm::HS256,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Loads an RS256 key pair from PEM-encoded keys.
    ///
    /// # Errors
    ///
    /// Returns an error if the PEM data is invalid.
    pub fn rs256_from_pem(private_pem: &str, public_pem: &str) -> Result<Self, JwtError> {
        let encoding_key = EncodingKey::from_rsa_pem(private_pem.as_bytes())
            .map_err(|e| JwtError::invalid_key(e.to_string()))?;
        let decoding_key = DecodingKey::from_rsa_pem(public_pem.as_bytes())
            .map_err(|e| JwtError::invalid_key(e.to_string()))?;

        Ok(Self {
            algorithm: SigningAlgorithm::RS256,
            encoding_key,
            decoding_key,
        })
    }

    /// Generates a fresh RS256 key pair.
    ///
    /// Intended for development and tests; production deployments load
    /// persistent keys via [`SigningKey::rs256_from_pem`].
    ///
    /// # Errors
    ///
    /// Returns an error if key generation fails.
    pub fn generate_rs256() -> Result<Self, JwtError> {
        let bits = 2048;
        let private_key = RsaPrivateKey::new(&mut OsRng, bits).map_err(|e| {
            JwtError::KeyGenerationError {
                message: e.to_string(),
            }
        })?;

        let private_pem =
            private_key
                .to_pkcs8_pem(LineEnding::LF)
                .map_err(|e| JwtError::KeyGenerationError {
                    message: e.to_string(),
                })?;
        let public_pem = private_key
            .to_public_key()
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| JwtError::KeyGenerationError {
                message: e.to_string(),
            })?;

        Self::rs256_from_pem(&private_pem, &public_pem)
    }

    /// Returns the signing algorithm of this key.
    #[must_use]
    pub fn algorithm(&self) -> SigningAlgorithm {
        self.algorithm
    }
}

// ============================================================================
// JWT Service
// ============================================================================

/// Stateless signer/verifier for access tokens.
///
/// Thread-safe (`Send + Sync`); shared across request handlers behind an
/// `Arc`.
pub struct JwtService {
    key: SigningKey,
}

impl JwtService {
    /// Creates a new JWT service with the given key.
    #[must_use]
    pub fn new(key: SigningKey) -> Self {
        Self { key }
    }

    /// Encodes claims into a signed compact JWT.
    ///
    /// # Errors
    ///
    /// Returns an error if signing fails.
    pub fn encode<T: Serialize>(&self, claims: &T) -> Result<String, JwtError> {
        let header = Header::new(self.key.algorithm.to_jwt_algorithm());
        encode(&header, claims, &self.key.encoding_key).map_err(|e| JwtError::EncodingError {
            message: e.to_string(),
        })
    }

    /// Decodes and validates a JWT: signature, well-formedness, and expiry.
    ///
    /// # Errors
    ///
    /// Returns an error on bad signature, malformed payload, or expiry.
    pub fn decode<T: DeserializeOwned>(&self, token: &str) -> Result<TokenData<T>, JwtError> {
        let mut validation = Validation::new(self.key.algorithm.to_jwt_algorithm());
        validation.validate_exp = true;
        validation.validate_aud = false;

        decode(token, &self.key.decoding_key, &validation).map_err(JwtError::from)
    }

    /// Returns the signing algorithm in use.
    #[must_use]
    pub fn algorithm(&self) -> SigningAlgorithm {
        self.key.algorithm()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn test_claims(lifetime: Duration) -> AccessTokenClaims {
        AccessTokenClaims::new(
            "1",
            "get_user_info",
            Some("auth-code-client"),
            OffsetDateTime::now_utc(),
            lifetime,
        )
    }

    #[test]
    fn test_hs256_encode_decode() {
        let service = JwtService::new(SigningKey::hs256("0a1b2c3d4e5f6g7h8i9j0k1l2m3n4o5p6"));
        let claims = test_claims(Duration::minutes(15));

        let token = service.encode(&claims).unwrap();
        assert_eq!(token.split('.').count(), 3);

        let decoded = service.decode::<AccessTokenClaims>(&token).unwrap();
        assert_eq!(decoded.claims.sub, "1");
        assert_eq!(decoded.claims.scope, "get_user_info");
        assert_eq!(decoded.claims.client_id.as_deref(), Some("auth-code-client"));
        assert_eq!(decoded.claims.exp - decoded.claims.iat, 900);
    }

    #[test]
    fn test_rs256_encode_decode() {
        let service = JwtService::new(SigningKey::generate_rs256().unwrap());
        let claims = test_claims(Duration::minutes(15));

        let token = service.encode(&claims).unwrap();
        let decoded = service.decode::<AccessTokenClaims>(&token).unwrap();
        assert_eq!(decoded.claims.sub, "1");
    }

    #[test]
    fn test_decode_rejects_wrong_secret() {
        let signer = JwtService::new(SigningKey::hs256("secret-a"));
        let verifier = JwtService::new(SigningKey::hs256("secret-b"));

        let token = signer.encode(&test_claims(Duration::minutes(15))).unwrap();
        let result = verifier.decode::<AccessTokenClaims>(&token);
        assert!(matches!(result, Err(JwtError::InvalidSignature)));
    }

    #[test]
    fn test_decode_rejects_tampered_payload() {
        let service = JwtService::new(SigningKey::hs256("secret"));
        let token = service.encode(&test_claims(Duration::minutes(15))).unwrap();

        // Swap the payload segment for a different (validly encoded) one
        let other = service
            .encode(&AccessTokenClaims::new(
                "2",
                "get_admin_info",
                None,
                OffsetDateTime::now_utc(),
                Duration::minutes(15),
            ))
            .unwrap();
        let parts: Vec<&str> = token.split('.').collect();
        let other_parts: Vec<&str> = other.split('.').collect();
        let tampered = format!("{}.{}.{}", parts[0], other_parts[1], parts[2]);

        assert!(service.decode::<AccessTokenClaims>(&tampered).is_err());
    }

    #[test]
    fn test_decode_rejects_expired() {
        let service = JwtService::new(SigningKey::hs256("secret"));

        // Expired well past any default leeway
        let claims = AccessTokenClaims::new(
            "1",
            "get_user_info",
            None,
            OffsetDateTime::now_utc() - Duration::hours(2),
            Duration::minutes(15),
        );
        let token = service.encode(&claims).unwrap();

        let result = service.decode::<AccessTokenClaims>(&token);
        assert!(matches!(result, Err(JwtError::Expired)));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let service = JwtService::new(SigningKey::hs256("secret"));
        assert!(service.decode::<AccessTokenClaims>("not-a-jwt").is_err());
        assert!(service.decode::<AccessTokenClaims>("a.b.c").is_err());
    }

    #[test]
    fn test_claims_has_scope() {
        let claims = AccessTokenClaims::new(
            "1",
            "get_user_info get_admin_info",
            None,
            OffsetDateTime::now_utc(),
            Duration::minutes(15),
        );
        assert!(claims.has_scope("get_user_info"));
        assert!(claims.has_scope("get_admin_info"));
        assert!(!claims.has_scope("get_client_info"));
        assert!(!claims.has_scope("get_user"));
    }

    #[test]
    fn test_claims_client_id_omitted_when_absent() {
        let claims = AccessTokenClaims::new(
            "1",
            "get_user_info",
            None,
            OffsetDateTime::now_utc(),
            Duration::minutes(15),
        );
        let json = serde_json::to_string(&claims).unwrap();
        assert!(!json.contains("client_id"));
    }
}
