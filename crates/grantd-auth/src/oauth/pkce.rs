//! PKCE (Proof Key for Code Exchange) implementation.
//!
//! Implements RFC 7636 with the `S256` and `plain` challenge methods.
//! Challenge comparison is constant-time in both methods.
//!
//! # Example
//!
//! ```
//! use grantd_auth::oauth::pkce::{PkceChallenge, PkceMethod, PkceVerifier};
//!
//! // Client generates a verifier and challenge
//! let verifier = PkceVerifier::generate();
//! let challenge = PkceChallenge::from_verifier(&verifier);
//!
//! // Server stores the challenge, later verifies the verifier from the
//! // token request against it
//! assert!(challenge.verify(PkceMethod::S256, &verifier).is_ok());
//! ```

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during PKCE operations.
#[derive(Debug, thiserror::Error)]
pub enum PkceError {
    /// Verifier length is outside the valid range (43-128 characters).
    #[error("Invalid verifier length: must be 43-128 characters, got {0}")]
    InvalidVerifierLength(usize),

    /// Verifier contains characters outside `[A-Za-z0-9-._~]`.
    #[error("Invalid verifier characters: must be unreserved ([A-Za-z0-9-._~])")]
    InvalidVerifierCharacters,

    /// Challenge format is invalid for the declared method.
    #[error("Invalid challenge format")]
    InvalidChallengeFormat,

    /// Unsupported challenge method (only `plain` and `S256` exist).
    #[error("Unsupported challenge method: {0}")]
    UnsupportedMethod(String),

    /// Verifier does not match the stored challenge.
    #[error("PKCE verification failed: verifier does not match challenge")]
    VerificationFailed,
}

// =============================================================================
// Challenge Method
// =============================================================================

/// PKCE challenge method (RFC 7636 §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PkceMethod {
    /// Direct equality: `code_challenge == code_verifier`.
    #[serde(rename = "plain")]
    Plain,
    /// `code_challenge = BASE64URL(SHA256(ASCII(code_verifier)))`.
    #[serde(rename = "S256")]
    S256,
}

impl PkceMethod {
    /// Parses a challenge method from its wire value.
    ///
    /// # Errors
    ///
    /// Returns `PkceError::UnsupportedMethod` for anything other than
    /// `plain` or `S256`.
    pub fn parse(method: &str) -> Result<Self, PkceError> {
        match method {
            "plain" => Ok(Self::Plain),
            "S256" => Ok(Self::S256),
            other => Err(PkceError::UnsupportedMethod(other.to_string())),
        }
    }

    /// Returns the wire value of this method.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::S256 => "S256",
        }
    }
}

impl std::fmt::Display for PkceMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Verifier
// =============================================================================

/// PKCE code verifier.
///
/// Per RFC 7636 §4.1: a high-entropy random string of unreserved characters
/// `[A-Z] / [a-z] / [0-9] / "-" / "." / "_" / "~"`, 43 to 128 characters.
#[derive(Debug, Clone)]
pub struct PkceVerifier(String);

impl PkceVerifier {
    /// Creates a verifier from a string received in a token request.
    ///
    /// # Errors
    ///
    /// Returns an error if the length or character set violates RFC 7636.
    pub fn new(verifier: String) -> Result<Self, PkceError> {
        let len = verifier.len();
        if !(43..=128).contains(&len) {
            return Err(PkceError::InvalidVerifierLength(len));
        }

        if !verifier
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.' || c == '_' || c == '~')
        {
            return Err(PkceError::InvalidVerifierCharacters);
        }

        Ok(Self(verifier))
    }

    /// Generates a cryptographically random verifier.
    ///
    /// 32 random bytes encoded as base64url (43 characters).
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        rand::Rng::fill(&mut rand::thread_rng(), &mut bytes);
        Self(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Returns the verifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for PkceVerifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// Challenge
// =============================================================================

/// PKCE code challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkceChallenge(String);

impl PkceChallenge {
    /// Computes the S256 challenge for a verifier:
    /// `BASE64URL(SHA256(ASCII(code_verifier)))`.
    #[must_use]
    pub fn from_verifier(verifier: &PkceVerifier) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(verifier.0.as_bytes());
        Self(URL_SAFE_NO_PAD.encode(hasher.finalize()))
    }

    /// Validates a challenge string received at `/authorize`.
    ///
    /// For `S256` the challenge must be valid unpadded base64url of a
    /// 32-byte digest; for `plain` it must satisfy the verifier grammar
    /// (it *is* a verifier).
    ///
    /// # Errors
    ///
    /// Returns `PkceError::InvalidChallengeFormat` on malformed input.
    pub fn parse(challenge: String, method: PkceMethod) -> Result<Self, PkceError> {
        match method {
            PkceMethod::S256 => {
                let decoded = URL_SAFE_NO_PAD
                    .decode(&challenge)
                    .map_err(|_| PkceError::InvalidChallengeFormat)?;
                if decoded.len() != 32 {
                    return Err(PkceError::InvalidChallengeFormat);
                }
                Ok(Self(challenge))
            }
            PkceMethod::Plain => {
                PkceVerifier::new(challenge.clone())
                    .map_err(|_| PkceError::InvalidChallengeFormat)?;
                Ok(Self(challenge))
            }
        }
    }

    /// Verifies a verifier against this challenge with the given method.
    ///
    /// `S256` recomputes `BASE64URL(SHA256(verifier))`; `plain` compares
    /// directly. Both comparisons are constant-time.
    ///
    /// # Errors
    ///
    /// Returns `PkceError::VerificationFailed` on mismatch.
    pub fn verify(&self, method: PkceMethod, verifier: &PkceVerifier) -> Result<(), PkceError> {
        let expected = match method {
            PkceMethod::S256 => Self::from_verifier(verifier).0,
            PkceMethod::Plain => verifier.0.clone(),
        };

        if bool::from(self.0.as_bytes().ct_eq(expected.as_bytes())) {
            Ok(())
        } else {
            Err(PkceError::VerificationFailed)
        }
    }

    /// Returns the challenge as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the challenge and returns the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for PkceChallenge {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verifier_generation() {
        let verifier = PkceVerifier::generate();
        assert_eq!(verifier.as_str().len(), 43);
        assert!(
            verifier
                .as_str()
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_verifier_length_bounds() {
        assert!(matches!(
            PkceVerifier::new("a".repeat(42)),
            Err(PkceError::InvalidVerifierLength(42))
        ));
        assert!(PkceVerifier::new("a".repeat(43)).is_ok());
        assert!(PkceVerifier::new("a".repeat(128)).is_ok());
        assert!(matches!(
            PkceVerifier::new("a".repeat(129)),
            Err(PkceError::InvalidVerifierLength(129))
        ));
    }

    #[test]
    fn test_verifier_character_set() {
        let valid = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789-._~"
            .chars()
            .cycle()
            .take(64)
            .collect::<String>();
        assert!(PkceVerifier::new(valid).is_ok());

        let invalid = format!("{}{}", "a".repeat(42), "!");
        assert!(matches!(
            PkceVerifier::new(invalid),
            Err(PkceError::InvalidVerifierCharacters)
        ));
    }

    #[test]
    fn test_s256_verification_roundtrip() {
        let verifier = PkceVerifier::generate();
        let challenge = PkceChallenge::from_verifier(&verifier);
        assert_eq!(challenge.as_str().len(), 43);
        assert!(challenge.verify(PkceMethod::S256, &verifier).is_ok());
    }

    #[test]
    fn test_s256_verification_rejects_wrong_verifier() {
        let challenge = PkceChallenge::from_verifier(&PkceVerifier::generate());
        let other = PkceVerifier::generate();
        assert!(matches!(
            challenge.verify(PkceMethod::S256, &other),
            Err(PkceError::VerificationFailed)
        ));
    }

    #[test]
    fn test_s256_flipped_byte_always_fails() {
        let verifier = PkceVerifier::new("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk".to_string())
            .unwrap();
        let challenge = PkceChallenge::from_verifier(&verifier);

        // Flip each position in turn; none may verify
        let original = verifier.as_str().as_bytes().to_vec();
        for i in 0..original.len() {
            let mut flipped = original.clone();
            flipped[i] = if flipped[i] == b'A' { b'B' } else { b'A' };
            let Ok(candidate) = PkceVerifier::new(String::from_utf8(flipped).unwrap()) else {
                continue;
            };
            if candidate.as_str() == verifier.as_str() {
                continue;
            }
            assert!(challenge.verify(PkceMethod::S256, &candidate).is_err());
        }
    }

    #[test]
    fn test_plain_verification() {
        let verifier = PkceVerifier::generate();
        let challenge =
            PkceChallenge::parse(verifier.as_str().to_string(), PkceMethod::Plain).unwrap();

        assert!(challenge.verify(PkceMethod::Plain, &verifier).is_ok());
        assert!(
            challenge
                .verify(PkceMethod::Plain, &PkceVerifier::generate())
                .is_err()
        );
    }

    #[test]
    fn test_parse_s256_challenge() {
        assert!(
            PkceChallenge::parse(
                "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM".to_string(),
                PkceMethod::S256
            )
            .is_ok()
        );

        // Not base64url
        assert!(matches!(
            PkceChallenge::parse("not valid base64url!!!".to_string(), PkceMethod::S256),
            Err(PkceError::InvalidChallengeFormat)
        ));

        // Valid base64url but not a 32-byte digest
        assert!(matches!(
            PkceChallenge::parse("c2hvcnQ".to_string(), PkceMethod::S256),
            Err(PkceError::InvalidChallengeFormat)
        ));
    }

    #[test]
    fn test_parse_plain_challenge_uses_verifier_grammar() {
        assert!(PkceChallenge::parse("a".repeat(43), PkceMethod::Plain).is_ok());
        assert!(matches!(
            PkceChallenge::parse("short".to_string(), PkceMethod::Plain),
            Err(PkceError::InvalidChallengeFormat)
        ));
    }

    #[test]
    fn test_method_parse() {
        assert_eq!(PkceMethod::parse("S256").unwrap(), PkceMethod::S256);
        assert_eq!(PkceMethod::parse("plain").unwrap(), PkceMethod::Plain);
        assert!(matches!(
            PkceMethod::parse("s256"),
            Err(PkceError::UnsupportedMethod(_))
        ));
        assert!(matches!(
            PkceMethod::parse("none"),
            Err(PkceError::UnsupportedMethod(_))
        ));
    }

    #[test]
    fn test_method_serde_wire_values() {
        assert_eq!(serde_json::to_string(&PkceMethod::S256).unwrap(), r#""S256""#);
        assert_eq!(
            serde_json::to_string(&PkceMethod::Plain).unwrap(),
            r#""plain""#
        );
        let parsed: PkceMethod = serde_json::from_str(r#""S256""#).unwrap();
        assert_eq!(parsed, PkceMethod::S256);
    }

    #[test]
    fn test_rfc7636_appendix_b_test_vector() {
        // https://tools.ietf.org/html/rfc7636#appendix-B
        let verifier = PkceVerifier::new("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk".to_string())
            .unwrap();
        let challenge = PkceChallenge::from_verifier(&verifier);
        assert_eq!(
            challenge.as_str(),
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
        );

        let stored = PkceChallenge::parse(
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM".to_string(),
            PkceMethod::S256,
        )
        .unwrap();
        assert!(stored.verify(PkceMethod::S256, &verifier).is_ok());
    }
}
