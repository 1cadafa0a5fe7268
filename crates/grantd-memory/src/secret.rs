//! Argon2id hashing for client secrets and user passwords.
//!
//! Hashing mechanics live in this backend crate; the core only sees the
//! boolean outcome through the store traits.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use grantd_auth::{AuthError, AuthResult};

/// Hashes a secret with Argon2id and a fresh random salt.
///
/// Returns a PHC-formatted hash string.
///
/// # Errors
///
/// Returns `ServerError` if hashing fails (rare).
pub fn hash_secret(secret: &str) -> AuthResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map_err(|e| AuthError::server_error(format!("failed to hash secret: {e}")))?;
    Ok(hash.to_string())
}

/// Verifies a secret against a PHC-formatted Argon2 hash.
///
/// Returns `false` on mismatch; an unparseable hash is a `ServerError`
/// (it means corrupted registration data, not a bad credential).
///
/// # Errors
///
/// Returns `ServerError` if the stored hash does not parse.
pub fn verify_secret(secret: &str, hash: &str) -> AuthResult<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| AuthError::server_error(format!("stored hash does not parse: {e}")))?;
    Ok(Argon2::default()
        .verify_password(secret.as_bytes(), &parsed)
        .is_ok())
}
