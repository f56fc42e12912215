//! Password hashing with a server-wide pepper.
//!
//! The pepper is appended to the trimmed plaintext before hashing; argon2
//! contributes the per-password salt on top. Verifying with a different
//! pepper therefore fails even for the correct password.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

#[derive(Debug, thiserror::Error)]
#[error("password hashing failed: {0}")]
pub struct HashError(String);

/// Hash a plaintext password into a PHC string.
pub fn hash_password(plain: &str, pepper: &str) -> Result<String, HashError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(peppered(plain, pepper).as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| HashError(e.to_string()))
}

/// Verify a plaintext password against a stored PHC string.
///
/// An unparseable hash counts as a failed verification, not an error.
pub fn verify_password(hash: &str, plain: &str, pepper: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(peppered(plain, pepper).as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

fn peppered(plain: &str, pepper: &str) -> String {
    format!("{}{}", plain.trim(), pepper)
}
