//! Password hashing and verification

use anyhow::Result;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};

/// Hash a plaintext password with Argon2 and a fresh random salt
pub fn hash(plaintext: &str) -> Result<String> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(plaintext.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
        .to_string();

    Ok(hash)
}

/// Check a plaintext password against a stored hash.
///
/// An unparseable hash counts as a mismatch rather than an error so a
/// corrupt record can never be logged into.
pub fn verify(stored_hash: &str, plaintext: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(stored_hash) else {
        return false;
    };

    let argon2 = Argon2::default();
    argon2
        .verify_password(plaintext.as_bytes(), &parsed_hash)
        .is_ok()
}
