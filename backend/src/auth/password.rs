//! Argon2id password hashing.
//!
//! Hashes are stored as PHC strings (`$argon2id$v=19$m=...`) in the
//! `password_hash` column of the `users` table.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use std::sync::OnceLock;

use super::AuthError;

/// Hash verified for unknown usernames so failed logins cost the same either way.
static DUMMY_HASH: OnceLock<String> = OnceLock::new();

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::Hashing(e.to_string()))?;
    Ok(hash.to_string())
}

/// Check `password` against a stored PHC hash. `Ok(false)` on mismatch.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|e| AuthError::MalformedHash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

fn dummy_hash() -> Result<&'static str, AuthError> {
    if let Some(hash) = DUMMY_HASH.get() {
        return Ok(hash);
    }
    let hash = hash_password("worklocation-dummy-password")?;
    Ok(DUMMY_HASH.get_or_init(|| hash))
}

/// Check a login attempt against the stored hash of the user, if the user exists.
///
/// Blocking: runs a full Argon2 verification even when `stored_hash` is `None`.
pub fn verify_login(password: &str, stored_hash: Option<&str>) -> Result<bool, AuthError> {
    match stored_hash {
        Some(hash) => verify_password(password, hash),
        None => {
            verify_password(password, dummy_hash()?)?;
            Ok(false)
        }
    }
}
