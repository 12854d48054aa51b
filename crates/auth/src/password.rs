//! Argon2id password hashes in PHC string form

use argon2::Argon2;
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng};

use crate::error::{AuthError, Result};

/// Hash a password with a fresh random salt
///
/// ```
/// use tutor_auth::password::hash_password;
///
/// let hash = hash_password("Str0ng!pass").unwrap();
/// assert!(hash.starts_with("$argon2id$"));
/// ```
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Password(format!("hash failed: {}", e)))
}

/// Check a password against a stored hash
///
/// A mismatch is `Ok(false)`; an unparseable hash is an error.
pub fn verify_password(password: &str, stored: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored)
        .map_err(|e| AuthError::Password(format!("stored hash unreadable: {}", e)))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::Password(e.to_string())),
    }
}
