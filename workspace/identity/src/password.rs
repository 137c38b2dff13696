//! Password hashing with Argon2id.
//!
//! Hashes are stored as PHC strings. An "unusable" password is a `!` followed
//! by random characters: it can never be produced by the hasher, so it never
//! verifies.

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use rand::{Rng, distributions::Alphanumeric};
use tracing::debug;

use crate::error::{IdentityError, Result};

pub const UNUSABLE_PASSWORD_PREFIX: char = '!';
const UNUSABLE_PASSWORD_SUFFIX_LENGTH: usize = 40;

/// Hash a raw password into a PHC string.
pub fn hash_password(raw: &str) -> Result<String> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(raw.as_bytes(), &salt)
        .map_err(|e| IdentityError::PasswordHash(e.to_string()))?
        .to_string();
    Ok(hash)
}

/// Check a raw password against a stored value.
///
/// Unusable markers and values that are not Argon2 PHC strings (for example
/// hashes carried over from the legacy table) never verify.
pub fn verify_password(raw: &str, encoded: &str) -> bool {
    if !is_usable(encoded) {
        return false;
    }

    let parsed = match PasswordHash::new(encoded) {
        Ok(parsed) => parsed,
        Err(e) => {
            debug!("Stored password is not a PHC string: {}", e);
            return false;
        }
    };

    Argon2::default()
        .verify_password(raw.as_bytes(), &parsed)
        .is_ok()
}

pub fn unusable_password() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(UNUSABLE_PASSWORD_SUFFIX_LENGTH)
        .map(char::from)
        .collect();
    format!("{}{}", UNUSABLE_PASSWORD_PREFIX, suffix)
}

pub fn is_usable(encoded: &str) -> bool {
    !encoded.starts_with(UNUSABLE_PASSWORD_PREFIX)
}
