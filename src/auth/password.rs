//! Account secret hashing: Argon2id with a fixed cost, stored as a PHC string.

use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use thiserror::Error;

/// 19 MiB, 2 passes, 1 lane. Changing these only affects new hashes;
/// existing secrets verify with the cost recorded in their PHC string.
const MEMORY_KIB: u32 = 19 * 1024;
const ITERATIONS: u32 = 2;
const LANES: u32 = 1;

#[derive(Debug, Error)]
pub enum HashError {
    #[error("invalid hashing cost: {0}")]
    Params(argon2::Error),
    #[error("failed to hash secret: {0}")]
    Hash(password_hash::Error),
    #[error("stored secret is not a PHC string: {0}")]
    Malformed(password_hash::Error),
}

fn hasher() -> Result<Argon2<'static>, HashError> {
    let params = Params::new(MEMORY_KIB, ITERATIONS, LANES, None).map_err(HashError::Params)?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hashes a plaintext secret with a fresh random salt.
pub fn hash_secret(plain: &str) -> Result<String, HashError> {
    let salt = SaltString::generate(&mut OsRng);
    hasher()?
        .hash_password(plain.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(HashError::Hash)
}

/// `Ok(false)` means a well-formed hash that does not match.
pub fn secret_matches(plain: &str, stored: &str) -> Result<bool, HashError> {
    let parsed = PasswordHash::new(stored).map_err(HashError::Malformed)?;
    match hasher()?.verify_password(plain.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(HashError::Hash(e)),
    }
}
