//! Salted password hashing.
//!
//! Stored format: `base64(salt[16] || pbkdf2_hmac_sha1(password, salt, 10_000)[20])`.

use std::num::NonZeroU32;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use ring::pbkdf2;
use ring::rand::{SecureRandom, SystemRandom};
use subtle::ConstantTimeEq;

use crate::errors::AppError;

pub const SALT_LEN: usize = 16;
pub const KEY_LEN: usize = 20;
pub const ENCODED_LEN: usize = SALT_LEN + KEY_LEN;

const ITERATIONS: NonZeroU32 = match NonZeroU32::new(10_000) {
    Some(n) => n,
    None => panic!("iteration count must be non-zero"),
};

/// Hash `plain` with a fresh random salt.
pub fn hash_password(plain: &str) -> Result<String, AppError> {
    let mut salt = [0u8; SALT_LEN];
    SystemRandom::new()
        .fill(&mut salt)
        .map_err(|_| AppError::Internal("System RNG unavailable".to_string()))?;

    let mut encoded = [0u8; ENCODED_LEN];
    encoded[..SALT_LEN].copy_from_slice(&salt);
    derive_key(&salt, plain, &mut encoded[SALT_LEN..]);

    Ok(STANDARD.encode(encoded))
}

/// Check `plain` against a stored hash.
///
/// A hash that does not decode to exactly [`ENCODED_LEN`] bytes is corrupt
/// configuration, reported as [`AppError::StorageCorrupt`] rather than a mismatch.
pub fn verify_password(encoded: &str, plain: &str) -> Result<bool, AppError> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|_| AppError::StorageCorrupt("Stored password hash is not valid base64".to_string()))?;

    if bytes.len() != ENCODED_LEN {
        tracing::error!(
            "Stored password hash has {} bytes, expected {}",
            bytes.len(),
            ENCODED_LEN
        );
        return Err(AppError::StorageCorrupt(format!(
            "Stored password hash has {} bytes, expected {}",
            bytes.len(),
            ENCODED_LEN
        )));
    }

    let (salt, stored) = bytes.split_at(SALT_LEN);
    let mut derived = [0u8; KEY_LEN];
    derive_key(salt, plain, &mut derived);

    // Constant-time comparison
    Ok(derived.as_slice().ct_eq(stored).into())
}

fn derive_key(salt: &[u8], plain: &str, out: &mut [u8]) {
    pbkdf2::derive(
        pbkdf2::PBKDF2_HMAC_SHA1,
        ITERATIONS,
        salt,
        plain.as_bytes(),
        out,
    );
}
