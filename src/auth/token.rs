//! Session tokens: HS256 JWTs keyed by the stored signing secret.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Tokens are accepted for this long after issuance.
pub const TOKEN_LIFETIME_DAYS: i64 = 3;

/// Claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Operator login at issuance
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
}

/// Issue a token for `username`, valid for [`TOKEN_LIFETIME_DAYS`] from `now`.
pub fn issue_token(
    secret: &str,
    username: &str,
    now: DateTime<Utc>,
) -> Result<(String, DateTime<Utc>), AppError> {
    let expires = now + Duration::days(TOKEN_LIFETIME_DAYS);
    let claims = Claims {
        sub: username.to_string(),
        iat: now.timestamp(),
        exp: expires.timestamp(),
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))?;

    Ok((token, expires))
}

/// Check the signature against `secret`, then the expiry.
pub fn verify_token(secret: &str, token: &str) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "sub"]);

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;
    Ok(data.claims)
}

/// Random signing secret: 48 bytes from the OS RNG, base64-printed (64 characters).
pub fn generate_secret() -> Result<String, AppError> {
    let mut bytes = [0u8; 48];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| AppError::Internal("System RNG unavailable".to_string()))?;
    Ok(STANDARD.encode(bytes))
}
