//! Single-operator authentication.
//!
//! Verifies the operator's password against the stored salted hash, issues signed
//! session tokens, and owns rotation of the login, password and signing secret.

mod password;
mod token;

pub use password::{hash_password, verify_password};
pub use token::{generate_secret, issue_token, verify_token, Claims, TOKEN_LIFETIME_DAYS};

use std::sync::Arc;

use axum::{
    extract::Request,
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use subtle::ConstantTimeEq;

use crate::errors::AppError;
use crate::models::{CredentialUpdate, Credentials, LoginResponse, Secret};
use crate::settings::WritableSettings;

/// Minimum length of the token signing secret, in characters.
pub const MIN_SECRET_LEN: usize = 64;

/// Authentication and credential rotation over the persisted settings records.
pub struct AuthService {
    credentials: WritableSettings<Credentials>,
    secret: WritableSettings<Secret>,
}

impl AuthService {
    pub fn new(credentials: WritableSettings<Credentials>, secret: WritableSettings<Secret>) -> Self {
        Self {
            credentials,
            secret,
        }
    }

    /// Current login name.
    pub fn login(&self) -> String {
        self.credentials.current().login.clone()
    }

    /// Check the credentials and issue a session token.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<LoginResponse, AppError> {
        let credentials = self.credentials.current();

        // Derive the key even when the login does not match.
        let valid_password = verify_password(&credentials.password_hash, password)?;
        let valid_login = constant_time_compare(username, &credentials.login);

        if !(valid_login && valid_password) {
            tracing::warn!("Declined login attempt for {:?}", username);
            return Err(AppError::InvalidCredentials);
        }

        let (token, expiration_date) = issue_token(&self.secret.current().value, username, Utc::now())?;
        tracing::info!("Issued session token for {:?}", username);

        Ok(LoginResponse {
            token,
            expiration_date,
        })
    }

    /// Validate a session token against the current signing secret.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AppError> {
        verify_token(&self.secret.current().value, token)
    }

    /// Re-hash and store a new password. Live sessions stay valid.
    pub async fn change_password(&self, new_password: &str) -> Result<(), AppError> {
        let password_hash = hash_in_background(require_non_blank("Password", new_password)?).await?;
        self.credentials
            .update(move |current| Credentials {
                login: current.login.clone(),
                password_hash,
            })
            .await?;
        tracing::info!("Operator password changed");
        Ok(())
    }

    /// Replace the login name. Live sessions stay valid.
    pub async fn change_login(&self, new_login: &str) -> Result<(), AppError> {
        let login = require_non_blank("Login", new_login)?.to_string();
        self.credentials
            .update(move |current| Credentials {
                login,
                password_hash: current.password_hash.clone(),
            })
            .await?;
        tracing::info!("Operator login changed");
        Ok(())
    }

    /// Replace the signing secret. Every token signed with the old one stops verifying.
    pub async fn change_secret(&self, new_secret: &str) -> Result<(), AppError> {
        check_secret(new_secret)?;
        let value = new_secret.to_string();
        self.secret.update(move |_| Secret { value }).await?;
        tracing::info!("Signing secret rotated; existing sessions invalidated");
        Ok(())
    }

    /// Apply any combination of login, password and secret changes.
    ///
    /// Blank fields keep their current value. Everything is validated before any
    /// record is written. The secret is written first: if that write fails the
    /// credentials stay as they were. The two records are not updated atomically, so
    /// a failure writing the credentials leaves the new secret in place.
    pub async fn update_credentials(&self, update: CredentialUpdate) -> Result<(), AppError> {
        let login = non_blank(update.login);
        let password = non_blank(update.password);
        let secret = non_blank(update.secret);

        if let Some(secret) = &secret {
            check_secret(secret)?;
        }
        let password_hash = match password {
            Some(password) => Some(hash_in_background(&password).await?),
            None => None,
        };

        if let Some(value) = secret {
            self.secret.update(move |_| Secret { value }).await?;
            tracing::info!("Signing secret rotated; existing sessions invalidated");
        }

        if login.is_some() || password_hash.is_some() {
            self.credentials
                .update(move |current| Credentials {
                    login: login.unwrap_or_else(|| current.login.clone()),
                    password_hash: password_hash.unwrap_or_else(|| current.password_hash.clone()),
                })
                .await?;
            tracing::info!("Operator credentials updated");
        }

        Ok(())
    }
}

/// Reject signing secrets shorter than [`MIN_SECRET_LEN`] characters.
pub fn check_secret(secret: &str) -> Result<(), AppError> {
    let actual = secret.chars().count();
    if actual < MIN_SECRET_LEN {
        return Err(AppError::SecretTooShort {
            min: MIN_SECRET_LEN,
            actual,
        });
    }
    Ok(())
}

/// Run the key derivation on the blocking pool.
async fn hash_in_background(password: &str) -> Result<String, AppError> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
}

fn require_non_blank<'a>(field: &str, value: &'a str) -> Result<&'a str, AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{} must not be empty", field)));
    }
    Ok(value)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Perform constant-time string comparison.
fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Bearer-token authentication layer for operator-only routes.
///
/// On success the verified [`Claims`] are attached to the request extensions.
pub async fn bearer_auth_layer(
    auth: Arc<AuthService>,
    mut request: Request,
    next: Next,
) -> Response {
    let bearer = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.trim().to_string());

    let Some(token) = bearer else {
        return AppError::Unauthorized("Missing bearer token".to_string()).into_response();
    };

    match auth.verify_token(&token) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(e) => {
            tracing::warn!("Rejected session token: {}", e.error_code());
            e.into_response()
        }
    }
}
