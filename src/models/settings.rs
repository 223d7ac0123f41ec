//! Singleton settings records and the auth DTOs built on them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Operator credentials. `password_hash` is `base64(salt[16] || key[20])`.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub login: String,
    pub password_hash: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("login", &self.login)
            .field("password_hash", &"<redacted>")
            .finish()
    }
}

/// Symmetric key used to sign session tokens.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Secret {
    pub value: String,
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secret")
            .field("value", &format!("<{} chars>", self.value.chars().count()))
            .finish()
    }
}

/// "About me" page content.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct About {
    #[serde(default)]
    pub about: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_id: Option<Uuid>,
}

/// Site header banner.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_id: Option<Uuid>,
}

/// Request body for the login endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Issued session token and when it stops being accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub expiration_date: DateTime<Utc>,
}

/// Single-value body used by the rotation endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ValueRequest {
    pub value: String,
}

/// Combined credential update. Blank or missing fields keep the current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CredentialUpdate {
    #[serde(default)]
    pub login: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub secret: Option<String>,
}

/// Request body for the about page update.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAboutRequest {
    pub about: String,
    /// Base64-encoded replacement image; the current image is kept when absent.
    #[serde(default)]
    pub image: Option<String>,
}
