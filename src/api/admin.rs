//! Operator account and site settings endpoints.

use axum::{body::Bytes, extract::State, Json};
use base64::{engine::general_purpose::STANDARD, Engine};
use uuid::Uuid;

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{
    About, CredentialUpdate, Header, LoginRequest, LoginResponse, UpdateAboutRequest,
    ValueRequest,
};
use crate::AppState;

/// POST /api/admin/auth - Exchange credentials for a session token.
pub async fn authenticate(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let auth = state.auth.clone();
    let response = tokio::task::spawn_blocking(move || {
        auth.authenticate(&request.username, &request.password)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    success(response)
}

/// POST /api/admin/password - Change the operator password.
pub async fn change_password(
    State(state): State<AppState>,
    Json(request): Json<ValueRequest>,
) -> ApiResult<()> {
    state.auth.change_password(&request.value).await?;
    success(())
}

/// POST /api/admin/login - Change the operator login name.
pub async fn change_login(
    State(state): State<AppState>,
    Json(request): Json<ValueRequest>,
) -> ApiResult<()> {
    state.auth.change_login(&request.value).await?;
    success(())
}

/// POST /api/admin/secret - Rotate the token signing secret.
///
/// Every token issued before the rotation stops being accepted.
pub async fn change_secret(
    State(state): State<AppState>,
    Json(request): Json<ValueRequest>,
) -> ApiResult<()> {
    state.auth.change_secret(&request.value).await?;
    success(())
}

/// POST /api/admin/credentials - Update login, password and secret together.
pub async fn update_credentials(
    State(state): State<AppState>,
    Json(request): Json<CredentialUpdate>,
) -> ApiResult<()> {
    state.auth.update_credentials(request).await?;
    success(())
}

/// GET /api/about
pub async fn get_about(State(state): State<AppState>) -> ApiResult<About> {
    success(About::clone(&state.site.about()))
}

/// GET /api/header
pub async fn get_header(State(state): State<AppState>) -> ApiResult<Header> {
    success(Header::clone(&state.site.header()))
}

/// POST /api/admin/about - Replace the about text and optionally its image.
pub async fn update_about(
    State(state): State<AppState>,
    Json(request): Json<UpdateAboutRequest>,
) -> ApiResult<About> {
    let image = request
        .image
        .as_deref()
        .map(|encoded| STANDARD.decode(encoded))
        .transpose()
        .map_err(|e| AppError::Validation(format!("Image is not valid base64: {}", e)))?;

    let about = state
        .site
        .update_about(request.about, image.as_deref())
        .await?;
    success(About::clone(&about))
}

/// POST /api/admin/header - Upload a new header image (raw body).
pub async fn update_header(State(state): State<AppState>, body: Bytes) -> ApiResult<Uuid> {
    success(state.site.update_header(&body).await?)
}
