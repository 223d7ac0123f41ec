//! Image upload and serving endpoints.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap},
    response::IntoResponse,
};
use uuid::Uuid;

use super::{host_path, success, ApiResult};
use crate::errors::AppError;
use crate::images::ImageStore;
use crate::AppState;

/// POST /api/admin/upload - Store an image, returning its public URI.
pub async fn upload_image(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<String> {
    let id = state.images.save_image(&body).await?;
    success(state.images.resolve_uri(&host_path(&headers), id))
}

/// GET /api/admin/images - URIs of every stored image.
pub async fn list_images(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Vec<String>> {
    let host = host_path(&headers);
    let uris = state
        .images
        .list()
        .await?
        .into_iter()
        .map(|id| state.images.resolve_uri(&host, id))
        .collect();

    success(uris)
}

/// DELETE /api/admin/images/{id}
pub async fn delete_image(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<()> {
    state.images.delete_image(id).await?;
    success(())
}

/// GET /images/{id} - Raw image bytes.
pub async fn serve_image(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    match state.images.read_image(id).await? {
        Some(bytes) => Ok(([(header::CONTENT_TYPE, "application/octet-stream")], bytes)),
        None => Err(AppError::NotFound(format!("Image {} not found", id))),
    }
}
