//! Tag API endpoints.

use axum::extract::State;

use super::{success, ApiResult};
use crate::AppState;

/// GET /api/tags - Every tag used by at least one post.
pub async fn list_tags(State(state): State<AppState>) -> ApiResult<Vec<String>> {
    success(state.repo.get_tags().await?)
}
