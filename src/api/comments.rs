//! Comment API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use super::{success, ApiResult};
use crate::db::Repository;
use crate::errors::AppError;
use crate::models::{Comment, CreateCommentRequest};
use crate::AppState;

/// POST /api/posts/{id}/comments - Add a reader comment.
pub async fn add_comment(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    Json(request): Json<CreateCommentRequest>,
) -> ApiResult<Comment> {
    if request.author.trim().is_empty() {
        return Err(AppError::Validation("Author is required".to_string()));
    }
    if request.content.trim().is_empty() {
        return Err(AppError::Validation("Content is required".to_string()));
    }

    let mut post = state
        .repo
        .get_by_id(post_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post {} not found", post_id)))?;

    let comment = Comment::new(request.author, request.email, request.content);
    success(state.repo.add_comment(&mut post, comment).await?)
}

/// DELETE /api/posts/{id}/comments/{comment_id} - Remove a comment.
///
/// Deleting a comment that is already gone succeeds.
pub async fn delete_comment(
    State(state): State<AppState>,
    Path((post_id, comment_id)): Path<(i64, Uuid)>,
) -> ApiResult<()> {
    let mut post = state
        .repo
        .get_by_id(post_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post {} not found", post_id)))?;

    let Some(comment) = post.comments.iter().find(|c| c.id == comment_id).cloned() else {
        return success(());
    };

    state.repo.delete_comment(&mut post, &comment).await?;
    success(())
}
