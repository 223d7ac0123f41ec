//! Post API endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};

use super::{success, ApiResult};
use crate::db::Repository;
use crate::errors::AppError;
use crate::models::{CreatePostRequest, Post, PostPage, PostsQuery, UpdatePostRequest};
use crate::AppState;

/// GET /api/posts - One page of posts, newest first.
pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<PostsQuery>,
) -> ApiResult<PostPage> {
    let category = query.category.as_deref();
    let posts = state.repo.get_posts(query.page, category).await?;
    let max_pages = state.repo.get_max_pages(category).await?;

    success(PostPage { posts, max_pages })
}

/// GET /api/posts/{id} - Get a single post.
pub async fn get_post(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Post> {
    match state.repo.get_by_id(id).await? {
        Some(post) => success(post),
        None => Err(AppError::NotFound(format!("Post {} not found", id))),
    }
}

/// POST /api/posts - Create a new post.
pub async fn create_post(
    State(state): State<AppState>,
    Json(request): Json<CreatePostRequest>,
) -> ApiResult<Post> {
    // Validate required fields
    if request.title.trim().is_empty() {
        return Err(AppError::Validation("Title is required".to_string()));
    }
    if request.content.trim().is_empty() {
        return Err(AppError::Validation("Content is required".to_string()));
    }

    let mut post = Post::new(request.title, request.content, request.categories);
    if let Some(created) = request.created {
        post.created = created;
    }

    success(state.repo.create(post).await?)
}

/// PUT /api/posts/{id} - Edit a post.
pub async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdatePostRequest>,
) -> ApiResult<Post> {
    let mut post = state
        .repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post {} not found", id)))?;

    if let Some(title) = request.title {
        if title.trim().is_empty() {
            return Err(AppError::Validation("Title must not be empty".to_string()));
        }
        post.title = title;
    }
    if let Some(content) = request.content {
        post.content = content;
    }
    if let Some(categories) = request.categories {
        post.categories = categories;
    }

    success(state.repo.update(post).await?)
}

/// DELETE /api/posts/{id} - Delete a post and its comments.
pub async fn delete_post(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<()> {
    let post = state
        .repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post {} not found", id)))?;

    state.repo.delete(&post).await?;
    success(())
}
