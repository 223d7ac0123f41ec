//! Post and comment models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::Entity;

/// A blog post. Owns its comments exclusively.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Assigned by the repository on create as the current maximum plus one.
    #[serde(default)]
    pub id: i64,
    pub title: String,
    /// Serialized rich-text document, stored as-is.
    #[serde(default)]
    pub content: String,
    pub created: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl Post {
    pub fn new(title: impl Into<String>, content: impl Into<String>, categories: Vec<String>) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            title: title.into(),
            content: content.into(),
            created: now,
            last_modified: now,
            categories,
            comments: Vec::new(),
        }
    }

    /// Whether this post is tagged with `category` (exact, case-sensitive).
    pub fn has_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }
}

impl Entity for Post {
    type Id = i64;

    fn id(&self) -> i64 {
        self.id
    }
}

/// A reader comment attached to a post.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub post_id: i64,
    pub author: String,
    #[serde(default)]
    pub email: String,
    pub content: String,
    pub date: DateTime<Utc>,
}

impl Comment {
    /// Build an unattached comment. Id and post id are assigned on attach.
    pub fn new(
        author: impl Into<String>,
        email: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::nil(),
            post_id: 0,
            author: author.into(),
            email: email.into(),
            content: content.into(),
            date: Utc::now(),
        }
    }
}

/// Request body for creating a new post.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub categories: Vec<String>,
}

/// Request body for editing an existing post.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub categories: Option<Vec<String>>,
}

/// Request body for a new reader comment.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub author: String,
    #[serde(default)]
    pub email: String,
    pub content: String,
}

/// Query string for the paged post listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostsQuery {
    #[serde(default)]
    pub page: usize,
    #[serde(default)]
    pub category: Option<String>,
}

/// One page of posts plus the page count for the same filter.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPage {
    pub posts: Vec<Post>,
    pub max_pages: usize,
}
