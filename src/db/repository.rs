//! Post repository: sequential ids, paging, tag filtering and comment attachment
//! layered over an [`EntityStore`].

use std::collections::HashSet;
use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{EntityStore, Repository, POSTS_FILE};
use crate::errors::AppError;
use crate::models::{Comment, Post};

/// Fixed page size for post listings.
pub const POSTS_PER_PAGE: usize = 5;

/// Blog-specific operations over the post collection.
pub struct BlogRepository {
    store: EntityStore<Post>,
}

impl BlogRepository {
    pub fn new(store: EntityStore<Post>) -> Self {
        Self { store }
    }

    /// Repository over `posts.json` inside `data_dir`.
    pub fn open(data_dir: &Path) -> Self {
        Self::new(EntityStore::new(data_dir.join(POSTS_FILE)))
    }

    /// Posts newest first, optionally filtered by tag, one page of [`POSTS_PER_PAGE`].
    ///
    /// Pages past the end yield an empty list.
    pub async fn get_posts(
        &self,
        page: usize,
        category: Option<&str>,
    ) -> Result<Vec<Post>, AppError> {
        let mut posts = filter_by_category(self.store.snapshot().await?, category);
        // Stable sort: equal timestamps keep insertion order.
        posts.sort_by(|a, b| b.created.cmp(&a.created));

        Ok(posts
            .into_iter()
            .skip(page.saturating_mul(POSTS_PER_PAGE))
            .take(POSTS_PER_PAGE)
            .collect())
    }

    /// Number of pages available for the same filter as [`get_posts`](Self::get_posts).
    pub async fn get_max_pages(&self, category: Option<&str>) -> Result<usize, AppError> {
        let count = filter_by_category(self.store.snapshot().await?, category).len();
        Ok(count.div_ceil(POSTS_PER_PAGE))
    }

    /// Every distinct tag used by any post, in first-seen order.
    pub async fn get_tags(&self) -> Result<Vec<String>, AppError> {
        let posts = self.store.snapshot().await?;
        let mut seen = HashSet::new();
        Ok(posts
            .into_iter()
            .flat_map(|p| p.categories)
            .filter(|c| seen.insert(c.clone()))
            .collect())
    }

    /// Attach `comment` to `post` and persist.
    ///
    /// The comment gets a fresh random id and the post's id as back-reference. The
    /// change is applied to the stored post under the store lock, and `post` is
    /// refreshed with the persisted value.
    pub async fn add_comment(&self, post: &mut Post, comment: Comment) -> Result<Comment, AppError> {
        let post_id = post.id;
        let (stored, comment) = self
            .store
            .modify(move |posts| {
                let stored = find_post(posts, post_id)?;
                let comment = Comment {
                    id: Uuid::new_v4(),
                    post_id,
                    ..comment
                };
                stored.comments.push(comment.clone());
                Ok((stored.clone(), comment))
            })
            .await?;

        tracing::debug!("Added comment {} to post {}", comment.id, post_id);
        *post = stored;
        Ok(comment)
    }

    /// Remove `comment` from `post` and persist. Already-absent comments are a no-op.
    pub async fn delete_comment(&self, post: &mut Post, comment: &Comment) -> Result<(), AppError> {
        let post_id = post.id;
        let comment_id = comment.id;
        let stored = self
            .store
            .modify(move |posts| {
                let stored = find_post(posts, post_id)?;
                stored.comments.retain(|c| c.id != comment_id);
                Ok(stored.clone())
            })
            .await?;

        *post = stored;
        Ok(())
    }
}

#[async_trait]
impl Repository<Post> for BlogRepository {
    /// Assigns `max(existing ids) + 1`, or 0 on an empty store.
    async fn create(&self, mut post: Post) -> Result<Post, AppError> {
        let post = self
            .store
            .modify(move |posts| {
                post.id = posts.iter().map(|p| p.id).max().map_or(0, |max| max + 1);
                for comment in &mut post.comments {
                    comment.post_id = post.id;
                }
                posts.push(post.clone());
                Ok(post)
            })
            .await?;

        tracing::info!("Created post {} ({:?})", post.id, post.title);
        Ok(post)
    }

    /// Copies the editable fields onto the stored post. Comments are left as stored;
    /// they change only through [`add_comment`](BlogRepository::add_comment) and
    /// [`delete_comment`](BlogRepository::delete_comment).
    async fn update(&self, post: Post) -> Result<Post, AppError> {
        self.store
            .modify(move |posts| {
                let stored = find_post(posts, post.id)?;
                stored.title = post.title;
                stored.content = post.content;
                stored.created = post.created;
                stored.categories = post.categories;
                stored.last_modified = Utc::now();
                Ok(stored.clone())
            })
            .await
    }

    async fn delete(&self, post: &Post) -> Result<(), AppError> {
        self.store.delete(post).await?;
        tracing::info!("Deleted post {}", post.id);
        Ok(())
    }

    async fn get_all(&self) -> Result<Vec<Post>, AppError> {
        self.store.get_all().await
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Post>, AppError> {
        self.store.get_by_id(id).await
    }
}

/// Blank categories mean "no filter".
fn filter_by_category(posts: Vec<Post>, category: Option<&str>) -> Vec<Post> {
    match category.filter(|c| !c.trim().is_empty()) {
        Some(category) => posts.into_iter().filter(|p| p.has_category(category)).collect(),
        None => posts,
    }
}

fn find_post(posts: &mut [Post], id: i64) -> Result<&mut Post, AppError> {
    posts
        .iter_mut()
        .find(|p| p.id == id)
        .ok_or_else(|| AppError::NotFound(format!("Post {} not found", id)))
}
