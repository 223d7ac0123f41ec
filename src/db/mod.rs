//! Flat-file persistence.
//!
//! Each entity collection lives in one JSON file inside the data directory. There is no
//! database engine: every mutation rewrites the whole file through [`write_atomic`].

mod repository;
mod store;

pub use repository::*;
pub use store::*;

use std::path::Path;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::errors::AppError;

/// Backing file for the post collection.
pub const POSTS_FILE: &str = "posts.json";

/// A record that can live in an [`EntityStore`].
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    type Id: PartialEq + Copy + std::fmt::Display + Send + Sync;

    fn id(&self) -> Self::Id;
}

/// Generic CRUD over a collection of entities.
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    /// Persist a new entity and return it as stored.
    async fn create(&self, entity: T) -> Result<T, AppError>;

    /// Replace the stored entity carrying the same id.
    async fn update(&self, entity: T) -> Result<T, AppError>;

    /// Remove the stored entity carrying the same id.
    async fn delete(&self, entity: &T) -> Result<(), AppError>;

    async fn get_all(&self) -> Result<Vec<T>, AppError>;

    async fn get_by_id(&self, id: T::Id) -> Result<Option<T>, AppError>;
}

/// Ensure the data directory exists.
pub async fn init_data_dir(data_dir: &Path) -> Result<(), AppError> {
    fs::create_dir_all(data_dir).await?;
    Ok(())
}

/// Read a JSON document, returning `None` if the file does not exist.
pub(crate) async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, AppError> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    serde_json::from_slice(&bytes).map(Some).map_err(|e| {
        tracing::error!("Backing file {} is corrupt: {}", path.display(), e);
        AppError::StorageCorrupt(format!("Cannot parse {}: {}", path.display(), e))
    })
}

/// Serialize `value` and atomically replace the file at `path` with it.
pub(crate) async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), AppError> {
    let contents = serde_json::to_vec_pretty(value)
        .map_err(|e| AppError::Internal(format!("Failed to serialize {}: {}", path.display(), e)))?;
    write_atomic(path, &contents).await
}

/// Write to a sibling temp file, sync it, then rename it over `path`.
///
/// Readers see either the old file or the new one, never a partial write.
pub(crate) async fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }

    let tmp_name = format!(
        "{}.tmp-{}",
        path.file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("store"),
        std::process::id()
    );
    let tmp_path = path.with_file_name(tmp_name);

    let mut file = fs::File::create(&tmp_path).await?;
    file.write_all(contents).await?;
    file.sync_all().await?;
    drop(file);

    if let Err(e) = fs::rename(&tmp_path, path).await {
        fs::remove_file(&tmp_path).await.ok();
        return Err(e.into());
    }

    tracing::debug!("Wrote {} bytes to {}", contents.len(), path.display());
    Ok(())
}
