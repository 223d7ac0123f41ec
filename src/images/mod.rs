//! Image storage used by posts and site settings.
//!
//! Images are opaque byte blobs addressed by a random UUID.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use uuid::Uuid;

use crate::db::write_atomic;
use crate::errors::AppError;

/// Storage for uploaded images.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store `bytes` and return the new image id.
    async fn save_image(&self, bytes: &[u8]) -> Result<Uuid, AppError>;

    /// Remove an image. Deleting an unknown id is a no-op.
    async fn delete_image(&self, id: Uuid) -> Result<(), AppError>;

    async fn read_image(&self, id: Uuid) -> Result<Option<Vec<u8>>, AppError>;

    async fn list(&self) -> Result<Vec<Uuid>, AppError>;

    /// Public URI under which the image is served.
    fn resolve_uri(&self, host_path: &str, id: Uuid) -> String {
        format!("{}/images/{}", host_path.trim_end_matches('/'), id)
    }
}

/// Images stored as one file per id in a directory.
pub struct FileImageStore {
    dir: PathBuf,
}

impl FileImageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn image_path(&self, id: Uuid) -> PathBuf {
        self.dir.join(id.to_string())
    }
}

#[async_trait]
impl ImageStore for FileImageStore {
    async fn save_image(&self, bytes: &[u8]) -> Result<Uuid, AppError> {
        if bytes.is_empty() {
            return Err(AppError::Validation("Image is empty".to_string()));
        }

        let id = Uuid::new_v4();
        write_atomic(&self.image_path(id), bytes).await?;
        tracing::info!("Saved image {} ({} bytes)", id, bytes.len());
        Ok(id)
    }

    async fn delete_image(&self, id: Uuid) -> Result<(), AppError> {
        match fs::remove_file(self.image_path(id)).await {
            Ok(()) => {
                tracing::info!("Deleted image {}", id);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn read_image(&self, id: Uuid) -> Result<Option<Vec<u8>>, AppError> {
        match fs::read(self.image_path(id)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self) -> Result<Vec<Uuid>, AppError> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            // Temp files from in-flight writes don't parse as UUIDs.
            if let Some(id) = entry
                .file_name()
                .to_str()
                .and_then(|name| Uuid::parse_str(name).ok())
            {
                ids.push(id);
            }
        }
        ids.sort();
        Ok(ids)
    }
}
