//! Generic entity store backed by a single JSON file.
//!
//! The collection is loaded on first access and cached. Every mutation is a
//! read-modify-write of the whole collection followed by a full file rewrite, all
//! under one lock per store, so at most one writer touches the backing file at a time.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{read_json, write_json, Entity, Repository};
use crate::errors::AppError;

/// Durable ordered collection of `T`, one backing file per store.
pub struct EntityStore<T> {
    path: PathBuf,
    cache: Mutex<Option<Vec<T>>>,
}

impl<T: Entity> EntityStore<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: Mutex::new(None),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Deserialize the backing file. Missing file yields an empty collection.
    pub async fn load_all(&self) -> Result<Vec<T>, AppError> {
        Ok(read_json(&self.path).await?.unwrap_or_default())
    }

    /// Overwrite the backing file with `entities`.
    pub async fn save_all(&self, entities: Vec<T>) -> Result<(), AppError> {
        let mut cache = self.cache.lock().await;
        write_json(&self.path, &entities).await?;
        *cache = Some(entities);
        Ok(())
    }

    /// Run `f` against the authoritative collection and persist the result.
    ///
    /// The cache is only replaced after the file write succeeds, so an error from
    /// `f` or from the write leaves both untouched.
    pub async fn modify<R, F>(&self, f: F) -> Result<R, AppError>
    where
        F: FnOnce(&mut Vec<T>) -> Result<R, AppError> + Send,
        R: Send,
    {
        let mut cache = self.cache.lock().await;
        let mut working = match cache.as_ref() {
            Some(entities) => entities.clone(),
            None => self.load_all().await?,
        };

        let result = f(&mut working)?;

        write_json(&self.path, &working).await?;
        *cache = Some(working);
        Ok(result)
    }

    /// Current contents, loading from disk on first access.
    pub async fn snapshot(&self) -> Result<Vec<T>, AppError> {
        let mut cache = self.cache.lock().await;
        if let Some(entities) = cache.as_ref() {
            return Ok(entities.clone());
        }

        let entities = self.load_all().await?;
        tracing::debug!(
            "Loaded {} records from {}",
            entities.len(),
            self.path.display()
        );
        *cache = Some(entities.clone());
        Ok(entities)
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for EntityStore<T> {
    async fn create(&self, entity: T) -> Result<T, AppError> {
        self.modify(move |entities| {
            entities.push(entity.clone());
            Ok(entity)
        })
        .await
    }

    async fn update(&self, entity: T) -> Result<T, AppError> {
        self.modify(move |entities| {
            let slot = entities
                .iter_mut()
                .find(|e| e.id() == entity.id())
                .ok_or_else(|| AppError::NotFound(format!("Entity {} not found", entity.id())))?;
            *slot = entity.clone();
            Ok(entity)
        })
        .await
    }

    async fn delete(&self, entity: &T) -> Result<(), AppError> {
        let id = entity.id();
        self.modify(move |entities| {
            let index = entities
                .iter()
                .position(|e| e.id() == id)
                .ok_or_else(|| AppError::NotFound(format!("Entity {} not found", id)))?;
            entities.remove(index);
            Ok(())
        })
        .await
    }

    async fn get_all(&self) -> Result<Vec<T>, AppError> {
        self.snapshot().await
    }

    async fn get_by_id(&self, id: T::Id) -> Result<Option<T>, AppError> {
        let entities = self.snapshot().await?;
        Ok(entities.into_iter().find(|e| e.id() == id))
    }
}
