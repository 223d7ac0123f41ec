//! Persisted singleton settings records.
//!
//! Each record (credentials, signing secret, about page, header) lives in its own JSON
//! file. Readers get a lock-free snapshot; writers are serialized per record and publish
//! a new snapshot only after it is durably on disk.

mod site;

pub use site::*;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::Mutex;

use crate::db::{read_json, write_json};
use crate::errors::AppError;

pub const CREDENTIALS_FILE: &str = "credentials.json";
pub const SECRET_FILE: &str = "secret.json";
pub const ABOUT_FILE: &str = "about.json";
pub const HEADER_FILE: &str = "header.json";

/// A hot-swappable settings record with write-through persistence.
pub struct WritableSettings<T> {
    path: PathBuf,
    current: ArcSwap<T>,
    write_lock: Mutex<()>,
}

impl<T> WritableSettings<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    /// Load an existing record. A missing file is `NotFound`.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let path = path.into();
        let value = read_json(&path)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Settings file {} not found", path.display())))?;
        Ok(Self::with_value(path, value))
    }

    /// Load a record, creating and persisting it with `init` if the file is missing.
    pub async fn open_or_init<F>(path: impl Into<PathBuf>, init: F) -> Result<Self, AppError>
    where
        F: FnOnce() -> Result<T, AppError>,
    {
        let path = path.into();
        if let Some(value) = read_json(&path).await? {
            return Ok(Self::with_value(path, value));
        }

        let value = init()?;
        write_json(&path, &value).await?;
        tracing::info!("Initialized settings file {}", path.display());
        Ok(Self::with_value(path, value))
    }

    fn with_value(path: PathBuf, value: T) -> Self {
        Self {
            path,
            current: ArcSwap::from_pointee(value),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Latest published snapshot. Never touches disk.
    pub fn current(&self) -> Arc<T> {
        self.current.load_full()
    }

    /// Apply `f` to the current snapshot, persist the result, then publish it.
    ///
    /// Concurrent updates of the same record are serialized. If the write fails nothing
    /// is published and the previous snapshot stays current.
    pub async fn update<F>(&self, f: F) -> Result<Arc<T>, AppError>
    where
        F: FnOnce(&T) -> T,
    {
        let _guard = self.write_lock.lock().await;
        let next = Arc::new(f(&self.current.load()));

        write_json(&self.path, next.as_ref()).await?;
        self.current.store(next.clone());
        Ok(next)
    }
}

impl<T> WritableSettings<T>
where
    T: Serialize + DeserializeOwned + Default + Send + Sync + 'static,
{
    /// Load a record, falling back to (and persisting) `T::default()`.
    pub async fn open_or_default(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        Self::open_or_init(path, || Ok(T::default())).await
    }
}
