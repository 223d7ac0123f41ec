//! Site metadata: the about page and the header banner.

use std::path::Path;
use std::sync::Arc;

use uuid::Uuid;

use super::{WritableSettings, ABOUT_FILE, HEADER_FILE};
use crate::errors::AppError;
use crate::images::ImageStore;
use crate::models::{About, Header};

/// Reads and updates the site metadata records.
pub struct SiteService {
    about: WritableSettings<About>,
    header: WritableSettings<Header>,
    images: Arc<dyn ImageStore>,
}

impl SiteService {
    pub fn new(
        about: WritableSettings<About>,
        header: WritableSettings<Header>,
        images: Arc<dyn ImageStore>,
    ) -> Self {
        Self {
            about,
            header,
            images,
        }
    }

    /// Open both records in `data_dir`, defaulting missing ones to empty.
    pub async fn open(data_dir: &Path, images: Arc<dyn ImageStore>) -> Result<Self, AppError> {
        let about = WritableSettings::open_or_default(data_dir.join(ABOUT_FILE)).await?;
        let header = WritableSettings::open_or_default(data_dir.join(HEADER_FILE)).await?;
        Ok(Self::new(about, header, images))
    }

    pub fn about(&self) -> Arc<About> {
        self.about.current()
    }

    pub fn header(&self) -> Arc<Header> {
        self.header.current()
    }

    /// Replace the about text. A new image is stored when given; otherwise the
    /// current image id is kept.
    pub async fn update_about(
        &self,
        text: String,
        image: Option<&[u8]>,
    ) -> Result<Arc<About>, AppError> {
        let image_id = match image {
            Some(bytes) => Some(self.images.save_image(bytes).await?),
            None => self.about.current().image_id,
        };

        self.about
            .update(move |_| About {
                about: text,
                image_id,
            })
            .await
    }

    /// Store a new header image and point the header at it.
    pub async fn update_header(&self, image: &[u8]) -> Result<Uuid, AppError> {
        let image_id = self.images.save_image(image).await?;
        self.header
            .update(|_| Header {
                image_id: Some(image_id),
            })
            .await?;
        Ok(image_id)
    }
}
