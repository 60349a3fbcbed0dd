//! Image feed backend contract and a curated in-process library
use async_trait::async_trait;
use once_cell::sync::Lazy;
use tokio::time::Duration;

use crate::domain::Image;
use crate::error::ImageError;

#[async_trait]
pub trait ImageRepository: Send + Sync {
    async fn get_images(&self) -> Result<Vec<Image>, ImageError>;

    async fn get_image(&self, id: i64) -> Result<Image, ImageError>;

    /// Other images by the same photographer.
    async fn get_similar_images(&self, id: i64) -> Result<Vec<Image>, ImageError>;
}

static CURATED_IMAGES: Lazy<Vec<Image>> = Lazy::new(|| {
    let entries: [(i64, &str, f32); 8] = [
        (101, "Lena Petrova", 1.5),
        (102, "Marcus Chen", 0.75),
        (103, "Lena Petrova", 1.33),
        (104, "Aditi Rao", 1.78),
        (105, "Marcus Chen", 1.0),
        (106, "Sofia Alvarez", 0.67),
        (107, "Aditi Rao", 1.5),
        (108, "Sofia Alvarez", 1.78),
    ];
    entries
        .iter()
        .map(|(id, photographer, aspect_ratio)| Image {
            id: *id,
            url: format!("https://images.example.com/photo/{id}"),
            photographer: photographer.to_string(),
            image_url: format!("https://images.example.com/photo/{id}/large.jpg"),
            aspect_ratio: *aspect_ratio,
        })
        .collect()
});

/// Fixed image set with simulated latency, standing in for the photo API.
pub struct CuratedImageLibrary {
    latency: Duration,
}

impl CuratedImageLibrary {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

#[async_trait]
impl ImageRepository for CuratedImageLibrary {
    async fn get_images(&self) -> Result<Vec<Image>, ImageError> {
        tokio::time::sleep(self.latency).await;
        Ok(CURATED_IMAGES.clone())
    }

    async fn get_image(&self, id: i64) -> Result<Image, ImageError> {
        tokio::time::sleep(self.latency).await;
        CURATED_IMAGES
            .iter()
            .find(|image| image.id == id)
            .cloned()
            .ok_or(ImageError::NotFound { id })
    }

    async fn get_similar_images(&self, id: i64) -> Result<Vec<Image>, ImageError> {
        let reference = self.get_image(id).await?;
        Ok(CURATED_IMAGES
            .iter()
            .filter(|image| image.id != id && image.photographer == reference.photographer)
            .cloned()
            .collect())
    }
}
