use serde::{Deserialize, Serialize};

/// A feed image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub id: i64,
    /// Page URL of the photo.
    pub url: String,
    pub photographer: String,
    /// Direct URL of the rendered asset.
    pub image_url: String,
    pub aspect_ratio: f32,
}
