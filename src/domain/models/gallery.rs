use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct GalleryImage {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    /// JSON array text.
    pub tags: String,
    pub image_path: String,
    pub thumbnail_path: String,
    pub uploaded_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl GalleryImage {
    pub fn new(title: String, description: Option<String>, category: String, tags: String, image_path: String, uploaded_by: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title,
            description,
            category,
            tags,
            thumbnail_path: image_path.clone(),
            image_path,
            uploaded_by,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GalleryFilter {
    pub search: Option<String>,
    pub category: Option<String>,
}
