use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::content::models::{Content, ContentStatus, Version};
use crate::errors::AppError;

#[derive(Debug, Clone, FromRow)]
pub struct ContentRow {
    pub id: Uuid,
    pub content_type: String,
    pub title: String,
    pub slug: String,
    pub body: String,
    pub tags: Vec<String>,
    pub status: String,
    pub language: String,
    pub cover_image_url: Option<String>,
    pub meta_title: String,
    pub meta_description: String,
    pub meta_keywords: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: String,
    pub updated_by: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct ContentVersionRow {
    pub content_id: Uuid,
    pub version_number: i32,
    pub title: String,
    pub body: String,
    pub cover_image_url: Option<String>,
    pub modified_at: DateTime<Utc>,
    pub modified_by: String,
}

impl From<ContentVersionRow> for Version {
    fn from(row: ContentVersionRow) -> Self {
        Version {
            version_number: row.version_number,
            title: row.title,
            body: row.body,
            cover_image_url: row.cover_image_url,
            modified_at: row.modified_at,
            modified_by: row.modified_by,
        }
    }
}

impl ContentRow {
    /// Joins a content row with its versions. `versions` must be ascending by number.
    pub fn into_content(self, versions: Vec<Version>) -> Result<Content, AppError> {
        let status: ContentStatus = self.status.parse().map_err(|e: String| {
            AppError::Internal(anyhow::anyhow!("content {} has bad status: {e}", self.id))
        })?;
        Ok(Content {
            id: self.id,
            content_type: self.content_type,
            title: self.title,
            slug: self.slug,
            body: self.body,
            tags: self.tags,
            status,
            language: self.language,
            cover_image_url: self.cover_image_url,
            meta_title: self.meta_title,
            meta_description: self.meta_description,
            meta_keywords: self.meta_keywords,
            created_at: self.created_at,
            updated_at: self.updated_at,
            created_by: self.created_by,
            updated_by: self.updated_by,
            versions,
        })
    }
}
