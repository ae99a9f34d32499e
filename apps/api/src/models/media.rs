use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::media::models::Media;

#[derive(Debug, Clone, FromRow)]
pub struct MediaRow {
    pub id: Uuid,
    pub file_name: String,
    pub blob_uri: String,
    pub content_type: String,
    pub size: i64,
    pub uploaded_at: DateTime<Utc>,
    pub uploaded_by: String,
}

impl From<MediaRow> for Media {
    fn from(row: MediaRow) -> Self {
        Media {
            id: row.id,
            file_name: row.file_name,
            blob_uri: row.blob_uri,
            content_type: row.content_type,
            size: row.size,
            uploaded_at: row.uploaded_at,
            uploaded_by: row.uploaded_by,
        }
    }
}
