use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::query::{DynamicSort, FieldValue, Queryable};

/// Metadata for an uploaded file. Immutable once stored; removed only by delete.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    pub id: Uuid,
    pub file_name: String,
    pub blob_uri: String,
    pub content_type: String,
    pub size: i64,
    pub uploaded_at: DateTime<Utc>,
    pub uploaded_by: String,
}

impl Media {
    pub fn blob_key(&self) -> String {
        blob_key(self.id, &self.file_name)
    }
}

/// Storage key for a media blob: `media/{id}/{fileName}`.
pub fn blob_key(id: Uuid, file_name: &str) -> String {
    format!("media/{id}/{file_name}")
}

/// A file received from an upload, before validation.
#[derive(Debug, Clone)]
pub struct NewMedia {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

#[derive(Debug, Clone, Copy)]
pub enum MediaField {
    Id,
    FileName,
    BlobUri,
    ContentType,
    Size,
    UploadedAt,
    UploadedBy,
}

impl Queryable for Media {
    type Field = MediaField;

    const FIELDS: &'static [(&'static str, MediaField)] = &[
        ("id", MediaField::Id),
        ("fileName", MediaField::FileName),
        ("blobUri", MediaField::BlobUri),
        ("contentType", MediaField::ContentType),
        ("size", MediaField::Size),
        ("uploadedAt", MediaField::UploadedAt),
        ("uploadedBy", MediaField::UploadedBy),
    ];

    fn id(&self) -> Uuid {
        self.id
    }

    fn value(&self, field: MediaField) -> FieldValue<'_> {
        match field {
            MediaField::Id => FieldValue::Uuid(self.id),
            MediaField::FileName => FieldValue::Text(&self.file_name),
            MediaField::BlobUri => FieldValue::Text(&self.blob_uri),
            MediaField::ContentType => FieldValue::Text(&self.content_type),
            MediaField::Size => FieldValue::Number(self.size as f64),
            MediaField::UploadedAt => FieldValue::Date(self.uploaded_at),
            MediaField::UploadedBy => FieldValue::Text(&self.uploaded_by),
        }
    }

    fn default_sort() -> Vec<DynamicSort> {
        vec![DynamicSort::desc("uploadedAt")]
    }
}
