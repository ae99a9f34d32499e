use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::query::{DynamicSort, FieldValue, Queryable};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ContentStatus {
    Draft,
    Published,
    Archived,
}

impl ContentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentStatus::Draft => "Draft",
            ContentStatus::Published => "Published",
            ContentStatus::Archived => "Archived",
        }
    }
}

impl FromStr for ContentStatus {
    type Err = String;

    /// Case-insensitive, so `draft` and `Draft` are the same status.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(ContentStatus::Draft),
            "published" => Ok(ContentStatus::Published),
            "archived" => Ok(ContentStatus::Archived),
            other => Err(format!("Unknown content status '{other}'")),
        }
    }
}

/// Immutable snapshot of a content record's editable fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    pub version_number: i32,
    pub title: String,
    pub body: String,
    pub cover_image_url: Option<String>,
    pub modified_at: DateTime<Utc>,
    pub modified_by: String,
}

impl Version {
    /// True when both versions carry the same title, body and cover image.
    pub fn same_content(&self, other: &Version) -> bool {
        self.title == other.title
            && self.body == other.body
            && self.cover_image_url == other.cover_image_url
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    pub id: Uuid,
    pub content_type: String,
    pub title: String,
    pub slug: String,
    pub body: String,
    pub tags: Vec<String>,
    pub status: ContentStatus,
    pub language: String,
    pub cover_image_url: Option<String>,
    pub meta_title: String,
    pub meta_description: String,
    pub meta_keywords: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: String,
    pub updated_by: String,
    /// Ascending by `version_number`, starting at 1 with no gaps.
    pub versions: Vec<Version>,
}

impl Content {
    /// The current version is always the one with the highest number.
    pub fn latest_version(&self) -> Option<&Version> {
        self.versions.iter().max_by_key(|v| v.version_number)
    }

    pub fn version(&self, version_number: i32) -> Option<&Version> {
        self.versions
            .iter()
            .find(|v| v.version_number == version_number)
    }
}

/// Request body for create and update. Every member is optional on the wire
/// so missing fields surface as validation messages instead of a decode error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContentDto {
    pub content_type: Option<String>,
    pub title: Option<String>,
    pub slug: Option<String>,
    pub body: Option<String>,
    pub tags: Option<Vec<String>>,
    pub status: Option<String>,
    pub language: Option<String>,
    pub cover_image_url: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<Vec<String>>,
}

/// A validated [`ContentDto`].
#[derive(Debug, Clone, PartialEq)]
pub struct ContentFields {
    pub content_type: String,
    pub title: String,
    pub slug: String,
    pub body: String,
    pub tags: Vec<String>,
    pub status: ContentStatus,
    pub language: String,
    pub cover_image_url: Option<String>,
    pub meta_title: String,
    pub meta_description: String,
    pub meta_keywords: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
pub enum ContentField {
    Id,
    ContentType,
    Title,
    Slug,
    Body,
    Tags,
    Status,
    Language,
    CoverImageUrl,
    MetaTitle,
    MetaDescription,
    MetaKeywords,
    CreatedAt,
    UpdatedAt,
    CreatedBy,
    UpdatedBy,
    LatestVersion,
}

impl Queryable for Content {
    type Field = ContentField;

    const FIELDS: &'static [(&'static str, ContentField)] = &[
        ("id", ContentField::Id),
        ("contentType", ContentField::ContentType),
        ("title", ContentField::Title),
        ("slug", ContentField::Slug),
        ("body", ContentField::Body),
        ("tags", ContentField::Tags),
        ("status", ContentField::Status),
        ("language", ContentField::Language),
        ("coverImageUrl", ContentField::CoverImageUrl),
        ("metaTitle", ContentField::MetaTitle),
        ("metaDescription", ContentField::MetaDescription),
        ("metaKeywords", ContentField::MetaKeywords),
        ("createdAt", ContentField::CreatedAt),
        ("updatedAt", ContentField::UpdatedAt),
        ("createdBy", ContentField::CreatedBy),
        ("updatedBy", ContentField::UpdatedBy),
        ("latestVersion", ContentField::LatestVersion),
    ];

    fn id(&self) -> Uuid {
        self.id
    }

    fn value(&self, field: ContentField) -> FieldValue<'_> {
        match field {
            ContentField::Id => FieldValue::Uuid(self.id),
            ContentField::ContentType => FieldValue::Text(&self.content_type),
            ContentField::Title => FieldValue::Text(&self.title),
            ContentField::Slug => FieldValue::Text(&self.slug),
            ContentField::Body => FieldValue::Text(&self.body),
            ContentField::Tags => FieldValue::List(&self.tags),
            ContentField::Status => FieldValue::Text(self.status.as_str()),
            ContentField::Language => FieldValue::Text(&self.language),
            ContentField::CoverImageUrl => self
                .cover_image_url
                .as_deref()
                .map_or(FieldValue::Null, FieldValue::Text),
            ContentField::MetaTitle => FieldValue::Text(&self.meta_title),
            ContentField::MetaDescription => FieldValue::Text(&self.meta_description),
            ContentField::MetaKeywords => FieldValue::List(&self.meta_keywords),
            ContentField::CreatedAt => FieldValue::Date(self.created_at),
            ContentField::UpdatedAt => FieldValue::Date(self.updated_at),
            ContentField::CreatedBy => FieldValue::Text(&self.created_by),
            ContentField::UpdatedBy => FieldValue::Text(&self.updated_by),
            ContentField::LatestVersion => self
                .latest_version()
                .map_or(FieldValue::Null, |v| FieldValue::Number(f64::from(v.version_number))),
        }
    }

    fn default_sort() -> Vec<DynamicSort> {
        vec![DynamicSort::desc("updatedAt")]
    }
}
