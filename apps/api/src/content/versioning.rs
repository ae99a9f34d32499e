//! Append-only version log for content records.
//!
//! Every write appends `Version { version_number = max + 1 }` and mirrors it
//! into the record's live title/body/cover fields. A restore is a write whose
//! content is copied from an earlier version, so the log is never rewound,
//! truncated, or edited in place.
//!
//! These functions are pure. Stores call [`apply`] inside whatever
//! transaction guarantees that `max + 1` is computed against the committed log.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::content::models::{Content, ContentFields, Version};
use crate::errors::{AppError, AppResult};

/// A mutation of an existing record's version log.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentChange {
    Write { fields: ContentFields, actor: String },
    Restore { version_number: i32, actor: String },
}

/// Builds a new record whose log holds exactly version 1.
pub fn initial(id: Uuid, fields: ContentFields, actor: &str, now: DateTime<Utc>) -> Content {
    let first = Version {
        version_number: 1,
        title: fields.title.clone(),
        body: fields.body.clone(),
        cover_image_url: fields.cover_image_url.clone(),
        modified_at: now,
        modified_by: actor.to_string(),
    };
    Content {
        id,
        content_type: fields.content_type,
        title: fields.title,
        slug: fields.slug,
        body: fields.body,
        tags: fields.tags,
        status: fields.status,
        language: fields.language,
        cover_image_url: fields.cover_image_url,
        meta_title: fields.meta_title,
        meta_description: fields.meta_description,
        meta_keywords: fields.meta_keywords,
        created_at: now,
        updated_at: now,
        created_by: actor.to_string(),
        updated_by: actor.to_string(),
        versions: vec![first],
    }
}

pub fn next_version_number(versions: &[Version]) -> i32 {
    versions
        .iter()
        .map(|v| v.version_number)
        .max()
        .unwrap_or(0)
        + 1
}

/// Appends a version built from `fields` and updates the live fields to match.
pub fn write(
    content: &mut Content,
    fields: ContentFields,
    actor: &str,
    now: DateTime<Utc>,
) -> Version {
    let version = Version {
        version_number: next_version_number(&content.versions),
        title: fields.title.clone(),
        body: fields.body.clone(),
        cover_image_url: fields.cover_image_url.clone(),
        modified_at: now,
        modified_by: actor.to_string(),
    };

    content.content_type = fields.content_type;
    content.title = fields.title;
    content.slug = fields.slug;
    content.body = fields.body;
    content.tags = fields.tags;
    content.status = fields.status;
    content.language = fields.language;
    content.cover_image_url = fields.cover_image_url;
    content.meta_title = fields.meta_title;
    content.meta_description = fields.meta_description;
    content.meta_keywords = fields.meta_keywords;
    content.updated_at = now;
    content.updated_by = actor.to_string();
    content.versions.push(version.clone());

    version
}

/// Appends a new version whose title/body/cover equal those of `version_number`.
/// Every other live field keeps its current value.
pub fn restore(
    content: &mut Content,
    version_number: i32,
    actor: &str,
    now: DateTime<Utc>,
) -> AppResult<Version> {
    let target = content.version(version_number).cloned().ok_or_else(|| {
        AppError::NotFound(format!(
            "Version {version_number} of content {} not found",
            content.id
        ))
    })?;

    let fields = ContentFields {
        content_type: content.content_type.clone(),
        title: target.title,
        slug: content.slug.clone(),
        body: target.body,
        tags: content.tags.clone(),
        status: content.status,
        language: content.language.clone(),
        cover_image_url: target.cover_image_url,
        meta_title: content.meta_title.clone(),
        meta_description: content.meta_description.clone(),
        meta_keywords: content.meta_keywords.clone(),
    };
    Ok(write(content, fields, actor, now))
}

/// Applies a change and returns the version it appended.
pub fn apply(
    content: &mut Content,
    change: ContentChange,
    now: DateTime<Utc>,
) -> AppResult<Version> {
    match change {
        ContentChange::Write { fields, actor } => Ok(write(content, fields, &actor, now)),
        ContentChange::Restore {
            version_number,
            actor,
        } => restore(content, version_number, &actor, now),
    }
}
