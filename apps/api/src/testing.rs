//! In-memory collaborators for repository and router tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use uuid::Uuid;

use crate::cache::{Collection, InvalidationSink};
use crate::config::Config;
use crate::content::models::{Content, ContentDto};
use crate::content::repository::ContentRepository;
use crate::content::store::ContentStore;
use crate::content::versioning::{self, ContentChange};
use crate::errors::{AppError, AppResult};
use crate::media::blob::BlobStore;
use crate::media::models::Media;
use crate::media::repository::MediaRepository;
use crate::media::store::MediaStore;
use crate::state::AppState;

fn slug_taken(slug: &str) -> AppError {
    AppError::Conflict(format!("Slug '{slug}' is already in use"))
}

/// A single lock over every record, so each call is atomic and writers are serialized.
#[derive(Default)]
pub struct MemoryContentStore {
    records: tokio::sync::Mutex<BTreeMap<Uuid, Content>>,
}

impl MemoryContentStore {
    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn get(&self, id: Uuid) -> AppResult<Option<Content>> {
        Ok(self.records.lock().await.get(&id).cloned())
    }

    async fn list(&self) -> AppResult<Vec<Content>> {
        Ok(self.records.lock().await.values().cloned().collect())
    }

    async fn slug_owner(&self, slug: &str) -> AppResult<Option<Uuid>> {
        Ok(self
            .records
            .lock()
            .await
            .values()
            .find(|c| c.slug == slug)
            .map(|c| c.id))
    }

    async fn insert(&self, content: &Content) -> AppResult<()> {
        let mut records = self.records.lock().await;
        if records.values().any(|c| c.slug == content.slug) {
            return Err(slug_taken(&content.slug));
        }
        records.insert(content.id, content.clone());
        Ok(())
    }

    async fn apply(&self, id: Uuid, change: ContentChange) -> AppResult<Content> {
        let mut records = self.records.lock().await;
        if let ContentChange::Write { fields, .. } = &change {
            if records
                .values()
                .any(|c| c.id != id && c.slug == fields.slug)
            {
                return Err(slug_taken(&fields.slug));
            }
        }
        let content = records
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Content {id} not found")))?;
        versioning::apply(content, change, Utc::now())?;
        Ok(content.clone())
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.records.lock().await.remove(&id).is_some())
    }
}

#[derive(Default)]
pub struct MemoryMediaStore {
    records: tokio::sync::Mutex<BTreeMap<Uuid, Media>>,
    fail_inserts: AtomicBool,
}

impl MemoryMediaStore {
    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    /// Every later insert fails as if the database were unavailable.
    pub fn fail_inserts(&self) {
        self.fail_inserts.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl MediaStore for MemoryMediaStore {
    async fn list(&self) -> AppResult<Vec<Media>> {
        Ok(self.records.lock().await.values().cloned().collect())
    }

    async fn insert(&self, media: &Media) -> AppResult<()> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(AppError::Database(sqlx::Error::PoolTimedOut));
        }
        self.records.lock().await.insert(media.id, media.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> AppResult<Option<Media>> {
        Ok(self.records.lock().await.remove(&id))
    }
}

/// Blobs keyed by storage key; URIs are `memory://{key}`.
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, Bytes>>,
}

impl MemoryBlobStore {
    pub fn contains(&self, key: &str) -> bool {
        self.blobs.lock().unwrap().contains_key(key)
    }

    pub fn count(&self) -> usize {
        self.blobs.lock().unwrap().len()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, key: &str, data: Bytes, _content_type: &str) -> AppResult<String> {
        self.blobs.lock().unwrap().insert(key.to_string(), data);
        Ok(format!("memory://{key}"))
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.blobs.lock().unwrap().remove(key);
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingSink {
    recorded: Mutex<Vec<Collection>>,
}

impl RecordingSink {
    pub fn recorded(&self) -> Vec<Collection> {
        self.recorded.lock().unwrap().clone()
    }
}

#[async_trait]
impl InvalidationSink for RecordingSink {
    async fn invalidate(&self, collection: Collection) {
        self.recorded.lock().unwrap().push(collection);
    }
}

/// A create/update body that passes validation.
pub fn content_dto(title: &str, slug: &str) -> ContentDto {
    ContentDto {
        content_type: Some("article".to_string()),
        title: Some(title.to_string()),
        slug: Some(slug.to_string()),
        body: Some(format!("<p>{title}</p>")),
        tags: Some(vec!["news".to_string()]),
        status: Some("Draft".to_string()),
        language: Some("en".to_string()),
        ..ContentDto::default()
    }
}

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://localhost/cms_test".to_string(),
        redis_url: "redis://localhost".to_string(),
        s3_bucket: "media".to_string(),
        s3_endpoint: "http://localhost:9000".to_string(),
        s3_public_url: "http://localhost:9000/media".to_string(),
        aws_access_key_id: "test".to_string(),
        aws_secret_access_key: "test".to_string(),
        port: 0,
        rust_log: "debug".to_string(),
        max_upload_bytes: 1024,
        max_page_size: 100,
        db_max_connections: 1,
    }
}

/// Application state wired entirely to in-memory collaborators.
pub fn test_state() -> (AppState, Arc<RecordingSink>) {
    let config = test_config();
    let sink = Arc::new(RecordingSink::default());
    let contents = ContentRepository::new(
        Arc::new(MemoryContentStore::default()),
        sink.clone(),
        config.max_page_size,
    );
    let media = MediaRepository::new(
        Arc::new(MemoryMediaStore::default()),
        Arc::new(MemoryBlobStore::default()),
        sink.clone(),
        config.max_upload_bytes,
        config.max_page_size,
    );
    (
        AppState {
            contents,
            media,
            config,
        },
        sink,
    )
}
