use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::cache::{Collection, InvalidationSink};
use crate::content::models::{Content, ContentDto, Version};
use crate::content::store::ContentStore;
use crate::content::validation::validate_content;
use crate::content::versioning::{self, ContentChange};
use crate::errors::{AppError, AppResult};
use crate::query::{self, DynamicQueryRequest, PageRequest, PaginatedResponse};

/// Orchestrates content mutations and queries.
///
/// Validation and slug conflicts are detected before anything is written.
/// Every successful mutation declares `Collection::Contents` stale.
#[derive(Clone)]
pub struct ContentRepository {
    store: Arc<dyn ContentStore>,
    invalidations: Arc<dyn InvalidationSink>,
    max_page_size: usize,
}

impl ContentRepository {
    pub fn new(
        store: Arc<dyn ContentStore>,
        invalidations: Arc<dyn InvalidationSink>,
        max_page_size: usize,
    ) -> Self {
        Self {
            store,
            invalidations,
            max_page_size,
        }
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Content> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Content {id} not found")))
    }

    pub async fn slug_exists(&self, slug: &str) -> AppResult<bool> {
        Ok(self.store.slug_owner(slug.trim()).await?.is_some())
    }

    pub async fn create(&self, dto: ContentDto, actor: &str) -> AppResult<Content> {
        let fields = validate_content(dto)?;
        if self.store.slug_owner(&fields.slug).await?.is_some() {
            return Err(slug_conflict(&fields.slug));
        }

        let content = versioning::initial(Uuid::new_v4(), fields, actor, Utc::now());
        self.store.insert(&content).await?;

        info!(content_id = %content.id, slug = %content.slug, "created content");
        self.invalidations.invalidate(Collection::Contents).await;
        Ok(content)
    }

    pub async fn update(&self, id: Uuid, dto: ContentDto, actor: &str) -> AppResult<Content> {
        let fields = validate_content(dto)?;
        self.get(id).await?;
        if let Some(owner) = self.store.slug_owner(&fields.slug).await? {
            if owner != id {
                return Err(slug_conflict(&fields.slug));
            }
        }

        let change = ContentChange::Write {
            fields,
            actor: actor.to_string(),
        };
        let content = self.store.apply(id, change).await?;

        info!(
            content_id = %id,
            version = content.latest_version().map(|v| v.version_number),
            "updated content"
        );
        self.invalidations.invalidate(Collection::Contents).await;
        Ok(content)
    }

    /// Appends a copy of `version_number` as the newest version. Restoring the
    /// same version twice appends two identical versions.
    pub async fn restore_version(
        &self,
        id: Uuid,
        version_number: i32,
        actor: &str,
    ) -> AppResult<Content> {
        let change = ContentChange::Restore {
            version_number,
            actor: actor.to_string(),
        };
        let content = self.store.apply(id, change).await?;

        if let (Some(latest), Some(source)) =
            (content.latest_version(), content.version(version_number))
        {
            info!(
                content_id = %id,
                restored_from = version_number,
                version = latest.version_number,
                "restored content version"
            );
            let previous = latest.version_number - 1;
            if content.version(previous).is_some_and(|p| p.same_content(source)) {
                debug!(content_id = %id, "restore left the live content unchanged");
            }
        }
        self.invalidations.invalidate(Collection::Contents).await;
        Ok(content)
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        if !self.store.delete(id).await? {
            return Err(AppError::NotFound(format!("Content {id} not found")));
        }
        info!(content_id = %id, "deleted content and its versions");
        self.invalidations.invalidate(Collection::Contents).await;
        Ok(())
    }

    pub async fn versions(&self, id: Uuid) -> AppResult<Vec<Version>> {
        Ok(self.get(id).await?.versions)
    }

    pub async fn version(&self, id: Uuid, version_number: i32) -> AppResult<Version> {
        let content = self.get(id).await?;
        content.version(version_number).cloned().ok_or_else(|| {
            AppError::NotFound(format!("Version {version_number} of content {id} not found"))
        })
    }

    pub async fn query(
        &self,
        page: PageRequest,
        request: &DynamicQueryRequest,
    ) -> AppResult<PaginatedResponse<Content>> {
        page.validate(self.max_page_size)?;
        let snapshot = self.store.list().await?;
        query::execute(snapshot, request, page)
    }
}

fn slug_conflict(slug: &str) -> AppError {
    AppError::Conflict(format!("Slug '{slug}' is already in use"))
}
