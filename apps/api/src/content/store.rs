use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::content::models::{Content, Version};
use crate::content::versioning::{self, ContentChange};
use crate::errors::{AppError, AppResult};
use crate::models::content::{ContentRow, ContentVersionRow};

/// Persistence boundary for content records and their version logs.
///
/// Every method is one atomic unit: callers observe all of its effect or none.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn get(&self, id: Uuid) -> AppResult<Option<Content>>;

    /// A consistent snapshot of every record, versions included.
    async fn list(&self) -> AppResult<Vec<Content>>;

    /// The id of the record currently holding `slug`, if any.
    async fn slug_owner(&self, slug: &str) -> AppResult<Option<Uuid>>;

    /// Inserts a new record and its version log. `Conflict` if the slug is taken.
    async fn insert(&self, content: &Content) -> AppResult<()>;

    /// Applies `change` against the committed log and returns the updated record.
    /// Concurrent changes to the same record are serialized.
    async fn apply(&self, id: Uuid, change: ContentChange) -> AppResult<Content>;

    /// Removes the record and every version. `false` if it did not exist.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

const CONTENT_COLUMNS: &str = "id, content_type, title, slug, body, tags, status, language, \
     cover_image_url, meta_title, meta_description, meta_keywords, \
     created_at, updated_at, created_by, updated_by";

/// Every statement in the transaction reads the same committed snapshot.
const SNAPSHOT_ISOLATION: &str = "SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY";

const VERSION_COLUMNS: &str =
    "content_id, version_number, title, body, cover_image_url, modified_at, modified_by";

pub struct PgContentStore {
    pool: PgPool,
}

impl PgContentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A record and its version log are read in separate statements; without a
    /// shared snapshot a commit in between would pair old live fields with a newer log.
    async fn begin_snapshot(&self) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(SNAPSHOT_ISOLATION).execute(&mut *tx).await?;
        Ok(tx)
    }

    async fn versions_of(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> Result<Vec<Version>, sqlx::Error> {
        let rows = sqlx::query_as::<_, ContentVersionRow>(&format!(
            "SELECT {VERSION_COLUMNS} FROM content_versions \
             WHERE content_id = $1 ORDER BY version_number ASC"
        ))
        .bind(id)
        .fetch_all(&mut **tx)
        .await?;
        Ok(rows.into_iter().map(Version::from).collect())
    }

    async fn insert_version(
        tx: &mut Transaction<'_, Postgres>,
        content_id: Uuid,
        version: &Version,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO content_versions
                (content_id, version_number, title, body, cover_image_url, modified_at, modified_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(content_id)
        .bind(version.version_number)
        .bind(&version.title)
        .bind(&version.body)
        .bind(&version.cover_image_url)
        .bind(version.modified_at)
        .bind(&version.modified_by)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl ContentStore for PgContentStore {
    async fn get(&self, id: Uuid) -> AppResult<Option<Content>> {
        let mut tx = self.begin_snapshot().await?;
        let row = sqlx::query_as::<_, ContentRow>(&format!(
            "SELECT {CONTENT_COLUMNS} FROM contents WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        let versions = Self::versions_of(&mut tx, id).await?;
        tx.commit().await?;
        row.into_content(versions).map(Some)
    }

    async fn list(&self) -> AppResult<Vec<Content>> {
        let mut tx = self.begin_snapshot().await?;

        let rows =
            sqlx::query_as::<_, ContentRow>(&format!("SELECT {CONTENT_COLUMNS} FROM contents"))
                .fetch_all(&mut *tx)
                .await?;
        let version_rows = sqlx::query_as::<_, ContentVersionRow>(&format!(
            "SELECT {VERSION_COLUMNS} FROM content_versions ORDER BY content_id, version_number ASC"
        ))
        .fetch_all(&mut *tx)
        .await?;
        tx.commit().await?;

        let mut versions: HashMap<Uuid, Vec<Version>> = HashMap::new();
        for row in version_rows {
            versions.entry(row.content_id).or_default().push(row.into());
        }
        rows.into_iter()
            .map(|row| {
                let log = versions.remove(&row.id).unwrap_or_default();
                row.into_content(log)
            })
            .collect()
    }

    async fn slug_owner(&self, slug: &str) -> AppResult<Option<Uuid>> {
        Ok(
            sqlx::query_scalar::<_, Uuid>("SELECT id FROM contents WHERE slug = $1")
                .bind(slug)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn insert(&self, content: &Content) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            r#"
            INSERT INTO contents
                (id, content_type, title, slug, body, tags, status, language,
                 cover_image_url, meta_title, meta_description, meta_keywords,
                 created_at, updated_at, created_by, updated_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(content.id)
        .bind(&content.content_type)
        .bind(&content.title)
        .bind(&content.slug)
        .bind(&content.body)
        .bind(&content.tags)
        .bind(content.status.as_str())
        .bind(&content.language)
        .bind(&content.cover_image_url)
        .bind(&content.meta_title)
        .bind(&content.meta_description)
        .bind(&content.meta_keywords)
        .bind(content.created_at)
        .bind(content.updated_at)
        .bind(&content.created_by)
        .bind(&content.updated_by)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::from_write(e, &content.slug))?;

        for version in &content.versions {
            Self::insert_version(&mut tx, content.id, version).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn apply(&self, id: Uuid, change: ContentChange) -> AppResult<Content> {
        let mut tx = self.pool.begin().await?;

        // Row lock serializes concurrent writers, so max + 1 is computed
        // against the committed log.
        let row = sqlx::query_as::<_, ContentRow>(&format!(
            "SELECT {CONTENT_COLUMNS} FROM contents WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Content {id} not found")))?;

        let versions = Self::versions_of(&mut tx, id).await?;
        let mut content = row.into_content(versions)?;
        let appended = versioning::apply(&mut content, change, Utc::now())?;

        Self::insert_version(&mut tx, id, &appended).await?;
        sqlx::query(
            r#"
            UPDATE contents SET
                content_type = $2, title = $3, slug = $4, body = $5, tags = $6,
                status = $7, language = $8, cover_image_url = $9, meta_title = $10,
                meta_description = $11, meta_keywords = $12, updated_at = $13, updated_by = $14
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&content.content_type)
        .bind(&content.title)
        .bind(&content.slug)
        .bind(&content.body)
        .bind(&content.tags)
        .bind(content.status.as_str())
        .bind(&content.language)
        .bind(&content.cover_image_url)
        .bind(&content.meta_title)
        .bind(&content.meta_description)
        .bind(&content.meta_keywords)
        .bind(content.updated_at)
        .bind(&content.updated_by)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::from_write(e, &content.slug))?;

        tx.commit().await?;
        Ok(content)
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        // content_versions rows go with it through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM contents WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
