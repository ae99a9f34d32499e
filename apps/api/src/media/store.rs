use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppResult;
use crate::media::models::Media;
use crate::models::media::MediaRow;

#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn list(&self) -> AppResult<Vec<Media>>;

    async fn insert(&self, media: &Media) -> AppResult<()>;

    /// Removes the record and returns it, or `None` if it did not exist.
    async fn delete(&self, id: Uuid) -> AppResult<Option<Media>>;
}

const MEDIA_COLUMNS: &str = "id, file_name, blob_uri, content_type, size, uploaded_at, uploaded_by";

pub struct PgMediaStore {
    pool: PgPool,
}

impl PgMediaStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MediaStore for PgMediaStore {
    async fn list(&self) -> AppResult<Vec<Media>> {
        let rows = sqlx::query_as::<_, MediaRow>(&format!("SELECT {MEDIA_COLUMNS} FROM media"))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Media::from).collect())
    }

    async fn insert(&self, media: &Media) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO media
                (id, file_name, blob_uri, content_type, size, uploaded_at, uploaded_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(media.id)
        .bind(&media.file_name)
        .bind(&media.blob_uri)
        .bind(&media.content_type)
        .bind(media.size)
        .bind(media.uploaded_at)
        .bind(&media.uploaded_by)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> AppResult<Option<Media>> {
        let row = sqlx::query_as::<_, MediaRow>(&format!(
            "DELETE FROM media WHERE id = $1 RETURNING {MEDIA_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Media::from))
    }
}
