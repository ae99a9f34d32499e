use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info};
use uuid::Uuid;

use crate::cache::{Collection, InvalidationSink};
use crate::errors::{AppError, AppResult, FieldErrors};
use crate::media::blob::BlobStore;
use crate::media::models::{blob_key, Media, NewMedia};
use crate::media::store::MediaStore;
use crate::query::{self, DynamicQueryRequest, PageRequest, PaginatedResponse};

const ALLOWED_TYPE_PREFIXES: &[&str] = &["image/", "video/"];

/// Upload, delete and query media records. There is no update: a record is
/// immutable once its blob and metadata are both stored.
#[derive(Clone)]
pub struct MediaRepository {
    store: Arc<dyn MediaStore>,
    blobs: Arc<dyn BlobStore>,
    invalidations: Arc<dyn InvalidationSink>,
    max_upload_bytes: usize,
    max_page_size: usize,
}

impl MediaRepository {
    pub fn new(
        store: Arc<dyn MediaStore>,
        blobs: Arc<dyn BlobStore>,
        invalidations: Arc<dyn InvalidationSink>,
        max_upload_bytes: usize,
        max_page_size: usize,
    ) -> Self {
        Self {
            store,
            blobs,
            invalidations,
            max_upload_bytes,
            max_page_size,
        }
    }

    pub async fn upload(&self, upload: NewMedia, actor: &str) -> AppResult<Media> {
        let file_name = sanitize_file_name(&upload.file_name);
        if file_name.is_empty() {
            return Err(AppError::Validation(FieldErrors::single(
                "file",
                "File name is required",
            )));
        }
        if upload.data.is_empty() {
            return Err(AppError::Validation(FieldErrors::single(
                "file",
                "File is empty",
            )));
        }
        if upload.data.len() > self.max_upload_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "File too large: {} bytes (max {} bytes)",
                upload.data.len(),
                self.max_upload_bytes
            )));
        }

        let content_type = resolve_content_type(upload.content_type.as_deref(), &file_name);
        if !is_allowed_type(&content_type) {
            return Err(AppError::InvalidFileType(format!(
                "File type not allowed: {content_type}"
            )));
        }

        let id = Uuid::new_v4();
        let key = blob_key(id, &file_name);
        let size = upload.data.len() as i64;
        let blob_uri = self.blobs.put(&key, upload.data, &content_type).await?;

        let media = Media {
            id,
            file_name,
            blob_uri,
            content_type,
            size,
            uploaded_at: Utc::now(),
            uploaded_by: actor.to_string(),
        };
        if let Err(e) = self.store.insert(&media).await {
            // Metadata never landed, so nothing can reference the blob.
            if let Err(cleanup) = self.blobs.delete(&key).await {
                error!(media_id = %id, error = %cleanup, "failed to remove orphaned blob");
            }
            return Err(e);
        }

        info!(media_id = %id, size, content_type = %media.content_type, "uploaded media");
        self.invalidations.invalidate(Collection::Media).await;
        Ok(media)
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let media = self
            .store
            .delete(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Media {id} not found")))?;

        // The record is gone either way; a stale blob is unreachable.
        if let Err(e) = self.blobs.delete(&media.blob_key()).await {
            error!(media_id = %id, error = %e, "failed to delete media blob");
        }

        info!(media_id = %id, "deleted media");
        self.invalidations.invalidate(Collection::Media).await;
        Ok(())
    }

    pub async fn query(
        &self,
        page: PageRequest,
        request: &DynamicQueryRequest,
    ) -> AppResult<PaginatedResponse<Media>> {
        page.validate(self.max_page_size)?;
        let snapshot = self.store.list().await?;
        query::execute(snapshot, request, page)
    }
}

/// Keeps the last path segment and replaces anything outside `[A-Za-z0-9._-]`.
pub fn sanitize_file_name(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or("").trim();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    cleaned.trim_start_matches('.').to_string()
}

/// The declared type wins; otherwise it is guessed from the file extension.
fn resolve_content_type(declared: Option<&str>, file_name: &str) -> String {
    match declared.map(str::trim).filter(|t| !t.is_empty()) {
        Some(t) => t.to_ascii_lowercase(),
        None => mime_guess::from_path(file_name)
            .first_or_octet_stream()
            .essence_str()
            .to_string(),
    }
}

fn is_allowed_type(content_type: &str) -> bool {
    ALLOWED_TYPE_PREFIXES
        .iter()
        .any(|prefix| content_type.len() > prefix.len() && content_type.starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{DynamicFilter, DynamicSort, FilterLogic, FilterOperator, SortDir};
    use crate::testing::{MemoryBlobStore, MemoryMediaStore, RecordingSink};
    use bytes::Bytes;

    struct Fixture {
        repo: MediaRepository,
        store: Arc<MemoryMediaStore>,
        blobs: Arc<MemoryBlobStore>,
        sink: Arc<RecordingSink>,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryMediaStore::default());
        let blobs = Arc::new(MemoryBlobStore::default());
        let sink = Arc::new(RecordingSink::default());
        Fixture {
            repo: MediaRepository::new(store.clone(), blobs.clone(), sink.clone(), 1024, 100),
            store,
            blobs,
            sink,
        }
    }

    fn upload(name: &str, content_type: Option<&str>, size: usize) -> NewMedia {
        NewMedia {
            file_name: name.to_string(),
            content_type: content_type.map(str::to_string),
            data: Bytes::from(vec![7u8; size]),
        }
    }

    #[tokio::test]
    async fn test_upload_stores_blob_and_metadata() {
        let f = fixture();
        let media = f
            .repo
            .upload(upload("cat.png", Some("image/png"), 10), "alice")
            .await
            .unwrap();

        assert_eq!(media.size, 10);
        assert_eq!(media.uploaded_by, "alice");
        assert_eq!(media.blob_uri, format!("memory://media/{}/cat.png", media.id));
        assert!(f.blobs.contains(&media.blob_key()));
        assert_eq!(f.store.len().await, 1);
        assert_eq!(f.sink.recorded(), vec![Collection::Media]);
    }

    #[tokio::test]
    async fn test_upload_rejects_non_media_types() {
        let f = fixture();
        let err = f
            .repo
            .upload(upload("notes.txt", Some("text/plain"), 10), "alice")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidFileType(_)));
        assert_eq!(f.blobs.count(), 0);
        assert_eq!(f.store.len().await, 0);
        assert!(f.sink.recorded().is_empty());
    }

    #[tokio::test]
    async fn test_upload_guesses_missing_content_type() {
        let f = fixture();
        let media = f
            .repo
            .upload(upload("clip.mp4", None, 4), "alice")
            .await
            .unwrap();
        assert_eq!(media.content_type, "video/mp4");

        let err = f
            .repo
            .upload(upload("archive.zip", None, 4), "alice")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidFileType(_)));
    }

    #[tokio::test]
    async fn test_upload_rejects_empty_and_oversized_files() {
        let f = fixture();
        let empty = f
            .repo
            .upload(upload("a.png", Some("image/png"), 0), "x")
            .await
            .unwrap_err();
        assert!(matches!(empty, AppError::Validation(_)));

        let big = f
            .repo
            .upload(upload("a.png", Some("image/png"), 2048), "x")
            .await
            .unwrap_err();
        assert!(matches!(big, AppError::PayloadTooLarge(_)));
        assert_eq!(f.blobs.count(), 0);
    }

    #[tokio::test]
    async fn test_failed_insert_removes_blob() {
        let f = fixture();
        f.store.fail_inserts();

        let result = f
            .repo
            .upload(upload("cat.png", Some("image/png"), 10), "alice")
            .await;

        assert!(result.is_err());
        assert_eq!(f.blobs.count(), 0);
        assert!(f.sink.recorded().is_empty());
    }

    #[tokio::test]
    async fn test_delete_removes_record_and_blob() {
        let f = fixture();
        let media = f
            .repo
            .upload(upload("cat.png", Some("image/png"), 10), "alice")
            .await
            .unwrap();

        f.repo.delete(media.id).await.unwrap();

        assert_eq!(f.store.len().await, 0);
        assert_eq!(f.blobs.count(), 0);
        assert!(matches!(f.repo.delete(media.id).await, Err(AppError::NotFound(_))));
        assert_eq!(f.sink.recorded(), vec![Collection::Media, Collection::Media]);
    }

    #[tokio::test]
    async fn test_query_by_size() {
        let f = fixture();
        for (name, size) in [("a.png", 10), ("b.png", 300), ("c.png", 700)] {
            f.repo
                .upload(upload(name, Some("image/png"), size), "x")
                .await
                .unwrap();
        }
        let request = DynamicQueryRequest {
            filter: Some(DynamicFilter {
                field: "size".to_string(),
                operator: FilterOperator::Gte,
                value: "300".to_string(),
                logic: FilterLogic::Number,
                is_case_sensitive: false,
            }),
            sort: vec![DynamicSort {
                field: "size".to_string(),
                dir: SortDir::Desc,
            }],
        };

        let page = f.repo.query(PageRequest::new(0, 10), &request).await.unwrap();

        let names: Vec<&str> = page.items.iter().map(|m| m.file_name.as_str()).collect();
        assert_eq!(names, vec!["c.png", "b.png"]);
        assert_eq!(page.total_count, 2);
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\photos\\my cat.png"), "my_cat.png");
        assert_eq!(sanitize_file_name(".hidden.png"), "hidden.png");
        assert_eq!(sanitize_file_name("   "), "");
    }

    #[test]
    fn test_allowed_types_need_a_subtype() {
        assert!(is_allowed_type("image/png"));
        assert!(is_allowed_type("video/webm"));
        assert!(!is_allowed_type("image/"));
        assert!(!is_allowed_type("application/pdf"));
    }
}
