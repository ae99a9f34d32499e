use axum::{
    body::Bytes,
    extract::{multipart::MultipartError, Multipart, Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::actor::Actor;
use crate::errors::{AppError, FieldErrors};
use crate::media::models::{Media, NewMedia};
use crate::query::{DynamicQueryRequest, PageRequest, PaginatedResponse};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/media", get(handle_list))
        .route(
            "/media/dynamic",
            get(handle_dynamic_query_get).post(handle_dynamic_query),
        )
        .route("/media/upload", post(handle_upload))
        .route("/media/:id", delete(handle_delete))
}

/// GET /media?pageIndex&pageSize
pub async fn handle_list(
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> Result<Json<PaginatedResponse<Media>>, AppError> {
    let result = state
        .media
        .query(page, &DynamicQueryRequest::default())
        .await?;
    Ok(Json(result))
}

/// POST /media/dynamic?pageIndex&pageSize
pub async fn handle_dynamic_query(
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
    Json(request): Json<DynamicQueryRequest>,
) -> Result<Json<PaginatedResponse<Media>>, AppError> {
    Ok(Json(state.media.query(page, &request).await?))
}

/// GET /media/dynamic?pageIndex&pageSize
///
/// Same as the POST form, but the body is optional; without one the default sort applies.
pub async fn handle_dynamic_query_get(
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
    body: Bytes,
) -> Result<Json<PaginatedResponse<Media>>, AppError> {
    let request = parse_optional_request(&body)?;
    Ok(Json(state.media.query(page, &request).await?))
}

/// POST /media/upload
///
/// Content-Type: multipart/form-data, file in the `file` field.
/// Returns the URI of the stored blob.
pub async fn handle_upload(
    State(state): State<AppState>,
    actor: Actor,
    mut multipart: Multipart,
) -> Result<Json<String>, AppError> {
    let mut upload: Option<NewMedia> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.map_err(multipart_error)?;
        upload = Some(NewMedia {
            file_name,
            content_type,
            data,
        });
        break; // only the first file is stored
    }

    let upload = upload.ok_or_else(|| {
        AppError::Validation(FieldErrors::single("file", "No file provided"))
    })?;
    let media = state.media.upload(upload, actor.as_str()).await?;
    Ok(Json(media.blob_uri))
}

/// DELETE /media/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.media.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn parse_optional_request(body: &[u8]) -> Result<DynamicQueryRequest, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(DynamicQueryRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::BadRequest(format!("Invalid query request: {e}")))
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::BadRequest(format!("Invalid multipart body: {}", err.body_text()))
    }
}
