use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use uuid::Uuid;

use crate::actor::Actor;
use crate::content::models::{Content, ContentDto, Version};
use crate::errors::AppError;
use crate::query::{DynamicQueryRequest, PageRequest, PaginatedResponse};
use crate::state::AppState;

#[derive(Serialize)]
pub struct SlugExistsResponse {
    pub exists: bool,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/content", get(handle_list).post(handle_create))
        .route("/content/dynamic", post(handle_dynamic_query))
        .route("/content/slug/exists/:slug", get(handle_slug_exists))
        .route(
            "/content/:id",
            get(handle_get).put(handle_update).delete(handle_delete),
        )
        .route("/content/:id/versions", get(handle_versions))
        .route(
            "/content/:id/versions/:version_number",
            get(handle_get_version),
        )
        .route(
            "/content/:id/restore/:version_number",
            post(handle_restore),
        )
}

/// GET /content/:id
pub async fn handle_get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Content>, AppError> {
    Ok(Json(state.contents.get(id).await?))
}

/// GET /content?pageIndex&pageSize
pub async fn handle_list(
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> Result<Json<PaginatedResponse<Content>>, AppError> {
    let result = state
        .contents
        .query(page, &DynamicQueryRequest::default())
        .await?;
    Ok(Json(result))
}

/// POST /content/dynamic?pageIndex&pageSize
pub async fn handle_dynamic_query(
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
    Json(request): Json<DynamicQueryRequest>,
) -> Result<Json<PaginatedResponse<Content>>, AppError> {
    Ok(Json(state.contents.query(page, &request).await?))
}

/// POST /content
pub async fn handle_create(
    State(state): State<AppState>,
    actor: Actor,
    Json(dto): Json<ContentDto>,
) -> Result<Json<Content>, AppError> {
    let content = state.contents.create(dto, actor.as_str()).await?;
    Ok(Json(content))
}

/// PUT /content/:id
pub async fn handle_update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    actor: Actor,
    Json(dto): Json<ContentDto>,
) -> Result<StatusCode, AppError> {
    state.contents.update(id, dto, actor.as_str()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /content/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.contents.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /content/:id/restore/:version_number
pub async fn handle_restore(
    State(state): State<AppState>,
    Path((id, version_number)): Path<(Uuid, i32)>,
    actor: Actor,
) -> Result<StatusCode, AppError> {
    state
        .contents
        .restore_version(id, version_number, actor.as_str())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /content/slug/exists/:slug
pub async fn handle_slug_exists(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<SlugExistsResponse>, AppError> {
    let exists = state.contents.slug_exists(&slug).await?;
    Ok(Json(SlugExistsResponse { exists }))
}

/// GET /content/:id/versions
pub async fn handle_versions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Version>>, AppError> {
    Ok(Json(state.contents.versions(id).await?))
}

/// GET /content/:id/versions/:version_number
pub async fn handle_get_version(
    State(state): State<AppState>,
    Path((id, version_number)): Path<(Uuid, i32)>,
) -> Result<Json<Version>, AppError> {
    Ok(Json(state.contents.version(id, version_number).await?))
}
