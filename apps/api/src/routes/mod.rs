pub mod health;

use axum::{extract::DefaultBodyLimit, routing::get, Router};

use crate::state::AppState;

/// Slack on top of the upload limit for multipart boundaries and part headers.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/health", get(health::health_handler))
        .merge(crate::content::handlers::router())
        .merge(crate::media::handlers::router())
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
