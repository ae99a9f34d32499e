use crate::config::Config;
use crate::content::repository::ContentRepository;
use crate::media::repository::MediaRepository;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub contents: ContentRepository,
    pub media: MediaRepository,
    pub config: Config,
}
