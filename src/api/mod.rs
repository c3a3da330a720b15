//! HTTP surface: the two language pages, the form upload and the JSON API

pub mod handler;
pub mod helpers;
pub mod parsing;
pub mod views;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::ai::client::GeneratorFactory;
use crate::core::config::AppConfig;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub generators: Arc<dyn GeneratorFactory>,
}

impl AppState {
    #[must_use]
    pub fn new(config: AppConfig, generators: Arc<dyn GeneratorFactory>) -> Self {
        Self {
            config: Arc::new(config),
            generators,
        }
    }
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(handler::index))
        .route("/es", get(handler::index_es))
        .route("/health", get(handler::health))
        .route("/summarize", post(handler::summarize_form))
        .route("/api/summarize", post(handler::summarize_json))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
