//! Annotate API Server - Backend for the PDF annotation editor
//!
//! Provides REST endpoints for:
//! - PDF upload and validation
//! - Project save/load/list
//! - Compositing annotations into the final PDF
//! - Blank page insertion

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod state;
pub mod store;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use state::AppState;

/// CORS for the editor; an empty origin list allows any origin
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return cors.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();
    cors.allow_origin(AllowOrigin::list(allowed))
}

/// Build the application router
pub fn app(state: Arc<AppState>, config: &Config) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/upload-pdf", post(handlers::upload_pdf))
        .route("/api/save-project", post(handlers::save_project))
        .route("/api/load-project/:id", get(handlers::load_project))
        .route("/api/list-projects", get(handlers::list_projects))
        .route("/api/generate-pdf", post(handlers::generate_pdf))
        .route("/api/insert-page", post(handlers::insert_page))
        // Documents travel base64-encoded inside JSON
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.cors_origins))
        .with_state(state)
}
