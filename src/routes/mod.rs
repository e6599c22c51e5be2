//! API Routes
//!
//! HTTP endpoints of the corpus admin UI:
//! - `/` - Single-page admin UI
//! - `/api/health` - Health checks
//! - `/api/corpus` - Corpus configuration and resolved resource
//! - `/api/documents` - Listing, upload, delete, bulk delete
//! - `/api/analytics` - Corpus statistics and SVG charts
//!
//! The corpus is resolved on every request, so a corpus recreated behind the
//! server's back is picked up without a restart.

pub mod analytics;
pub mod charts;
pub mod corpus;
pub mod documents;
pub mod health;
pub mod ui;

use axum::{extract::DefaultBodyLimit, Router};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::models::AppState;

// Room for multipart framing around the largest accepted file
const MULTIPART_OVERHEAD: u64 = 1024 * 1024;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    let body_limit = state
        .config
        .upload
        .max_file_size_bytes()
        .saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        .merge(ui::router())
        .merge(health::router())
        .merge(corpus::router(state.clone()))
        .merge(documents::router(state.clone()))
        .merge(analytics::router(state))
        .layer(DefaultBodyLimit::max(usize::try_from(body_limit).unwrap_or(usize::MAX)))
        .layer(TraceLayer::new_for_http())
}
