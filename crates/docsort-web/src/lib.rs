use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::post;
use tower_http::trace::TraceLayer;

pub mod handlers;
pub mod state;
pub mod upload;

pub use state::AppState;

/// Default upload limit in megabytes.
pub const DEFAULT_MAX_UPLOAD_MB: usize = 50;

/// Build the HTTP router for the two classification endpoints.
pub fn router(state: Arc<AppState>, max_upload_mb: usize) -> Router {
    let body_limit = DefaultBodyLimit::max(max_upload_mb * 1024 * 1024);

    Router::new()
        .route(
            "/classify/bank-statement",
            post(handlers::classify::bank_statement),
        )
        .route(
            "/classify/salary-slip",
            post(handlers::classify::salary_slip),
        )
        .layer(body_limit)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
