//! Civic API: REST endpoints for submitting and administering complaints
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

pub use config::ApiConfig;
pub use error::ApiError;
pub use state::AppState;

/// Upload ceiling for a single image
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

// The body limit leaves headroom above the image ceiling for the
// multipart framing; the 10MB check on the file itself happens in the
// handler.
const BODY_LIMIT_BYTES: usize = MAX_UPLOAD_BYTES + 1024 * 1024;

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/analyze", post(handlers::analyze))
        .route("/health", get(handlers::health))
        .route("/admin/complaints", get(handlers::list_complaints))
        .route(
            "/admin/complaints/{id}",
            get(handlers::get_complaint).delete(handlers::delete_complaint),
        )
        .route("/admin/complaints/{id}/status", put(handlers::update_status))
        .route("/admin/statistics", get(handlers::statistics))
        .route("/admin/export", get(handlers::export))
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::cors())
        .with_state(state)
}

pub async fn run(addr: &str, state: AppState) {
    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind");

    tracing::info!("Civic API listening on {}", addr);
    axum::serve(listener, app).await.expect("Server error");
}
