//! Cross-cutting layers for the router
use tower_http::cors::CorsLayer;

// The browser dashboard is served from another origin in every
// deployment we know of, so CORS stays permissive.
pub fn cors() -> CorsLayer {
    CorsLayer::permissive()
}
