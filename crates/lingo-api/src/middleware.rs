//! Router middleware.
use tower_http::cors::CorsLayer;

/// The API is called from browser extensions on arbitrary origins.
pub fn cors() -> CorsLayer {
    CorsLayer::permissive()
}
