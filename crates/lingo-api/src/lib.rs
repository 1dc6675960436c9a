//! Lingo API /v1: REST endpoints over the coordination engine
pub mod handlers;
pub mod http_provider;
pub mod metrics;
pub mod middleware;

use axum::{
    routing::{get, post},
    Router,
};
use lingo_engine::CoordinationEngine;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub use http_provider::{HttpProvider, HttpProviderConfig};
pub use metrics::Metrics;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<CoordinationEngine>,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(engine: CoordinationEngine) -> Result<Self, prometheus::Error> {
        Ok(Self {
            engine: Arc::new(engine),
            metrics: Metrics::new()?,
        })
    }
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/v1/coordinate", post(handlers::coordinate))
        .route("/v1/classify", post(handlers::classify))
        .route("/v1/plan", post(handlers::plan))
        .route("/v1/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .layer(middleware::cors())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(addr: &str, state: AppState) -> std::io::Result<()> {
    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Lingo API listening on {}", addr);
    axum::serve(listener, app).await
}
