use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::metrics::SearchMetrics;

use super::handlers::*;
use super::service::SearchHandler;

/// Application state shared across all handlers
pub struct AppState {
    pub handler: Arc<SearchHandler>,
    pub metrics: Arc<SearchMetrics>,
}

impl AppState {
    pub fn new(handler: SearchHandler) -> Self {
        let metrics = handler.metrics().clone();
        Self {
            handler: Arc::new(handler),
            metrics,
        }
    }
}

/// Create the HTTP router with all endpoints
pub fn create_router(state: AppState) -> Router {
    let state = Arc::new(state);

    Router::new()
        .route("/", get(search))
        .route("/search", get(search))
        // Health and metrics
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
