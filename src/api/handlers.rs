use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::api::types::*;
use crate::error::AnekdexError;

use super::router::AppState;
use super::service::SearchHandler;

/// Error wrapper for API handlers
pub enum ApiError {
    Anekdex(AnekdexError),
    Internal(String),
}

impl From<AnekdexError> for ApiError {
    fn from(e: AnekdexError) -> Self {
        ApiError::Anekdex(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            ApiError::Anekdex(e) => {
                let (status, error_type) = match &e {
                    AnekdexError::InvalidRequest(_) => {
                        (StatusCode::BAD_REQUEST, "invalid_request")
                    }
                    AnekdexError::UnknownProperty(_) => {
                        (StatusCode::BAD_REQUEST, "unknown_property")
                    }
                    AnekdexError::ObjectStore(_) => (StatusCode::BAD_GATEWAY, "storage_error"),
                    AnekdexError::MissingCredentials(_) => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "missing_credentials")
                    }
                    _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
                };
                (status, error_type, e.to_string())
            }
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg),
        };

        let error_response = ErrorResponse::new(error_type, message);
        (status, Json(error_response)).into_response()
    }
}

/// Search the configured property for `?term=`.
///
/// A query string that fails to parse is answered like a missing term.
pub async fn search(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let term = query
        .map_err(|rejection| AnekdexError::InvalidRequest(rejection.body_text()))
        .and_then(|Query(query)| SearchHandler::require_term(query.term))
        .map_err(|e| {
            state.metrics.record_search_error();
            e
        })?;

    let results = state.handler.search(&term).await?;
    Ok(Json(SearchResponse::from(results)))
}

/// Health check endpoint
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let loaded = state.handler.loaded();
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: crate::VERSION.to_string(),
        index_loaded: loaded.is_some(),
        documents: loaded.map_or(0, |index| index.len()),
    })
}

/// Prometheus metrics endpoint
pub async fn metrics(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();
    let metric_families = state.metrics.registry().gather();
    let mut buffer = vec![];
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok((
        StatusCode::OK,
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4",
        )],
        buffer,
    ))
}
