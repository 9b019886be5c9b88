use serde::{Deserialize, Serialize};

use crate::models::{SearchHit, SearchResults};

/// Query string of `GET /` and `GET /search`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchQuery {
    pub term: Option<String>,
}

/// Search response body; `elapsed` is rendered as a string
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub count: usize,
    pub hits: Vec<SearchHit>,
    pub elapsed: String,
}

impl From<SearchResults> for SearchResponse {
    fn from(results: SearchResults) -> Self {
        Self {
            count: results.count,
            hits: results.hits,
            elapsed: format!("{:?}", results.elapsed),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Whether the index has been fetched yet
    pub index_loaded: bool,
    pub documents: usize,
}

/// API Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}
