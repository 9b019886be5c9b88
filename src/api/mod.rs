pub mod handlers;
pub mod router;
pub mod service;
pub mod types;

pub use handlers::ApiError;
pub use router::{create_router, AppState};
pub use service::SearchHandler;
pub use types::{ErrorResponse, HealthResponse, SearchQuery, SearchResponse};
