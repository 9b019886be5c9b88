pub mod document;
pub mod search;

pub use document::{document, Document, DocumentId, FieldKind, Schema};
pub use search::{SearchHit, SearchParams, SearchResults};
