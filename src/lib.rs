pub mod api;
pub mod bench;
pub mod codec;
pub mod config;
pub mod corpus;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod models;
pub mod storage;
pub mod tokenizer;

pub use api::{create_router, AppState, SearchHandler};
pub use bench::{BenchRecord, BenchReport, CodecBench};
pub use codec::Encoding;
pub use config::{BenchConfig, IndexSettings, Language, StorageConfig, TokenizerConfig};
pub use corpus::CorpusLoader;
pub use engine::{NativeFormat, SearchIndex, Snapshot};
pub use error::{AnekdexError, Result};
pub use metrics::SearchMetrics;
pub use models::*;
pub use storage::IndexSource;
pub use tokenizer::Tokenizer;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
