use std::sync::Arc;
use std::time::Instant;

use tokio::sync::OnceCell;
use tracing::{error, info};

use crate::config::IndexSettings;
use crate::engine::SearchIndex;
use crate::error::{AnekdexError, Result};
use crate::metrics::SearchMetrics;
use crate::models::{SearchParams, SearchResults};
use crate::storage::IndexSource;

/// Serves searches over an index fetched from object storage.
///
/// The index is fetched on the first search and kept for the life of the
/// process. If the fetch fails the error is logged and searches run against
/// an empty index; there is no retry.
pub struct SearchHandler {
    source: IndexSource,
    settings: IndexSettings,
    property: String,
    index: OnceCell<Arc<SearchIndex>>,
    metrics: Arc<SearchMetrics>,
}

impl SearchHandler {
    pub fn new(
        source: IndexSource,
        settings: IndexSettings,
        property: impl Into<String>,
        metrics: Arc<SearchMetrics>,
    ) -> Self {
        Self {
            source,
            settings,
            property: property.into(),
            index: OnceCell::new(),
            metrics,
        }
    }

    pub fn metrics(&self) -> &Arc<SearchMetrics> {
        &self.metrics
    }

    /// Loaded index, if the first search already happened
    pub fn loaded(&self) -> Option<&Arc<SearchIndex>> {
        self.index.get()
    }

    /// The shared index, fetching it on first use
    pub async fn index(&self) -> Arc<SearchIndex> {
        self.index.get_or_init(|| self.load()).await.clone()
    }

    async fn load(&self) -> Arc<SearchIndex> {
        let start = Instant::now();
        let mut index = SearchIndex::new(self.settings.clone());
        info!("Loading index from {}", self.source.key());

        match self.source.load_into(&mut index).await {
            Ok(size) => {
                let elapsed = start.elapsed();
                info!("Loaded {} documents in {:?}", index.len(), elapsed);
                self.metrics
                    .record_index_load(index.len(), size, elapsed.as_secs_f64());
            }
            Err(e) => {
                error!("Failed to load index, serving empty index: {}", e);
                self.metrics.record_index_load_failure();
                index = SearchIndex::new(self.settings.clone());
            }
        }
        Arc::new(index)
    }

    /// Search `term` in the configured property
    pub async fn search(&self, term: &str) -> Result<SearchResults> {
        let index = self.index().await;
        let params = SearchParams::new(term).with_properties([self.property.as_str()]);

        match index.search(&params) {
            Ok(results) => {
                self.metrics
                    .record_search(results.count, results.elapsed.as_secs_f64());
                Ok(results)
            }
            Err(e) => {
                self.metrics.record_search_error();
                Err(e)
            }
        }
    }

    /// Reject the request before touching the index
    pub fn require_term(term: Option<String>) -> Result<String> {
        term.ok_or_else(|| {
            AnekdexError::InvalidRequest("missing query parameter 'term'".to_string())
        })
    }
}
