use prometheus::{Counter, CounterVec, Gauge, Histogram, HistogramOpts, Opts, Registry};
use std::sync::Arc;

/// Prometheus metrics for the search handler
#[derive(Clone)]
pub struct SearchMetrics {
    // Counters
    pub searches_total: CounterVec,
    pub search_errors: Counter,
    pub index_loads: Counter,
    pub index_load_failures: Counter,

    // Gauges
    pub total_documents: Gauge,
    pub snapshot_size_bytes: Gauge,

    // Histograms
    pub search_latency: Histogram,
    pub index_load_latency: Histogram,

    registry: Arc<Registry>,
}

impl SearchMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let searches_total = CounterVec::new(
            Opts::new("anekdex_searches_total", "Total number of searches by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(searches_total.clone()))?;

        let search_errors = Counter::with_opts(Opts::new(
            "anekdex_search_errors_total",
            "Total number of rejected or failed searches",
        ))?;
        registry.register(Box::new(search_errors.clone()))?;

        let index_loads = Counter::with_opts(Opts::new(
            "anekdex_index_loads_total",
            "Number of times the index was fetched from storage",
        ))?;
        registry.register(Box::new(index_loads.clone()))?;

        let index_load_failures = Counter::with_opts(Opts::new(
            "anekdex_index_load_failures_total",
            "Index fetches that fell back to an empty index",
        ))?;
        registry.register(Box::new(index_load_failures.clone()))?;

        let total_documents = Gauge::with_opts(Opts::new(
            "anekdex_total_documents",
            "Documents in the loaded index",
        ))?;
        registry.register(Box::new(total_documents.clone()))?;

        let snapshot_size_bytes = Gauge::with_opts(Opts::new(
            "anekdex_snapshot_size_bytes",
            "Size of the fetched compressed snapshot",
        ))?;
        registry.register(Box::new(snapshot_size_bytes.clone()))?;

        let search_latency = Histogram::with_opts(
            HistogramOpts::new("anekdex_search_latency_seconds", "Search latency")
                .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5]),
        )?;
        registry.register(Box::new(search_latency.clone()))?;

        let index_load_latency = Histogram::with_opts(
            HistogramOpts::new(
                "anekdex_index_load_latency_seconds",
                "Fetch, decompress and load latency of the index",
            )
            .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        )?;
        registry.register(Box::new(index_load_latency.clone()))?;

        Ok(Self {
            searches_total,
            search_errors,
            index_loads,
            index_load_failures,
            total_documents,
            snapshot_size_bytes,
            search_latency,
            index_load_latency,
            registry: Arc::new(registry),
        })
    }

    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    /// Record a completed search
    pub fn record_search(&self, hits: usize, duration_secs: f64) {
        let outcome = if hits == 0 { "empty" } else { "hit" };
        self.searches_total.with_label_values(&[outcome]).inc();
        self.search_latency.observe(duration_secs);
    }

    pub fn record_search_error(&self) {
        self.search_errors.inc();
    }

    /// Record a successful index load
    pub fn record_index_load(&self, documents: usize, snapshot_bytes: usize, duration_secs: f64) {
        self.index_loads.inc();
        self.total_documents.set(documents as f64);
        self.snapshot_size_bytes.set(snapshot_bytes as f64);
        self.index_load_latency.observe(duration_secs);
    }

    pub fn record_index_load_failure(&self) {
        self.index_load_failures.inc();
        self.total_documents.set(0.0);
    }
}
