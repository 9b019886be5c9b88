use anekdex::{
    AnekdexError, BenchConfig, CodecBench, Encoding, IndexSettings, IndexSource, Language,
    Schema, SearchHandler, SearchIndex, SearchMetrics, SearchParams, StorageConfig,
    TokenizerConfig,
};
use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "anekdex")]
#[command(about = "Search index snapshot codec bench and search handler", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Index a corpus and write index.json
    Index {
        #[command(flatten)]
        index: IndexArgs,

        /// Corpus file with <|startoftext|>-separated records
        #[arg(long, env = "ANEKDEX_CORPUS")]
        corpus: PathBuf,

        #[arg(long, env = "ANEKDEX_DATA_DIR", default_value = "./data")]
        data_dir: PathBuf,

        /// Start-of-record marker
        #[arg(long, env = "ANEKDEX_MARKER", default_value = anekdex::config::DEFAULT_MARKER)]
        marker: String,
    },

    /// Encode, decode and reload index.json with every encoding
    Bench {
        #[command(flatten)]
        index: IndexArgs,

        #[arg(long, env = "ANEKDEX_DATA_DIR", default_value = "./data")]
        data_dir: PathBuf,

        /// Re-index this corpus before benchmarking instead of reading index.json
        #[arg(long, env = "ANEKDEX_CORPUS")]
        corpus: Option<PathBuf>,

        #[arg(long, value_delimiter = ',', default_value = "1,6,9")]
        gzip_levels: Vec<u32>,

        #[arg(long, value_delimiter = ',', default_value = "0,5,11")]
        brotli_qualities: Vec<u32>,

        /// Queries compared between the source and each reloaded index
        #[arg(long, value_delimiter = ',')]
        verify: Option<Vec<String>>,
    },

    /// Load an encoded snapshot and run a query
    Search {
        #[command(flatten)]
        index: IndexArgs,

        /// Snapshot file
        #[arg(long, default_value = "./data/index.json")]
        snapshot: PathBuf,

        /// Snapshot encoding: json, gzip:6, brotli:11, msgpack, protobuf, native:binary, ...
        #[arg(long, default_value = "json")]
        encoding: String,

        #[arg(long, default_value = "10")]
        limit: usize,

        /// Match whole words only
        #[arg(long)]
        exact: bool,

        term: String,
    },

    /// Gzip index.json and upload it to object storage
    Publish {
        #[command(flatten)]
        storage: StorageArgs,

        #[arg(long, default_value = "./data/index.json")]
        snapshot: PathBuf,
    },

    /// Serve searches over the published index
    Serve {
        #[command(flatten)]
        index: IndexArgs,

        #[command(flatten)]
        storage: StorageArgs,

        #[arg(long, env = "ANEKDEX_HTTP_PORT", default_value = "8080")]
        http_port: u16,
    },
}

#[derive(ClapArgs)]
struct IndexArgs {
    /// Text property holding each record
    #[arg(long, env = "ANEKDEX_FIELD", default_value = anekdex::config::DEFAULT_FIELD)]
    field: String,

    /// Stemmer and stop-word language
    #[arg(long, env = "ANEKDEX_LANGUAGE", default_value = "russian")]
    language: String,
}

impl IndexArgs {
    fn settings(&self) -> IndexSettings {
        let language = self.language.parse().unwrap_or_else(|_| {
            warn!("Unknown language '{}', using 'russian'", self.language);
            Language::Russian
        });
        let tokenizer = TokenizerConfig {
            language,
            ..Default::default()
        };
        IndexSettings::new(Schema::single(&self.field)).with_tokenizer(tokenizer)
    }
}

#[derive(ClapArgs)]
struct StorageArgs {
    #[arg(long, env = "ANEKDEX_S3_ENDPOINT", default_value = "https://storage.yandexcloud.net")]
    endpoint: String,

    #[arg(long, env = "ANEKDEX_S3_REGION", default_value = "ru-central1")]
    region: String,

    #[arg(long, env = "ANEKDEX_S3_BUCKET", default_value = "sls-search")]
    bucket: String,

    #[arg(long, env = "ANEKDEX_S3_KEY", default_value = "index")]
    key: String,
}

impl StorageArgs {
    fn config(&self) -> StorageConfig {
        StorageConfig {
            region: self.region.clone(),
            ..StorageConfig::default()
        }
        .with_endpoint(&self.endpoint)
        .with_bucket(&self.bucket)
        .with_key(&self.key)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let result = run(cli.command).await;
    if let Err(e) = &result {
        if e.downcast_ref::<AnekdexError>().is_some_and(AnekdexError::is_fatal) {
            error!("Fatal: {}", e);
            std::process::exit(2);
        }
    }
    result
}

async fn run(command: Command) -> Result<()> {
    match command {
        Command::Index {
            index,
            corpus,
            data_dir,
            marker,
        } => run_index(index, corpus, data_dir, marker).await,
        Command::Bench {
            index,
            data_dir,
            corpus,
            gzip_levels,
            brotli_qualities,
            verify,
        } => {
            let mut config = BenchConfig::new(data_dir)
                .with_field(index.field.as_str())
                .with_gzip_levels(gzip_levels)
                .with_brotli_qualities(brotli_qualities);
            if let Some(corpus) = corpus {
                config = config.with_corpus(corpus);
            }
            if let Some(queries) = verify {
                config = config.with_verify_queries(queries);
            }

            let report = CodecBench::new(config, index.settings()).run().await?;
            println!("{}", report.render_table());
            Ok(())
        }
        Command::Search {
            index,
            snapshot,
            encoding,
            limit,
            exact,
            term,
        } => {
            let encoding: Encoding = encoding.parse()?;
            let settings = index.settings();
            let bytes = tokio::fs::read(&snapshot)
                .await
                .with_context(|| format!("reading {:?}", snapshot))?;

            let decoded = encoding.decode(&bytes, &settings.schema)?;
            let mut search_index = SearchIndex::new(settings);
            search_index.load(decoded)?;

            let params = SearchParams::new(term)
                .with_properties([index.field.as_str()])
                .exact(exact)
                .with_limit(limit);
            let results = search_index.search(&params)?;
            println!("{}", serde_json::to_string_pretty(&results)?);
            Ok(())
        }
        Command::Publish { storage, snapshot } => {
            let source = IndexSource::from_env(&storage.config())?;
            let size = source.publish_file(&snapshot).await?;
            info!("Uploaded {:?} as '{}' ({} bytes)", snapshot, source.key(), size);
            Ok(())
        }
        Command::Serve {
            index,
            storage,
            http_port,
        } => run_serve(index, storage, http_port).await,
    }
}

async fn run_index(
    index: IndexArgs,
    corpus: PathBuf,
    data_dir: PathBuf,
    marker: String,
) -> Result<()> {
    let config = BenchConfig::new(data_dir)
        .with_corpus(corpus)
        .with_field(index.field.as_str())
        .with_marker(marker);

    // A corpus read failure is logged and the partial index is still written
    CodecBench::new(config, index.settings())
        .write_index_json()
        .await?;
    Ok(())
}

async fn run_serve(index: IndexArgs, storage: StorageArgs, http_port: u16) -> Result<()> {
    info!("Starting anekdex v{}", anekdex::VERSION);

    // Missing credentials abort startup
    let source = IndexSource::from_env(&storage.config())?;

    let metrics = Arc::new(SearchMetrics::new()?);
    let handler = SearchHandler::new(source, index.settings(), index.field.as_str(), metrics);
    let app = anekdex::create_router(anekdex::AppState::new(handler));

    let http_addr = format!("0.0.0.0:{}", http_port);
    let listener = tokio::net::TcpListener::bind(&http_addr).await?;
    info!("HTTP search handler listening on {}", http_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
            info!("Received shutdown signal, gracefully shutting down");
        })
        .await?;

    Ok(())
}
