//! Object storage holding the published index.
//!
//! The published object is `index.json` compressed with gzip. Fetching
//! reverses that: download, gunzip, parse JSON, load.

use bytes::Bytes;
use object_store::aws::AmazonS3Builder;
use object_store::path::Path as ObjectPath;
use object_store::{ObjectStore, PutPayload};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::codec::compress::{self, GZIP_DEFAULT};
use crate::config::StorageConfig;
use crate::engine::{SearchIndex, Snapshot};
use crate::error::{AnekdexError, Result};

pub const ACCESS_KEY_VAR: &str = "AWS_ACCESS_KEY_ID";
pub const SECRET_KEY_VAR: &str = "AWS_SECRET_ACCESS_KEY";

/// A single snapshot object in a bucket
#[derive(Clone)]
pub struct IndexSource {
    store: Arc<dyn ObjectStore>,
    location: ObjectPath,
}

impl IndexSource {
    pub fn new(store: Arc<dyn ObjectStore>, key: &str) -> Self {
        Self {
            store,
            location: ObjectPath::from(key),
        }
    }

    /// S3-compatible store with credentials from the process environment.
    ///
    /// A missing credential variable is fatal.
    pub fn from_env(config: &StorageConfig) -> Result<Self> {
        Self::from_lookup(config, |name| std::env::var(name).ok())
    }

    /// Like [`IndexSource::from_env`] with a custom variable lookup
    pub fn from_lookup(
        config: &StorageConfig,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let access_key = lookup(ACCESS_KEY_VAR)
            .filter(|v| !v.is_empty())
            .ok_or(AnekdexError::MissingCredentials(ACCESS_KEY_VAR))?;
        let secret_key = lookup(SECRET_KEY_VAR)
            .filter(|v| !v.is_empty())
            .ok_or(AnekdexError::MissingCredentials(SECRET_KEY_VAR))?;

        let store = AmazonS3Builder::new()
            .with_endpoint(&config.endpoint)
            .with_region(&config.region)
            .with_bucket_name(&config.bucket)
            .with_access_key_id(access_key)
            .with_secret_access_key(secret_key)
            .with_virtual_hosted_style_request(false)
            .build()?;

        debug!(
            "Object store {} bucket={} key={}",
            config.endpoint, config.bucket, config.key
        );
        Ok(Self::new(Arc::new(store), &config.key))
    }

    pub fn key(&self) -> &str {
        self.location.as_ref()
    }

    /// Raw (still compressed) object bytes
    pub async fn fetch_bytes(&self) -> Result<Bytes> {
        let result = self.store.get(&self.location).await?;
        Ok(result.bytes().await?)
    }

    /// Download and decode the snapshot, returning it with the compressed size
    pub async fn fetch_snapshot(&self) -> Result<(Snapshot, usize)> {
        let start = Instant::now();
        let packed = self.fetch_bytes().await?;
        let raw = compress::gunzip(&packed)?;
        let snapshot: Snapshot = serde_json::from_slice(&raw)?;
        info!(
            "Fetched {} ({} bytes, {} documents) in {:?}",
            self.key(),
            packed.len(),
            snapshot.document_count(),
            start.elapsed()
        );
        Ok((snapshot, packed.len()))
    }

    /// Fetch the snapshot and load it into `index`.
    ///
    /// Returns the compressed object size.
    pub async fn load_into(&self, index: &mut SearchIndex) -> Result<usize> {
        let (snapshot, size) = self.fetch_snapshot().await?;
        index.load(snapshot)?;
        Ok(size)
    }

    /// Gzip `json` (the contents of `index.json`) and upload it.
    ///
    /// The payload must parse as a snapshot; returns the uploaded size.
    pub async fn publish(&self, json: &[u8]) -> Result<usize> {
        let snapshot: Snapshot = serde_json::from_slice(json)?;
        snapshot.validate().map_err(AnekdexError::CorruptSnapshot)?;

        let packed = compress::gzip(json, GZIP_DEFAULT)?;
        let size = packed.len();
        self.store
            .put(&self.location, PutPayload::from(packed))
            .await?;
        info!(
            "Published {} documents to {} ({} bytes)",
            snapshot.document_count(),
            self.key(),
            size
        );
        Ok(size)
    }

    pub async fn publish_file(&self, path: impl AsRef<Path>) -> Result<usize> {
        let json = tokio::fs::read(path.as_ref()).await?;
        self.publish(&json).await
    }
}
