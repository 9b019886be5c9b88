//! Corpus loader for sentinel-delimited text files.
//!
//! Every record starts on a line beginning with the marker; following lines
//! are appended to it until the next marker. Empty lines are skipped.

use std::path::Path;
use std::time::{Duration, Instant};

use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use crate::config::{DEFAULT_FIELD, DEFAULT_MARKER};
use crate::engine::SearchIndex;
use crate::error::Result;
use crate::models::document;

/// Accumulates lines into records
#[derive(Debug)]
pub struct RecordSplitter {
    marker: String,
    current: String,
}

impl RecordSplitter {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            current: String::new(),
        }
    }

    /// Feed one line; returns the previous record when a marker closes it
    pub fn push_line(&mut self, line: &str) -> Option<String> {
        if line.is_empty() {
            return None;
        }
        if line.starts_with(self.marker.as_str()) {
            let rest = line.replacen(self.marker.as_str(), "", 1);
            let finished = std::mem::replace(&mut self.current, rest);
            return Some(finished).filter(|r| !r.is_empty());
        }
        self.current.push_str(line);
        None
    }

    /// Flush the trailing record at end of input
    pub fn finish(self) -> Option<String> {
        Some(self.current).filter(|r| !r.is_empty())
    }
}

/// Statistics of one corpus load
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LoadStats {
    pub records: usize,
    pub lines: usize,
    pub skipped_empty: usize,
    pub elapsed: Duration,
}

/// Reads a corpus file into a [`SearchIndex`]
#[derive(Clone, Debug)]
pub struct CorpusLoader {
    field: String,
    marker: String,
}

impl Default for CorpusLoader {
    fn default() -> Self {
        Self::new(DEFAULT_FIELD, DEFAULT_MARKER)
    }
}

impl CorpusLoader {
    pub fn new(field: impl Into<String>, marker: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            marker: marker.into(),
        }
    }

    /// Stream the corpus at `path` into `index`.
    ///
    /// Insertion is additive: on a read error the records inserted so far
    /// stay in the index and the error is returned.
    pub async fn load_into(
        &self,
        path: impl AsRef<Path>,
        index: &mut SearchIndex,
    ) -> Result<LoadStats> {
        let path = path.as_ref();
        let start = Instant::now();
        let mut stats = LoadStats::default();

        let file = File::open(path).await?;
        let mut lines = BufReader::new(file).lines();
        let mut splitter = RecordSplitter::new(self.marker.as_str());

        while let Some(line) = lines.next_line().await? {
            stats.lines += 1;
            if line.is_empty() {
                stats.skipped_empty += 1;
                continue;
            }
            if let Some(record) = splitter.push_line(&line) {
                index.insert(document(&self.field, record))?;
                stats.records += 1;
            }
        }
        if let Some(record) = splitter.finish() {
            index.insert(document(&self.field, record))?;
            stats.records += 1;
        }

        stats.elapsed = start.elapsed();
        debug!(?path, lines = stats.lines, skipped = stats.skipped_empty, "corpus read");
        info!(
            "Indexed {} records from {:?} in {:?}",
            stats.records, path, stats.elapsed
        );
        Ok(stats)
    }
}
