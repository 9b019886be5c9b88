//! Snapshot codec bench.
//!
//! Runs strictly in sequence: index (or read `index.json`), serialize, then
//! for each encoding encode -> write -> read -> decode -> load -> verify.
//! Every stage is timed; results are logged and collected into a
//! [`BenchReport`]. Nothing here asserts on the numbers.

use std::fmt::Write as _;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{error, info, warn};

use crate::codec::Encoding;
use crate::config::{BenchConfig, IndexSettings};
use crate::corpus::CorpusLoader;
use crate::engine::{SearchIndex, Snapshot};
use crate::error::Result;
use crate::models::SearchParams;

/// Measurements for one encoding
#[derive(Clone, Debug)]
pub struct BenchRecord {
    pub encoding: Encoding,
    pub file: PathBuf,
    pub size_bytes: u64,
    pub encode: Duration,
    pub write: Duration,
    pub read: Duration,
    pub decode: Duration,
    pub load: Duration,
    /// `None` when no verification queries were configured
    pub verified: Option<bool>,
}

/// Result of a full bench run
#[derive(Clone, Debug, Default)]
pub struct BenchReport {
    pub documents: usize,
    pub index_time: Option<Duration>,
    pub serialize_time: Duration,
    pub records: Vec<BenchRecord>,
}

impl BenchReport {
    /// Size of the raw JSON snapshot, the baseline for ratios
    pub fn json_size(&self) -> Option<u64> {
        self.records
            .iter()
            .find(|r| r.encoding == Encoding::Json)
            .map(|r| r.size_bytes)
    }

    pub fn record(&self, encoding: Encoding) -> Option<&BenchRecord> {
        self.records.iter().find(|r| r.encoding == encoding)
    }

    /// Pairs `(lowest, higher)` where a higher level produced larger output
    /// than the lowest level of the same compressor
    pub fn compression_regressions(&self) -> Vec<(Encoding, Encoding)> {
        let mut regressions = Vec::new();
        let families: [fn(&Encoding) -> Option<u32>; 2] = [
            |e| match e {
                Encoding::Gzip(l) => Some(*l),
                _ => None,
            },
            |e| match e {
                Encoding::Brotli(q) => Some(*q),
                _ => None,
            },
        ];

        for level_of in families {
            let mut sweep: Vec<(u32, &BenchRecord)> = self
                .records
                .iter()
                .filter_map(|r| level_of(&r.encoding).map(|l| (l, r)))
                .collect();
            sweep.sort_by_key(|(level, _)| *level);

            if let Some((_, lowest)) = sweep.first() {
                for (_, higher) in sweep.iter().skip(1) {
                    if higher.size_bytes > lowest.size_bytes {
                        regressions.push((lowest.encoding, higher.encoding));
                    }
                }
            }
        }
        regressions
    }

    /// Human-readable comparison table
    pub fn render_table(&self) -> String {
        let baseline = self.json_size().unwrap_or(0).max(1) as f64;
        let mut out = String::new();

        let _ = writeln!(out, "\n=== Snapshot Codec Bench ===");
        let _ = writeln!(out, "Documents: {}", self.documents);
        if let Some(t) = self.index_time {
            let _ = writeln!(out, "Index time: {:?}", t);
        }
        let _ = writeln!(out, "Serialize time: {:?}", self.serialize_time);
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{:<16} {:<24} {:>12} {:>7} {:>12} {:>12} {:>12} {:>8}",
            "encoding", "file", "bytes", "ratio", "encode", "decode", "load", "verify"
        );
        for r in &self.records {
            let verify = match r.verified {
                Some(true) => "ok",
                Some(false) => "MISMATCH",
                None => "-",
            };
            let _ = writeln!(
                out,
                "{:<16} {:<24} {:>12} {:>6.1}% {:>12} {:>12} {:>12} {:>8}",
                r.encoding.to_string(),
                r.file
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                r.size_bytes,
                r.size_bytes as f64 / baseline * 100.0,
                format!("{:.2?}", r.encode),
                format!("{:.2?}", r.decode),
                format!("{:.2?}", r.load),
                verify
            );
        }
        out
    }
}

/// Sequential snapshot codec bench
pub struct CodecBench {
    config: BenchConfig,
    settings: IndexSettings,
}

impl CodecBench {
    pub fn new(config: BenchConfig, settings: IndexSettings) -> Self {
        Self { config, settings }
    }

    /// Build the source index: from the corpus when configured, otherwise
    /// from the existing `index.json`.
    ///
    /// A corpus read failure is logged and indexing stops with whatever was
    /// inserted before the failure.
    pub async fn prepare(&self) -> Result<(SearchIndex, Option<Duration>)> {
        let mut index = SearchIndex::new(self.settings.clone());

        match &self.config.corpus {
            Some(corpus) => {
                let start = Instant::now();
                let loader =
                    CorpusLoader::new(self.config.field.as_str(), self.config.marker.as_str());
                if let Err(e) = loader.load_into(corpus, &mut index).await {
                    error!("Indexing {:?} aborted: {}", corpus, e);
                }
                let elapsed = start.elapsed();
                info!("index: {} documents in {:?}", index.len(), elapsed);
                Ok((index, Some(elapsed)))
            }
            None => {
                let path = self.config.json_path();
                let start = Instant::now();
                let bytes = tokio::fs::read(&path).await?;
                let snapshot = Encoding::Json.decode(&bytes, index.schema())?;
                index.load(snapshot)?;
                info!(
                    "loadRaw: {} documents from {:?} in {:?}",
                    index.len(),
                    path,
                    start.elapsed()
                );
                Ok((index, None))
            }
        }
    }

    /// Index the corpus and write `index.json`, returning the document count
    /// and the written path.
    ///
    /// Follows [`CodecBench::prepare`], so a corpus read failure still writes
    /// the records indexed before it.
    pub async fn write_index_json(&self) -> Result<(usize, PathBuf)> {
        let (index, _) = self.prepare().await?;
        tokio::fs::create_dir_all(&self.config.data_dir).await?;

        let path = self.config.json_path();
        let json = Encoding::Json.encode(&index.save())?;
        tokio::fs::write(&path, &json).await?;
        info!(
            "Wrote {} documents ({} bytes) to {:?}",
            index.len(),
            json.len(),
            path
        );
        Ok((index.len(), path))
    }

    /// Run the full sweep
    pub async fn run(&self) -> Result<BenchReport> {
        tokio::fs::create_dir_all(&self.config.data_dir).await?;

        let (index, index_time) = self.prepare().await?;

        let start = Instant::now();
        let snapshot = index.save();
        let serialize_time = start.elapsed();
        info!("save: {:?}", serialize_time);

        let mut report = BenchReport {
            documents: index.len(),
            index_time,
            serialize_time,
            records: Vec::new(),
        };

        for encoding in self.config.encodings() {
            let record = self.run_encoding(&index, &snapshot, encoding).await?;
            report.records.push(record);
        }

        for (lowest, higher) in report.compression_regressions() {
            warn!(
                "{} produced larger output than {}; compression is not monotonic here",
                higher, lowest
            );
        }
        Ok(report)
    }

    /// Encode, write, read back, decode and load one encoding
    pub async fn run_encoding(
        &self,
        source: &SearchIndex,
        snapshot: &Snapshot,
        encoding: Encoding,
    ) -> Result<BenchRecord> {
        let file = self.config.data_dir.join(encoding.file_name("index.json"));

        let start = Instant::now();
        let bytes = encoding.encode(snapshot)?;
        let encode = start.elapsed();

        let start = Instant::now();
        tokio::fs::write(&file, &bytes).await?;
        let write = start.elapsed();

        let start = Instant::now();
        let read_back = tokio::fs::read(&file).await?;
        let read = start.elapsed();

        let start = Instant::now();
        let decoded = encoding.decode(&read_back, source.schema())?;
        let decode = start.elapsed();

        let start = Instant::now();
        let mut fresh = SearchIndex::new(self.settings.clone());
        fresh.load(decoded)?;
        let load = start.elapsed();

        let verified = if self.config.verify_queries.is_empty() {
            None
        } else {
            let mismatches = self.verify(source, &fresh);
            for query in &mismatches {
                warn!("{}: results for '{}' differ after round trip", encoding, query);
            }
            Some(mismatches.is_empty())
        };

        info!(
            encoding = %encoding,
            bytes = bytes.len(),
            ?encode,
            ?write,
            ?read,
            ?decode,
            ?load,
            "round trip"
        );

        Ok(BenchRecord {
            encoding,
            file,
            size_bytes: bytes.len() as u64,
            encode,
            write,
            read,
            decode,
            load,
            verified,
        })
    }

    /// Queries whose results differ between `original` and `reloaded`
    pub fn verify(&self, original: &SearchIndex, reloaded: &SearchIndex) -> Vec<String> {
        self.config
            .verify_queries
            .iter()
            .filter(|query| {
                let params = SearchParams::new(query.as_str())
                    .with_properties([self.config.field.as_str()])
                    .with_limit(original.len().max(1));
                match (original.search(&params), reloaded.search(&params)) {
                    (Ok(a), Ok(b)) => a.count != b.count || a.hits != b.hits,
                    _ => true,
                }
            })
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(encoding: Encoding, size_bytes: u64) -> BenchRecord {
        BenchRecord {
            encoding,
            file: PathBuf::from("index.json"),
            size_bytes,
            encode: Duration::from_millis(1),
            write: Duration::ZERO,
            read: Duration::ZERO,
            decode: Duration::from_millis(2),
            load: Duration::from_millis(3),
            verified: Some(true),
        }
    }

    #[test]
    fn test_compression_regressions_detected() {
        let report = BenchReport {
            records: vec![
                record(Encoding::Json, 1000),
                record(Encoding::Gzip(1), 300),
                record(Encoding::Gzip(9), 310),
                record(Encoding::Brotli(0), 280),
                record(Encoding::Brotli(11), 200),
            ],
            ..Default::default()
        };

        let regressions = report.compression_regressions();
        assert_eq!(regressions, vec![(Encoding::Gzip(1), Encoding::Gzip(9))]);
    }

    #[test]
    fn test_render_table_lists_every_encoding() {
        let report = BenchReport {
            documents: 2,
            records: vec![record(Encoding::Json, 1000), record(Encoding::MessagePack, 600)],
            ..Default::default()
        };
        let table = report.render_table();

        assert!(table.contains("json"));
        assert!(table.contains("msgpack"));
        assert!(table.contains("60.0%"));
        assert_eq!(report.json_size(), Some(1000));
    }
}
