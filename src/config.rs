use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use crate::codec::{Encoding, NativeFormat};
use crate::error::AnekdexError;
use crate::models::Schema;

/// Default property the corpus text is stored into
pub const DEFAULT_FIELD: &str = "joke";

/// Default start-of-record marker of the corpus file
pub const DEFAULT_MARKER: &str = "<|startoftext|>";

/// Index settings configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IndexSettings {
    pub schema: Schema,
    pub tokenizer_config: TokenizerConfig,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            schema: Schema::single(DEFAULT_FIELD),
            tokenizer_config: TokenizerConfig::default(),
        }
    }
}

impl IndexSettings {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            ..Default::default()
        }
    }

    pub fn with_tokenizer(mut self, tokenizer_config: TokenizerConfig) -> Self {
        self.tokenizer_config = tokenizer_config;
        self
    }
}

/// Stemming and stop-word language
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    English,
    Russian,
    German,
    French,
    Spanish,
}

impl FromStr for Language {
    type Err = AnekdexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "english" | "en" => Ok(Language::English),
            "russian" | "ru" => Ok(Language::Russian),
            "german" | "de" => Ok(Language::German),
            "french" | "fr" => Ok(Language::French),
            "spanish" | "es" => Ok(Language::Spanish),
            other => Err(AnekdexError::InvalidRequest(format!(
                "unsupported language '{}'",
                other
            ))),
        }
    }
}

/// Tokenizer configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenizerConfig {
    pub lowercase: bool,
    pub remove_stopwords: bool,
    pub stem: bool,
    /// Bounds are counted in characters, not bytes
    pub min_token_length: usize,
    pub max_token_length: usize,
    pub language: Language,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            lowercase: true,
            remove_stopwords: true,
            stem: true,
            min_token_length: 1,
            max_token_length: 50,
            language: Language::Russian,
        }
    }
}

/// S3-compatible object storage location of the published index
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub endpoint: String,
    pub region: String,
    pub bucket: String,
    pub key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://storage.yandexcloud.net".to_string(),
            region: "ru-central1".to_string(),
            bucket: "sls-search".to_string(),
            key: "index".to_string(),
        }
    }
}

impl StorageConfig {
    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = bucket.into();
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

/// Codec bench configuration
#[derive(Clone, Debug)]
pub struct BenchConfig {
    /// Directory holding `index.json` and its encoded siblings
    pub data_dir: PathBuf,
    /// Corpus to index first; when absent the bench reads `index.json`
    pub corpus: Option<PathBuf>,
    pub field: String,
    pub marker: String,
    pub gzip_levels: Vec<u32>,
    pub brotli_qualities: Vec<u32>,
    pub native_formats: Vec<NativeFormat>,
    /// Queries replayed against each reloaded index
    pub verify_queries: Vec<String>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            corpus: None,
            field: DEFAULT_FIELD.to_string(),
            marker: DEFAULT_MARKER.to_string(),
            gzip_levels: vec![1, 6, 9],
            brotli_qualities: vec![0, 5, 11],
            native_formats: vec![NativeFormat::Binary, NativeFormat::Dpack, NativeFormat::Json],
            verify_queries: vec!["Иваныч".to_string(), "бар".to_string(), "приходит".to_string()],
        }
    }
}

impl BenchConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            ..Default::default()
        }
    }

    pub fn with_corpus(mut self, corpus: PathBuf) -> Self {
        self.corpus = Some(corpus);
        self
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }

    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    pub fn with_gzip_levels(mut self, levels: Vec<u32>) -> Self {
        self.gzip_levels = levels;
        self
    }

    pub fn with_brotli_qualities(mut self, qualities: Vec<u32>) -> Self {
        self.brotli_qualities = qualities;
        self
    }

    pub fn with_verify_queries(mut self, queries: Vec<String>) -> Self {
        self.verify_queries = queries;
        self
    }

    /// Path of the raw JSON snapshot
    pub fn json_path(&self) -> PathBuf {
        self.data_dir.join("index.json")
    }

    /// Every encoding the bench sweeps, in run order
    pub fn encodings(&self) -> Vec<Encoding> {
        let mut encodings = vec![Encoding::Json];
        encodings.extend(self.gzip_levels.iter().map(|&l| Encoding::Gzip(l)));
        encodings.extend(self.brotli_qualities.iter().map(|&q| Encoding::Brotli(q)));
        encodings.push(Encoding::MessagePack);
        encodings.push(Encoding::Protobuf);
        encodings.extend(self.native_formats.iter().map(|&f| Encoding::Native(f)));
        encodings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_configs() {
        let settings = IndexSettings::default();
        assert!(settings.schema.contains(DEFAULT_FIELD));
        assert_eq!(settings.tokenizer_config.language, Language::Russian);

        let storage = StorageConfig::default();
        assert_eq!(storage.bucket, "sls-search");
        assert_eq!(storage.key, "index");
    }

    #[test]
    fn test_language_parsing() {
        assert_eq!("Russian".parse::<Language>().unwrap(), Language::Russian);
        assert_eq!("en".parse::<Language>().unwrap(), Language::English);
        assert!("klingon".parse::<Language>().is_err());
    }

    #[test]
    fn test_bench_encodings_cover_sweep() {
        let config = BenchConfig::new(PathBuf::from("/tmp/bench"))
            .with_gzip_levels(vec![1, 9])
            .with_brotli_qualities(vec![0, 11]);
        let encodings = config.encodings();

        assert_eq!(encodings[0], Encoding::Json);
        assert!(encodings.contains(&Encoding::Gzip(9)));
        assert!(encodings.contains(&Encoding::Brotli(0)));
        assert!(encodings.contains(&Encoding::Protobuf));
        assert!(encodings.contains(&Encoding::Native(NativeFormat::Dpack)));
        assert_eq!(encodings.len(), 1 + 2 + 2 + 2 + 3);
        assert_eq!(config.json_path(), PathBuf::from("/tmp/bench/index.json"));
    }
}
