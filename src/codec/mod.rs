//! Snapshot encodings compared by the bench.
//!
//! Every encoding is a pure `Snapshot -> bytes` / `bytes -> Snapshot` pair.
//! Snapshot maps are ordered, so encoding the same content twice yields the
//! same bytes.

pub mod compress;
pub mod proto;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::engine::persistence;
use crate::engine::Snapshot;
use crate::error::{AnekdexError, Result};
use crate::models::Schema;

pub use crate::engine::NativeFormat;
pub use compress::{BROTLI_BEST, BROTLI_FASTEST, GZIP_BEST, GZIP_DEFAULT, GZIP_FASTEST};

/// A snapshot encoding
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Encoding {
    Json,
    /// Gzip-compressed JSON at a level (0-9)
    Gzip(u32),
    /// Brotli-compressed JSON at a quality (0-11)
    Brotli(u32),
    MessagePack,
    /// Custom schema with the reshaped frequency table
    Protobuf,
    /// Delegated to the index's own persistence
    Native(NativeFormat),
}

impl Encoding {
    /// Suffix appended to `index.json` for this encoding's file
    pub fn file_suffix(&self) -> String {
        match self {
            Encoding::Json => String::new(),
            Encoding::Gzip(level) if *level == GZIP_DEFAULT => ".gz".to_string(),
            Encoding::Gzip(level) => format!(".gz{}", level),
            Encoding::Brotli(quality) => format!(".brotli{}", quality),
            Encoding::MessagePack => ".mp".to_string(),
            Encoding::Protobuf => ".pts".to_string(),
            Encoding::Native(format) => format!(".{}", format.extension()),
        }
    }

    /// File name of this encoding's output next to `base` (usually `index.json`)
    pub fn file_name(&self, base: &str) -> String {
        format!("{}{}", base, self.file_suffix())
    }

    pub fn encode(&self, snapshot: &Snapshot) -> Result<Vec<u8>> {
        match self {
            Encoding::Json => Ok(serde_json::to_vec(snapshot)?),
            Encoding::Gzip(level) => compress::gzip(&serde_json::to_vec(snapshot)?, *level),
            Encoding::Brotli(quality) => compress::brotli(&serde_json::to_vec(snapshot)?, *quality),
            Encoding::MessagePack => Ok(rmp_serde::to_vec_named(snapshot)?),
            Encoding::Protobuf => Ok(proto::encode(snapshot)),
            Encoding::Native(format) => persistence::persist(snapshot, *format),
        }
    }

    /// Decode bytes produced by [`Encoding::encode`].
    ///
    /// `schema` is only consulted by encodings that do not carry it.
    pub fn decode(&self, bytes: &[u8], schema: &Schema) -> Result<Snapshot> {
        match self {
            Encoding::Json => Ok(serde_json::from_slice(bytes)?),
            Encoding::Gzip(_) => Ok(serde_json::from_slice(&compress::gunzip(bytes)?)?),
            Encoding::Brotli(_) => Ok(serde_json::from_slice(&compress::unbrotli(bytes)?)?),
            Encoding::MessagePack => Ok(rmp_serde::from_slice(bytes)?),
            Encoding::Protobuf => proto::decode(bytes, schema),
            Encoding::Native(format) => persistence::restore(bytes, *format),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Encoding::Json => f.write_str("json"),
            Encoding::Gzip(level) => write!(f, "gzip:{}", level),
            Encoding::Brotli(quality) => write!(f, "brotli:{}", quality),
            Encoding::MessagePack => f.write_str("msgpack"),
            Encoding::Protobuf => f.write_str("protobuf"),
            Encoding::Native(format) => write!(f, "native:{}", format),
        }
    }
}

impl FromStr for Encoding {
    type Err = AnekdexError;

    /// Parses `json`, `gzip[:level]`, `brotli[:quality]`, `msgpack`,
    /// `protobuf`, `native:<binary|dpack|json>`
    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_lowercase();
        let (name, arg) = match lower.split_once(':') {
            Some((name, arg)) => (name, Some(arg)),
            None => (lower.as_str(), None),
        };
        let level = |default: u32, max: u32| -> Result<u32> {
            let value = match arg {
                Some(a) => a
                    .parse::<u32>()
                    .map_err(|_| AnekdexError::UnknownEncoding(s.to_string()))?,
                None => default,
            };
            if value > max {
                return Err(AnekdexError::UnknownEncoding(s.to_string()));
            }
            Ok(value)
        };

        match name {
            "json" => Ok(Encoding::Json),
            "gzip" | "gz" => Ok(Encoding::Gzip(level(GZIP_DEFAULT, GZIP_BEST)?)),
            "brotli" | "br" => Ok(Encoding::Brotli(level(BROTLI_BEST, BROTLI_BEST)?)),
            "msgpack" | "messagepack" | "mp" => Ok(Encoding::MessagePack),
            "protobuf" | "proto" | "pts" => Ok(Encoding::Protobuf),
            "native" => Ok(Encoding::Native(arg.unwrap_or("binary").parse()?)),
            _ => Err(AnekdexError::UnknownEncoding(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IndexSettings;
    use crate::engine::SearchIndex;
    use crate::models::document;

    fn sample_snapshot() -> Snapshot {
        let mut index = SearchIndex::new(IndexSettings::default());
        index.insert(document("joke", "Иваныч приходит в бар")).unwrap();
        index
            .insert(document("joke", "Бармен спрашивает: вам как обычно?"))
            .unwrap();
        index.save()
    }

    fn all_encodings() -> Vec<Encoding> {
        vec![
            Encoding::Json,
            Encoding::Gzip(GZIP_FASTEST),
            Encoding::Gzip(GZIP_BEST),
            Encoding::Brotli(BROTLI_FASTEST),
            Encoding::Brotli(BROTLI_BEST),
            Encoding::MessagePack,
            Encoding::Protobuf,
            Encoding::Native(NativeFormat::Binary),
            Encoding::Native(NativeFormat::Dpack),
            Encoding::Native(NativeFormat::Json),
        ]
    }

    #[test]
    fn test_every_encoding_roundtrips_exactly() {
        let snapshot = sample_snapshot();
        for encoding in all_encodings() {
            let bytes = encoding.encode(&snapshot).unwrap();
            let decoded = encoding.decode(&bytes, &snapshot.schema).unwrap();
            assert_eq!(decoded, snapshot, "encoding {}", encoding);
        }
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let snapshot = sample_snapshot();
        for encoding in all_encodings() {
            assert_eq!(
                encoding.encode(&snapshot).unwrap(),
                encoding.encode(&snapshot.clone()).unwrap(),
                "encoding {}",
                encoding
            );
        }
    }

    #[test]
    fn test_file_suffixes() {
        assert_eq!(Encoding::Json.file_name("index.json"), "index.json");
        assert_eq!(Encoding::Gzip(6).file_name("index.json"), "index.json.gz");
        assert_eq!(Encoding::Gzip(9).file_suffix(), ".gz9");
        assert_eq!(Encoding::Brotli(11).file_suffix(), ".brotli11");
        assert_eq!(Encoding::MessagePack.file_suffix(), ".mp");
        assert_eq!(Encoding::Protobuf.file_suffix(), ".pts");
        assert_eq!(Encoding::Native(NativeFormat::Dpack).file_suffix(), ".dpack");
    }

    #[test]
    fn test_parse_and_display_agree() {
        for encoding in all_encodings() {
            let parsed: Encoding = encoding.to_string().parse().unwrap();
            assert_eq!(parsed, encoding);
        }
        assert_eq!("gzip".parse::<Encoding>().unwrap(), Encoding::Gzip(GZIP_DEFAULT));
        assert_eq!("br".parse::<Encoding>().unwrap(), Encoding::Brotli(BROTLI_BEST));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!("gzip:10".parse::<Encoding>().is_err());
        assert!("brotli:x".parse::<Encoding>().is_err());
        assert!("native:yaml".parse::<Encoding>().is_err());
        assert!("xml".parse::<Encoding>().is_err());
    }

    #[test]
    fn test_compressed_json_decodes_to_plain_json_content() {
        let snapshot = sample_snapshot();
        let raw = Encoding::Json.encode(&snapshot).unwrap();
        let packed = Encoding::Gzip(GZIP_DEFAULT).encode(&snapshot).unwrap();
        assert_eq!(compress::gunzip(&packed).unwrap(), raw);
    }
}
