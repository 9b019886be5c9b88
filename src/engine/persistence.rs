//! Native persistence plugin.
//!
//! Binary frame layout (`binary` and `dpack`):
//! - 4 bytes magic `ANKX`
//! - u32 snapshot version (little endian)
//! - u8 format tag
//! - u32 crc32 of payload
//! - u64 payload length
//! - payload (bincode; fixed-width integers for `binary`, varints for `dpack`)
//!
//! The `json` format is a `{version, snapshot}` envelope.

use bincode::Options;
use crc32fast::Hasher;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::engine::snapshot::{Snapshot, VersionedSnapshot, SNAPSHOT_VERSION};
use crate::engine::SearchIndex;
use crate::error::{AnekdexError, Result};

const MAGIC: &[u8; 4] = b"ANKX";
const HEADER_LEN: usize = 4 + 4 + 1 + 4 + 8;

/// Persistence formats implemented by the index itself
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NativeFormat {
    Binary,
    Dpack,
    Json,
}

impl NativeFormat {
    fn tag(self) -> u8 {
        match self {
            NativeFormat::Binary => 1,
            NativeFormat::Dpack => 2,
            NativeFormat::Json => 3,
        }
    }

    /// File extension used next to `index.json`
    pub fn extension(self) -> &'static str {
        match self {
            NativeFormat::Binary => "bin",
            NativeFormat::Dpack => "dpack",
            NativeFormat::Json => "native.json",
        }
    }
}

impl fmt::Display for NativeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NativeFormat::Binary => "binary",
            NativeFormat::Dpack => "dpack",
            NativeFormat::Json => "json",
        };
        f.write_str(name)
    }
}

impl FromStr for NativeFormat {
    type Err = AnekdexError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "binary" | "bin" => Ok(NativeFormat::Binary),
            "dpack" => Ok(NativeFormat::Dpack),
            "json" => Ok(NativeFormat::Json),
            other => Err(AnekdexError::UnknownEncoding(format!("native:{}", other))),
        }
    }
}

fn frame(format: NativeFormat, payload: Vec<u8>) -> Vec<u8> {
    let mut hasher = Hasher::new();
    hasher.update(&payload);
    let crc32 = hasher.finalize();

    let mut out = Vec::with_capacity(HEADER_LEN + payload.len());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&SNAPSHOT_VERSION.to_le_bytes());
    out.push(format.tag());
    out.extend_from_slice(&crc32.to_le_bytes());
    out.extend_from_slice(&(payload.len() as u64).to_le_bytes());
    out.extend_from_slice(&payload);
    out
}

fn unframe(format: NativeFormat, data: &[u8]) -> Result<&[u8]> {
    if data.len() < HEADER_LEN || &data[0..4] != MAGIC {
        return Err(AnekdexError::CorruptSnapshot("bad magic".to_string()));
    }

    let mut word = [0u8; 4];
    word.copy_from_slice(&data[4..8]);
    let version = u32::from_le_bytes(word);
    if version > SNAPSHOT_VERSION {
        return Err(AnekdexError::IncompatibleSnapshot {
            expected: SNAPSHOT_VERSION,
            actual: version,
        });
    }

    if data[8] != format.tag() {
        return Err(AnekdexError::CorruptSnapshot(format!(
            "format tag {} does not match {}",
            data[8], format
        )));
    }

    word.copy_from_slice(&data[9..13]);
    let stored_crc = u32::from_le_bytes(word);
    let mut len = [0u8; 8];
    len.copy_from_slice(&data[13..21]);
    let len = u64::from_le_bytes(len) as usize;

    let payload = &data[HEADER_LEN..];
    if payload.len() != len {
        return Err(AnekdexError::CorruptSnapshot(format!(
            "payload length mismatch: expected {}, found {}",
            len,
            payload.len()
        )));
    }

    let mut hasher = Hasher::new();
    hasher.update(payload);
    if hasher.finalize() != stored_crc {
        return Err(AnekdexError::CorruptSnapshot(
            "checksum mismatch (corrupt payload)".to_string(),
        ));
    }
    Ok(payload)
}

/// Serialize a snapshot in a native format
pub fn persist(snapshot: &Snapshot, format: NativeFormat) -> Result<Vec<u8>> {
    match format {
        NativeFormat::Binary => Ok(frame(format, bincode::serialize(snapshot)?)),
        NativeFormat::Dpack => Ok(frame(
            format,
            bincode::DefaultOptions::new().serialize(snapshot)?,
        )),
        NativeFormat::Json => Ok(serde_json::to_vec(&VersionedSnapshot::new(
            snapshot.clone(),
        ))?),
    }
}

/// Deserialize a snapshot written by [`persist`]
pub fn restore(data: &[u8], format: NativeFormat) -> Result<Snapshot> {
    match format {
        NativeFormat::Binary => Ok(bincode::deserialize(unframe(format, data)?)?),
        NativeFormat::Dpack => {
            Ok(bincode::DefaultOptions::new().deserialize(unframe(format, data)?)?)
        }
        NativeFormat::Json => {
            let envelope: VersionedSnapshot = serde_json::from_slice(data)?;
            if !envelope.is_compatible() {
                return Err(AnekdexError::IncompatibleSnapshot {
                    expected: SNAPSHOT_VERSION,
                    actual: envelope.version,
                });
            }
            Ok(envelope.snapshot)
        }
    }
}

impl SearchIndex {
    /// Save the index in a native format
    pub fn persist(&self, format: NativeFormat) -> Result<Vec<u8>> {
        persist(&self.save(), format)
    }

    /// Load the index from a native format
    pub fn restore(&mut self, data: &[u8], format: NativeFormat) -> Result<()> {
        let snapshot = restore(data, format)?;
        self.load(snapshot)
    }
}
