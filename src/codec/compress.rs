//! Byte-level compression used by the compressed JSON encodings.

use std::io::{Read, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::error::{AnekdexError, Result};

pub const GZIP_FASTEST: u32 = 1;
pub const GZIP_DEFAULT: u32 = 6;
pub const GZIP_BEST: u32 = 9;

pub const BROTLI_FASTEST: u32 = 0;
pub const BROTLI_BEST: u32 = 11;

const BROTLI_BUFFER: usize = 4096;
const BROTLI_LGWIN: u32 = 22;

/// Gzip-compress `data` at `level` (0-9)
pub fn gzip(data: &[u8], level: u32) -> Result<Vec<u8>> {
    if level > GZIP_BEST {
        return Err(AnekdexError::UnknownEncoding(format!("gzip level {}", level)));
    }
    let mut encoder = GzEncoder::new(Vec::new(), Compression::new(level));
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

pub fn gunzip(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    GzDecoder::new(data).read_to_end(&mut out)?;
    Ok(out)
}

/// Brotli-compress `data` at `quality` (0-11)
pub fn brotli(data: &[u8], quality: u32) -> Result<Vec<u8>> {
    if quality > BROTLI_BEST {
        return Err(AnekdexError::UnknownEncoding(format!(
            "brotli quality {}",
            quality
        )));
    }
    let mut out = Vec::new();
    {
        let mut encoder =
            brotli::CompressorWriter::new(&mut out, BROTLI_BUFFER, quality, BROTLI_LGWIN);
        encoder.write_all(data)?;
        encoder.flush()?;
    }
    Ok(out)
}

pub fn unbrotli(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    brotli::Decompressor::new(data, BROTLI_BUFFER).read_to_end(&mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<u8> {
        "Иваныч приходит в бар. ".repeat(200).into_bytes()
    }

    #[test]
    fn test_gzip_roundtrip_and_shrinks() {
        let data = sample();
        let packed = gzip(&data, GZIP_DEFAULT).unwrap();
        assert!(packed.len() < data.len());
        assert_eq!(gunzip(&packed).unwrap(), data);
    }

    #[test]
    fn test_brotli_roundtrip_and_shrinks() {
        let data = sample();
        let packed = brotli(&data, BROTLI_BEST).unwrap();
        assert!(packed.len() < data.len());
        assert_eq!(unbrotli(&packed).unwrap(), data);
    }

    #[test]
    fn test_compression_is_deterministic() {
        let data = sample();
        assert_eq!(gzip(&data, 9).unwrap(), gzip(&data, 9).unwrap());
        assert_eq!(brotli(&data, 5).unwrap(), brotli(&data, 5).unwrap());
    }

    #[test]
    fn test_empty_input() {
        assert!(gunzip(&gzip(b"", GZIP_FASTEST).unwrap()).unwrap().is_empty());
        assert!(unbrotli(&brotli(b"", BROTLI_FASTEST).unwrap()).unwrap().is_empty());
    }

    #[test]
    fn test_out_of_range_levels_rejected() {
        assert!(gzip(b"x", 10).is_err());
        assert!(brotli(b"x", 12).is_err());
    }

    #[test]
    fn test_garbage_fails_to_decompress() {
        assert!(gunzip(b"definitely not gzip").is_err());
    }
}
