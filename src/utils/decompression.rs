//! Magic-byte compression detection and decompression
//!
//! Guide sources frequently serve gzip payloads from URLs with no telling
//! extension, so detection works on content, never on the URL.

use std::io::Read;

use bytes::Bytes;
use flate2::read::GzDecoder;

use crate::errors::{SourceError, SourceResult};

/// Compression formats detected by magic bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionFormat {
    Gzip,
    Uncompressed,
}

/// Magic file detection and decompression utility
pub struct DecompressionService;

impl DecompressionService {
    /// Detect compression format using magic bytes
    pub fn detect_compression_format(data: &[u8]) -> CompressionFormat {
        if data.len() >= 2 && data[0..2] == [0x1f, 0x8b] {
            CompressionFormat::Gzip
        } else {
            CompressionFormat::Uncompressed
        }
    }

    /// Decompress data based on detected format
    pub fn decompress(data: Bytes) -> SourceResult<Vec<u8>> {
        match Self::detect_compression_format(&data) {
            CompressionFormat::Gzip => Self::decompress_gzip(data),
            CompressionFormat::Uncompressed => Ok(data.to_vec()),
        }
    }

    fn decompress_gzip(data: Bytes) -> SourceResult<Vec<u8>> {
        let mut decoder = GzDecoder::new(data.as_ref());
        let mut decompressed = Vec::new();
        decoder
            .read_to_end(&mut decompressed)
            .map_err(|e| SourceError::Decompression {
                message: format!("gzip: {e}"),
            })?;
        Ok(decompressed)
    }
}
