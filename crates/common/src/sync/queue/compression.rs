use std::io::{Read, Write};

use flate2::read::{GzDecoder, ZlibDecoder};
use flate2::write::{GzEncoder, ZlibEncoder};
use flate2::Compression;

use crate::error::CommonError;
use crate::sync::queue::errors::QueueResult;

/// Compression algorithms supported
#[derive(Debug, Clone, Copy)]
pub enum CompressionAlgorithm {
    Gzip,
    Zlib,
}

/// Compression service for queue data
pub struct CompressionService {
    algorithm: CompressionAlgorithm,
    level: u32,
}

impl CompressionService {
    /// Create new compression service
    pub fn new(algorithm: CompressionAlgorithm, level: u32) -> Self {
        Self { algorithm, level: level.min(9) }
    }

    /// Compress data
    pub fn compress(&self, data: &[u8]) -> QueueResult<Vec<u8>> {
        let compression_level = Compression::new(self.level);

        match self.algorithm {
            CompressionAlgorithm::Gzip => {
                let mut encoder = GzEncoder::new(Vec::new(), compression_level);
                encoder.write_all(data).map_err(|e| {
                    CommonError::internal(format!("Gzip compression failed: {}", e))
                })?;
                encoder.finish().map_err(|e| {
                    CommonError::internal(format!("Gzip finalization failed: {}", e)).into()
                })
            }
            CompressionAlgorithm::Zlib => {
                let mut encoder = ZlibEncoder::new(Vec::new(), compression_level);
                encoder.write_all(data).map_err(|e| {
                    CommonError::internal(format!("Zlib compression failed: {}", e))
                })?;
                encoder.finish().map_err(|e| {
                    CommonError::internal(format!("Zlib finalization failed: {}", e)).into()
                })
            }
        }
    }

    /// Decompress data
    pub fn decompress(&self, data: &[u8]) -> QueueResult<Vec<u8>> {
        match self.algorithm {
            CompressionAlgorithm::Gzip => {
                let mut decoder = GzDecoder::new(data);
                let mut decompressed = Vec::new();
                decoder.read_to_end(&mut decompressed).map_err(|e| {
                    CommonError::internal(format!("Gzip decompression failed: {}", e))
                })?;
                Ok(decompressed)
            }
            CompressionAlgorithm::Zlib => {
                let mut decoder = ZlibDecoder::new(data);
                let mut decompressed = Vec::new();
                decoder.read_to_end(&mut decompressed).map_err(|e| {
                    CommonError::internal(format!("Zlib decompression failed: {}", e))
                })?;
                Ok(decompressed)
            }
        }
    }

    /// Calculate compression ratio
    pub fn compression_ratio(&self, original: usize, compressed: usize) -> f64 {
        if original == 0 {
            return 0.0;
        }
        (1.0 - (compressed as f64 / original as f64)) * 100.0
    }

    /// Estimate compressed size (heuristic)
    pub fn estimate_compressed_size(&self, original_size: usize) -> usize {
        // Rough estimates based on typical compression ratios
        let ratio = match self.algorithm {
            CompressionAlgorithm::Gzip => match self.level {
                0..=3 => 0.7,
                4..=6 => 0.5,
                7..=9 => 0.4,
                _ => 0.5,
            },
            CompressionAlgorithm::Zlib => match self.level {
                0..=3 => 0.65,
                4..=6 => 0.45,
                7..=9 => 0.35,
                _ => 0.45,
            },
        };
        (original_size as f64 * ratio) as usize
    }
}

impl Default for CompressionService {
    fn default() -> Self {
        Self::new(CompressionAlgorithm::Gzip, 6)
    }
}
