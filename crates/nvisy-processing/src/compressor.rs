//! Compression collaborator.
//!
//! Treated as a pure function over byte buffers, the same way the typed
//! processors treat their decode/parse libraries: the orchestrator calls
//! it inline and never inspects the compressed bytes itself.

use std::io::Write;

use flate2::write::GzEncoder;
use flate2::Compression;

use crate::error::ProcessingError;

pub trait Compressor: Send + Sync {
    fn compress(&self, bytes: &[u8]) -> Result<Vec<u8>, ProcessingError>;
}

/// Default gzip-based compressor.
pub struct GzipCompressor {
    level: Compression,
}

impl GzipCompressor {
    pub fn new() -> Self {
        Self {
            level: Compression::default(),
        }
    }
}

impl Default for GzipCompressor {
    fn default() -> Self {
        Self::new()
    }
}

impl Compressor for GzipCompressor {
    fn compress(&self, bytes: &[u8]) -> Result<Vec<u8>, ProcessingError> {
        let mut encoder = GzEncoder::new(Vec::new(), self.level);
        encoder
            .write_all(bytes)
            .map_err(|err| ProcessingError::retryable(err.to_string()))?;
        encoder
            .finish()
            .map_err(|err| ProcessingError::retryable(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compressing_repetitive_data_shrinks_it() {
        let compressor = GzipCompressor::new();
        let bytes = vec![b'a'; 4096];
        let compressed = compressor.compress(&bytes).unwrap();
        assert!(compressed.len() < bytes.len());
    }
}
