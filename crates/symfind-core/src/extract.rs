//! Extraction driver: streams a source through the chunk reader and the
//! scanner, producing the symbol set and content digest for one file.

use crate::error::{Error, Result};
use crate::hash::{ContentDigest, DigestAlgorithm};
use crate::reader::{ChunkReader, ReaderConfig, DEFAULT_CHUNK_SIZE};
use crate::scanner::{Marker, MarkerScanner, ScanStrategy};
use crate::symbols::SymbolSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Configuration for an [`Extractor`]
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Nominal chunk size in bytes
    pub chunk_size: usize,
    /// Marker preceding each symbol
    pub marker: Marker,
    /// Hash function for the content digest
    pub algorithm: DigestAlgorithm,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            marker: Marker::default(),
            algorithm: DigestAlgorithm::default(),
        }
    }
}

impl ExtractorConfig {
    /// Creates a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the nominal chunk size
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size;
        self
    }

    /// Sets the marker token
    pub fn marker(mut self, marker: Marker) -> Self {
        self.marker = marker;
        self
    }

    /// Sets the digest algorithm
    pub fn algorithm(mut self, algorithm: DigestAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    fn reader_config(&self) -> ReaderConfig {
        ReaderConfig::new()
            .chunk_size(self.chunk_size)
            .algorithm(self.algorithm)
    }
}

/// Everything learned from scanning one stream
#[derive(Debug, Clone)]
pub struct Extraction {
    /// Unique symbols found
    pub symbols: SymbolSet,
    /// Digest of the full stream
    pub digest: ContentDigest,
    /// Total bytes consumed
    pub bytes_scanned: u64,
    /// Number of chunks processed
    pub chunks: u64,
}

/// Drives a [`ScanStrategy`] over a chunked stream
#[derive(Debug, Clone)]
pub struct Extractor<S = MarkerScanner> {
    strategy: S,
    reader_config: ReaderConfig,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor {
    /// Creates an extractor with default configuration
    pub fn new() -> Self {
        Self::with_config(ExtractorConfig::default())
    }

    /// Creates a marker-based extractor with custom configuration
    pub fn with_config(config: ExtractorConfig) -> Self {
        let reader_config = config.reader_config();
        Self {
            strategy: MarkerScanner::with_marker(config.marker),
            reader_config,
        }
    }
}

impl<S: ScanStrategy> Extractor<S> {
    /// Creates an extractor for a custom strategy
    pub fn with_strategy(strategy: S, reader_config: ReaderConfig) -> Self {
        Self {
            strategy,
            reader_config,
        }
    }

    /// Scans a stream to completion
    pub fn extract<R: Read>(&self, source: R) -> Result<Extraction> {
        let mut reader = ChunkReader::new(source, &self.reader_config)?;
        let mut symbols = SymbolSet::new();

        while let Some(chunk) = reader.next_chunk()? {
            self.strategy.scan_chunk(chunk, &mut symbols);
        }

        let bytes_scanned = reader.bytes_read();
        let chunks = reader.chunks_read();
        let digest = reader.finish();

        debug!(
            "Extraction complete: {} symbols in {} bytes ({} chunks), {} {}",
            symbols.len(),
            bytes_scanned,
            chunks,
            digest.algorithm(),
            digest
        );

        Ok(Extraction {
            symbols,
            digest,
            bytes_scanned,
            chunks,
        })
    }

    /// Opens and scans a file
    pub fn extract_file(&self, path: impl AsRef<Path>) -> Result<Extraction> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::file_read(path, e))?;
        debug!("Scanning {}", path.display());
        self.extract(file).map_err(|e| match e {
            Error::Read { source, .. } => Error::file_read(path, source),
            other => other,
        })
    }
}

/// Scan a file with the default marker, chunk size and digest
pub fn extract_file(path: impl AsRef<Path>) -> Result<Extraction> {
    Extractor::new().extract_file(path)
}

/// Scan a file with custom configuration
pub fn extract_file_with_config(
    path: impl AsRef<Path>,
    config: ExtractorConfig,
) -> Result<Extraction> {
    Extractor::with_config(config).extract_file(path)
}
