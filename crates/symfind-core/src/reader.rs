//! Bounded-memory chunked reading with boundary extension and hashing.
//!
//! [`ChunkReader`] pulls fixed-size chunks from any [`Read`] source. When a
//! chunk as read does not end on a zero byte it keeps reading until it does
//! (or the stream ends), so no zero-terminated symbol straddles two chunks.
//! Every byte handed out is also fed into a [`ContentHasher`], once and in
//! stream order.

use crate::error::{Error, Result};
use crate::hash::{ContentDigest, ContentHasher, DigestAlgorithm};
use std::io::{BufRead, BufReader, ErrorKind, Read};
use tracing::{debug, warn};

/// Nominal chunk size: 100 MiB
pub const DEFAULT_CHUNK_SIZE: usize = 100 * 1024 * 1024;

/// Capacity of the buffered reader used for boundary extension
const EXTENSION_BUFFER_SIZE: usize = 64 * 1024;

/// Configuration for [`ChunkReader`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderConfig {
    /// Nominal chunk size in bytes before boundary extension
    pub chunk_size: usize,
    /// Hash function for the content digest
    pub algorithm: DigestAlgorithm,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            algorithm: DigestAlgorithm::default(),
        }
    }
}

impl ReaderConfig {
    /// Creates a new reader config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the nominal chunk size
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size;
        self
    }

    /// Sets the digest algorithm
    pub fn algorithm(mut self, algorithm: DigestAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }
}

/// Streaming chunk source over a byte reader
#[derive(Debug)]
pub struct ChunkReader<R> {
    inner: BufReader<R>,
    buffer: Vec<u8>,
    hasher: ContentHasher,
    chunk_size: usize,
    bytes_read: u64,
    chunks_read: u64,
    exhausted: bool,
}

impl<R: Read> ChunkReader<R> {
    /// Wraps `inner` using the given configuration
    pub fn new(inner: R, config: &ReaderConfig) -> Result<Self> {
        if config.chunk_size == 0 {
            return Err(Error::InvalidChunkSize);
        }
        Ok(Self {
            inner: BufReader::with_capacity(EXTENSION_BUFFER_SIZE, inner),
            buffer: Vec::new(),
            hasher: ContentHasher::new(config.algorithm),
            chunk_size: config.chunk_size,
            bytes_read: 0,
            chunks_read: 0,
            exhausted: false,
        })
    }

    /// Reads the next chunk.
    ///
    /// Returns `Ok(None)` once the stream is exhausted. The returned slice is
    /// only valid until the next call; the backing buffer is reused.
    pub fn next_chunk(&mut self) -> Result<Option<&[u8]>> {
        if self.exhausted {
            return Ok(None);
        }

        self.buffer.clear();
        let filled = (&mut self.inner)
            .take(self.chunk_size as u64)
            .read_to_end(&mut self.buffer)
            .map_err(|e| Error::read(self.bytes_read + self.buffer.len() as u64, e))?;

        if filled == 0 {
            self.exhausted = true;
            return Ok(None);
        }

        if filled < self.chunk_size {
            // Short read from `take` means end of stream
            self.exhausted = true;
        } else {
            self.extend_to_terminator();
        }

        self.hasher.update(&self.buffer);
        self.bytes_read += self.buffer.len() as u64;
        self.chunks_read += 1;

        debug!(
            "Read chunk {} ({} bytes, {} past nominal size)",
            self.chunks_read,
            self.buffer.len(),
            self.buffer.len() - filled
        );

        Ok(Some(&self.buffer))
    }

    /// Appends bytes until the chunk ends on a zero byte or the stream ends.
    ///
    /// A read error here ends the chunk; whatever was read is kept and the
    /// error resurfaces on the next regular read if it persists.
    fn extend_to_terminator(&mut self) {
        while self.buffer.last().is_some_and(|&b| b != 0) {
            match self.inner.read_until(0, &mut self.buffer) {
                Ok(0) => {
                    self.exhausted = true;
                    break;
                }
                Ok(_) => {}
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => {
                    warn!(
                        "Read error while extending chunk at byte {}: {}",
                        self.bytes_read + self.buffer.len() as u64,
                        e
                    );
                    break;
                }
            }
        }
    }

    /// Total bytes handed out so far
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Number of chunks handed out so far
    pub fn chunks_read(&self) -> u64 {
        self.chunks_read
    }

    /// Consumes the reader and returns the digest of every byte handed out
    pub fn finish(self) -> ContentDigest {
        self.hasher.finalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn collect_chunks(data: &[u8], chunk_size: usize) -> (Vec<Vec<u8>>, ContentDigest) {
        let config = ReaderConfig::new().chunk_size(chunk_size);
        let mut reader = ChunkReader::new(Cursor::new(data), &config).unwrap();
        let mut chunks = Vec::new();
        while let Some(chunk) = reader.next_chunk().unwrap() {
            chunks.push(chunk.to_vec());
        }
        (chunks, reader.finish())
    }

    /// Reader that fails on every call after delivering `ok_bytes`
    struct FailingReader {
        data: Vec<u8>,
        position: usize,
        ok_bytes: usize,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.position >= self.ok_bytes {
                return Err(std::io::Error::new(ErrorKind::Other, "device error"));
            }
            let end = self.ok_bytes.min(self.data.len());
            let n = buf.len().min(end - self.position);
            buf[..n].copy_from_slice(&self.data[self.position..self.position + n]);
            self.position += n;
            Ok(n)
        }
    }

    #[test]
    fn test_empty_stream() {
        let (chunks, digest) = collect_chunks(b"", 4);
        assert!(chunks.is_empty());
        assert_eq!(digest, ContentHasher::digest(DigestAlgorithm::Sha256, b""));
    }

    #[test]
    fn test_chunk_extends_to_zero_byte() {
        let (chunks, _) = collect_chunks(b"abcdef\0ghi\0", 4);
        assert_eq!(chunks, vec![b"abcdef\0".to_vec(), b"ghi\0".to_vec()]);
    }

    #[test]
    fn test_chunk_ending_on_zero_is_not_extended() {
        let (chunks, _) = collect_chunks(b"abc\0defg", 4);
        assert_eq!(chunks, vec![b"abc\0".to_vec(), b"defg".to_vec()]);
    }

    #[test]
    fn test_extension_runs_to_end_of_stream() {
        let (chunks, _) = collect_chunks(b"abcdefghij", 3);
        assert_eq!(chunks, vec![b"abcdefghij".to_vec()]);
    }

    #[test]
    fn test_chunks_concatenate_to_input() {
        let data = b"\0\0abc\0\0\0defghijkl\0m\0nopqrs";
        for chunk_size in 1..=data.len() + 1 {
            let (chunks, digest) = collect_chunks(data, chunk_size);
            assert_eq!(chunks.concat(), data.to_vec(), "chunk size {}", chunk_size);
            assert_eq!(digest, ContentHasher::digest(DigestAlgorithm::Sha256, data));
        }
    }

    #[test]
    fn test_counters() {
        let config = ReaderConfig::new().chunk_size(2);
        let mut reader = ChunkReader::new(Cursor::new(b"a\0b\0c"), &config).unwrap();
        while reader.next_chunk().unwrap().is_some() {}
        assert_eq!(reader.bytes_read(), 5);
        assert_eq!(reader.chunks_read(), 3);
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let config = ReaderConfig::new().chunk_size(0);
        assert!(matches!(
            ChunkReader::new(Cursor::new(b""), &config),
            Err(Error::InvalidChunkSize)
        ));
    }

    #[test]
    fn test_read_error_is_reported() {
        let source = FailingReader {
            data: b"0123456789".to_vec(),
            position: 0,
            ok_bytes: 0,
        };
        let mut reader = ChunkReader::new(source, &ReaderConfig::new().chunk_size(4)).unwrap();
        assert!(matches!(reader.next_chunk(), Err(Error::Read { offset: 0, .. })));
    }

    #[test]
    fn test_read_error_during_extension_keeps_data() {
        let source = FailingReader {
            data: b"abcdefgh".to_vec(),
            position: 0,
            ok_bytes: 6,
        };
        let mut reader = ChunkReader::new(source, &ReaderConfig::new().chunk_size(4)).unwrap();
        let chunk = reader.next_chunk().unwrap().unwrap().to_vec();
        assert_eq!(chunk, b"abcdef".to_vec());
        assert!(reader.next_chunk().is_err());
    }

    #[test]
    fn test_blake3_digest() {
        let data = b"OlPrEfIxfoo\0";
        let config = ReaderConfig::new()
            .chunk_size(3)
            .algorithm(DigestAlgorithm::Blake3);
        let mut reader = ChunkReader::new(Cursor::new(data), &config).unwrap();
        while reader.next_chunk().unwrap().is_some() {}
        assert_eq!(
            reader.finish(),
            ContentHasher::digest(DigestAlgorithm::Blake3, data)
        );
    }
}
