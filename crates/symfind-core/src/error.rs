//! Error types for the symfind-core library.
//!
//! This module provides error handling using the `thiserror` crate, with one
//! variant per failure mode of the scan and persistence paths.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for symfind operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for all symfind operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Failed to open or read an input file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        /// Path to the file that failed to read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to create or write an output file
    #[error("failed to write file '{path}': {source}")]
    FileWrite {
        /// Path to the file that failed to write
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Read failure on a stream that has no associated path
    #[error("failed to read input stream at byte {offset}: {source}")]
    Read {
        /// Number of bytes successfully consumed before the failure
        offset: u64,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// An existing collection file could not be decoded
    #[error("failed to parse symbol collection '{path}': {source}")]
    CollectionParse {
        /// Path to the malformed collection
        path: PathBuf,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// A collection could not be encoded
    #[error("failed to serialize symbol collection '{path}': {source}")]
    CollectionSerialize {
        /// Destination of the collection
        path: PathBuf,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// Marker token cannot be used for scanning
    #[error("invalid marker {marker:?}: {reason}")]
    InvalidMarker {
        /// The rejected marker, lossily decoded
        marker: String,
        /// Why it was rejected
        reason: &'static str,
    },

    /// Chunk size of zero
    #[error("chunk size must be greater than zero")]
    InvalidChunkSize,
}

impl Error {
    /// Creates a new file read error
    pub fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Creates a new file write error
    pub fn file_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileWrite {
            path: path.into(),
            source,
        }
    }

    /// Creates a new stream read error
    pub fn read(offset: u64, source: std::io::Error) -> Self {
        Self::Read { offset, source }
    }

    /// Creates a new collection parse error
    pub fn collection_parse(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::CollectionParse {
            path: path.into(),
            source,
        }
    }

    /// Creates a new collection serialization error
    pub fn collection_serialize(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::CollectionSerialize {
            path: path.into(),
            source,
        }
    }

    /// Creates a new invalid marker error
    pub fn invalid_marker(marker: &[u8], reason: &'static str) -> Self {
        Self::InvalidMarker {
            marker: String::from_utf8_lossy(marker).into_owned(),
            reason,
        }
    }

    /// Returns true if the error comes from the underlying filesystem or stream
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            Self::FileRead { .. } | Self::FileWrite { .. } | Self::Read { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::file_read(
            "/bin/app",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.to_string().contains("failed to read"));
        assert!(err.to_string().contains("/bin/app"));
    }

    #[test]
    fn test_invalid_marker_display() {
        let err = Error::invalid_marker(b"ab\0", "contains a zero byte");
        assert!(err.to_string().contains("zero byte"));
    }

    #[test]
    fn test_is_io() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        assert!(Error::read(12, io).is_io());
        assert!(!Error::InvalidChunkSize.is_io());
    }
}
