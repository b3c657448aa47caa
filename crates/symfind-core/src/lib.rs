//! # symfind-core
//!
//! A library for cataloguing marker-prefixed symbols embedded in compiled binaries.
//!
//! This crate provides the core functionality for:
//! - Streaming arbitrarily large files in bounded-size chunks
//! - Extracting zero-terminated symbols that follow a fixed marker
//! - Hashing file content incrementally while it streams
//! - Persisting per-file results in a JSON catalog keyed by content digest
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`reader`]: Chunked reading with boundary extension and hashing
//! - [`scanner`]: Marker search and symbol extraction within a chunk
//! - [`extract`]: Drives the reader and scanner over a whole file
//! - [`collection`]: JSON catalog records and update policy
//! - [`hash`], [`symbols`]: Digest and symbol-set primitives
//! - [`error`]: Error types and handling
//!
//! ## Example
//!
//! ```no_run
//! use symfind_core::{Extractor, FileRecord, SymbolCollection};
//! use std::path::Path;
//!
//! let path = Path::new("./target/release/my_app");
//! let extraction = Extractor::new().extract_file(path)?;
//!
//! let mut catalog = SymbolCollection::load("symbols.json")?;
//! catalog.upsert(FileRecord::from_extraction(path, extraction));
//! catalog.save("symbols.json")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Extensibility
//!
//! - [`ScanStrategy`]: Customize how symbols are recognised within a chunk
//!

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unreachable_pub)]

pub mod collection;
pub mod error;
pub mod extract;
pub mod hash;
pub mod reader;
pub mod scanner;
pub mod symbols;

// Re-export primary types for convenience
pub use collection::{sidecar_path, FileRecord, SymbolCollection};
pub use error::{Error, Result};
pub use extract::{Extraction, Extractor, ExtractorConfig};
pub use hash::{ContentDigest, ContentHasher, DigestAlgorithm};
pub use reader::{ChunkReader, ReaderConfig, DEFAULT_CHUNK_SIZE};
pub use scanner::{Marker, MarkerScanner, ScanStrategy, DEFAULT_MARKER};
pub use symbols::SymbolSet;

/// Crate version for programmatic access
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
