//! Persisted symbol catalogs.
//!
//! A [`SymbolCollection`] is an ordered list of [`FileRecord`]s stored as
//! indented JSON:
//!
//! ```json
//! {
//!   "file_symbols": [
//!     {
//!       "name": "app.bin",
//!       "hash": "e3b0c442...",
//!       "symbols": ["foo", "bar"]
//!     }
//!   ]
//! }
//! ```
//!
//! At most one record exists per digest; [`SymbolCollection::upsert`]
//! replaces an existing record rather than appending a duplicate.

use crate::error::{Error, Result};
use crate::extract::Extraction;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Suffix appended to an input path to form its per-file output
pub const SIDECAR_SUFFIX: &str = ".symbols.json";

/// Symbols found in one binary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Base name of the scanned file
    pub name: String,
    /// Lowercase hex content digest
    pub hash: String,
    /// Symbols found in the file
    #[serde(default)]
    pub symbols: Vec<String>,
}

impl FileRecord {
    /// Creates a new record
    pub fn new(name: impl Into<String>, hash: impl Into<String>, symbols: Vec<String>) -> Self {
        Self {
            name: name.into(),
            hash: hash.into(),
            symbols,
        }
    }

    /// Builds the record for `path` from a finished extraction
    pub fn from_extraction(path: &Path, extraction: Extraction) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self {
            name,
            hash: extraction.digest.to_hex(),
            symbols: extraction.symbols.into_strings(),
        }
    }
}

/// Ordered catalog of file records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolCollection {
    /// Records in insertion order
    #[serde(default)]
    pub file_symbols: Vec<FileRecord>,
}

impl SymbolCollection {
    /// Creates an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a collection, treating a missing file as empty
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = match fs::read(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No collection at {}, starting empty", path.display());
                return Ok(Self::new());
            }
            Err(e) => return Err(Error::file_read(path, e)),
        };

        let collection: Self =
            serde_json::from_slice(&content).map_err(|e| Error::collection_parse(path, e))?;
        debug!(
            "Loaded {} records from {}",
            collection.len(),
            path.display()
        );
        Ok(collection)
    }

    /// Writes the collection as two-space indented JSON with a trailing newline
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| Error::file_write(path, e))?;
        let mut writer = BufWriter::new(file);

        serde_json::to_writer_pretty(&mut writer, self).map_err(|e| {
            if e.is_io() {
                Error::file_write(path, e.into())
            } else {
                Error::collection_serialize(path, e)
            }
        })?;
        writer
            .write_all(b"\n")
            .and_then(|()| writer.flush())
            .map_err(|e| Error::file_write(path, e))?;

        trace!("Wrote {} records to {}", self.len(), path.display());
        Ok(())
    }

    /// Inserts a record, first removing every record with the same hash
    pub fn upsert(&mut self, record: FileRecord) {
        let before = self.file_symbols.len();
        self.file_symbols.retain(|existing| existing.hash != record.hash);
        if self.file_symbols.len() != before {
            debug!("Replacing record for {} ({})", record.name, record.hash);
        }
        self.file_symbols.push(record);
    }

    /// Looks up a record by digest
    pub fn get(&self, hash: &str) -> Option<&FileRecord> {
        self.file_symbols.iter().find(|r| r.hash == hash)
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.file_symbols.len()
    }

    /// Returns true if the collection has no records
    pub fn is_empty(&self) -> bool {
        self.file_symbols.is_empty()
    }

    /// Iterates over records in order
    pub fn iter(&self) -> std::slice::Iter<'_, FileRecord> {
        self.file_symbols.iter()
    }
}

impl From<FileRecord> for SymbolCollection {
    fn from(record: FileRecord) -> Self {
        Self {
            file_symbols: vec![record],
        }
    }
}

/// Per-file output path: the full input path with [`SIDECAR_SUFFIX`] appended
pub fn sidecar_path(input: impl AsRef<Path>) -> PathBuf {
    let mut path = OsString::from(input.as_ref().as_os_str());
    path.push(SIDECAR_SUFFIX);
    PathBuf::from(path)
}

/// Returns true if `path` looks like a per-file output
pub fn is_sidecar(path: impl AsRef<Path>) -> bool {
    path.as_ref()
        .file_name()
        .map(|n| n.to_string_lossy().ends_with(SIDECAR_SUFFIX))
        .unwrap_or(false)
}
