//! Chunk scanning for marker-prefixed symbols.
//!
//! ## Algorithm Overview
//!
//! 1. Split the chunk at every non-overlapping occurrence of the marker
//! 2. Drop the bytes preceding the first marker
//! 3. For each remaining segment, take the bytes before its first zero byte
//! 4. Insert them into the [`SymbolSet`]
//!
//! A segment with no zero byte yields nothing. The chunk reader guarantees
//! that chunks end on a zero byte (or at end of stream), so a symbol is never
//! split across two chunks. An unterminated symbol at the very end of the
//! stream is therefore dropped.
//!
//! ## Extensibility
//!
//! The [`ScanStrategy`] trait allows custom extraction rules:
//!
//! ```no_run
//! use symfind_core::scanner::ScanStrategy;
//! use symfind_core::SymbolSet;
//!
//! struct Printable;
//!
//! impl ScanStrategy for Printable {
//!     fn scan_chunk(&self, chunk: &[u8], symbols: &mut SymbolSet) {
//!         for run in chunk.split(|b| !b.is_ascii_graphic()) {
//!             if run.len() >= 8 {
//!                 symbols.insert(run);
//!             }
//!         }
//!     }
//! }
//! ```

mod marker;

use crate::symbols::SymbolSet;
use tracing::trace;

pub use marker::{find_subsequence, terminated_prefix, Marker, Segments, DEFAULT_MARKER};

/// Trait for implementing custom symbol extraction rules
pub trait ScanStrategy: Send + Sync {
    /// Scan one chunk and insert every symbol it contains into `symbols`
    fn scan_chunk(&self, chunk: &[u8], symbols: &mut SymbolSet);

    /// Scan a standalone buffer into a fresh set
    fn scan(&self, data: &[u8]) -> SymbolSet {
        let mut symbols = SymbolSet::new();
        self.scan_chunk(data, &mut symbols);
        symbols
    }
}

/// Reference strategy: symbols follow a fixed marker and end at a zero byte
#[derive(Debug, Clone, Default)]
pub struct MarkerScanner {
    marker: Marker,
}

impl MarkerScanner {
    /// Creates a scanner using [`DEFAULT_MARKER`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a scanner for a custom marker
    pub fn with_marker(marker: Marker) -> Self {
        Self { marker }
    }

    /// The marker this scanner searches for
    pub fn marker(&self) -> &Marker {
        &self.marker
    }
}

impl ScanStrategy for MarkerScanner {
    fn scan_chunk(&self, chunk: &[u8], symbols: &mut SymbolSet) {
        if chunk.is_empty() {
            return;
        }

        let before = symbols.len();
        let mut dropped = 0usize;

        for segment in self.marker.segments(chunk) {
            match terminated_prefix(segment) {
                Some(symbol) => {
                    symbols.insert(symbol);
                }
                None => dropped += 1,
            }
        }

        trace!(
            "Scanned {} bytes: {} new symbols, {} unterminated segments",
            chunk.len(),
            symbols.len() - before,
            dropped
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn strings(set: SymbolSet) -> Vec<String> {
        set.into_strings()
    }

    #[test]
    fn test_two_symbols() {
        let data = b"OlPrEfIxfoo\0OlPrEfIxbar\0";
        assert_eq!(strings(MarkerScanner::new().scan(data)), vec!["bar", "foo"]);
    }

    #[test]
    fn test_unterminated_symbol_is_dropped() {
        let data = b"OlPrEfIxfoo\0OlPrEfIxtrunc";
        let symbols = MarkerScanner::new().scan(data);
        assert!(symbols.contains(b"foo"));
        assert!(!symbols.contains(b"trunc"));
        assert_eq!(symbols.len(), 1);
    }

    #[test]
    fn test_bytes_before_first_marker_ignored() {
        let data = b"junk\0OlPrEfIxreal\0";
        assert_eq!(strings(MarkerScanner::new().scan(data)), vec!["real"]);
    }

    #[test]
    fn test_empty_chunk_leaves_set_unchanged() {
        let mut symbols = SymbolSet::new();
        symbols.insert(b"kept");
        MarkerScanner::new().scan_chunk(&[], &mut symbols);
        assert_eq!(symbols.len(), 1);
    }

    #[test]
    fn test_duplicates_collapse() {
        let data = b"OlPrEfIxdup\0xxOlPrEfIxdup\0OlPrEfIxdup\0";
        assert_eq!(MarkerScanner::new().scan(data).len(), 1);
    }

    #[test]
    fn test_symbol_stops_at_first_zero() {
        let data = b"OlPrEfIxname\0trailing\0garbage";
        assert_eq!(strings(MarkerScanner::new().scan(data)), vec!["name"]);
    }

    #[test]
    fn test_marker_then_zero_yields_empty_symbol() {
        let symbols = MarkerScanner::new().scan(b"OlPrEfIx\0");
        assert!(symbols.contains(b""));
    }

    #[test]
    fn test_marker_is_case_sensitive() {
        let data = b"olprefixlower\0";
        assert!(MarkerScanner::new().scan(data).is_empty());
    }

    #[test]
    fn test_custom_marker() {
        let scanner = MarkerScanner::with_marker("@@".parse().unwrap());
        let symbols = scanner.scan(b"@@a\0@@b\0OlPrEfIxc\0");
        assert_eq!(strings(symbols), vec!["a", "b"]);
    }

    #[test]
    fn test_accumulates_across_calls() {
        let scanner = MarkerScanner::new();
        let mut symbols = SymbolSet::new();
        scanner.scan_chunk(b"OlPrEfIxone\0", &mut symbols);
        scanner.scan_chunk(b"OlPrEfIxtwo\0", &mut symbols);
        scanner.scan_chunk(b"OlPrEfIxone\0", &mut symbols);
        assert_eq!(strings(symbols), vec!["one", "two"]);
    }
}
