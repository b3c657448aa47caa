//! Deduplicated symbol accumulator.

use std::collections::{BTreeSet, HashSet};

/// Set of unique symbols found during one file's scan.
///
/// Symbols are kept as the raw bytes found in the binary. Conversion to text
/// only happens at the output boundary via [`SymbolSet::into_strings`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolSet {
    inner: HashSet<Vec<u8>>,
}

impl SymbolSet {
    /// Creates an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a symbol, returning `true` if it was not already present
    pub fn insert(&mut self, symbol: &[u8]) -> bool {
        if self.inner.contains(symbol) {
            return false;
        }
        self.inner.insert(symbol.to_vec())
    }

    /// Returns true if the symbol has been seen
    pub fn contains(&self, symbol: &[u8]) -> bool {
        self.inner.contains(symbol)
    }

    /// Number of distinct symbols
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns true if no symbol has been found
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterates over the raw symbols in no particular order
    pub fn iter(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.inner.iter().map(Vec::as_slice)
    }

    /// Decodes every symbol as UTF-8 and returns them sorted.
    ///
    /// Invalid sequences are replaced with U+FFFD. Distinct byte symbols that
    /// decode to the same text appear once.
    pub fn into_strings(self) -> Vec<String> {
        self.inner
            .into_iter()
            .map(|bytes| match String::from_utf8(bytes) {
                Ok(text) => text,
                Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
            })
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

impl<'a> Extend<&'a [u8]> for SymbolSet {
    fn extend<I: IntoIterator<Item = &'a [u8]>>(&mut self, iter: I) {
        for symbol in iter {
            self.insert(symbol);
        }
    }
}

impl<'a> FromIterator<&'a [u8]> for SymbolSet {
    fn from_iter<I: IntoIterator<Item = &'a [u8]>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_insert_is_idempotent() {
        let mut set = SymbolSet::new();
        assert!(set.insert(b"foo"));
        assert!(!set.insert(b"foo"));
        assert_eq!(set.len(), 1);
        assert!(set.contains(b"foo"));
    }

    #[test]
    fn test_into_strings_sorted() {
        let set: SymbolSet = [&b"zeta"[..], b"alpha", b"mid"].into_iter().collect();
        assert_eq!(set.into_strings(), vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_into_strings_lossy() {
        let set: SymbolSet = [&b"ok"[..], b"bad\xff"].into_iter().collect();
        assert_eq!(set.into_strings(), vec!["bad\u{FFFD}", "ok"]);
    }

    #[test]
    fn test_lossy_collisions_collapse() {
        let set: SymbolSet = [&b"x\xfe"[..], b"x\xff"].into_iter().collect();
        assert_eq!(set.len(), 2);
        assert_eq!(set.into_strings(), vec!["x\u{FFFD}"]);
    }

    #[test]
    fn test_empty_symbol_is_kept() {
        let mut set = SymbolSet::new();
        set.insert(b"");
        assert_eq!(set.into_strings(), vec![String::new()]);
    }
}
