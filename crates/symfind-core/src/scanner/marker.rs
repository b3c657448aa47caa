//! Marker token and low-level byte searching.
//!
//! A marker is the fixed byte sequence that precedes every symbol in the
//! binary. Symbols run from the end of the marker to the next zero byte.

use crate::error::{Error, Result};
use std::fmt;

/// Marker emitted in front of every symbol name
pub const DEFAULT_MARKER: &[u8] = b"OlPrEfIx";

/// Validated marker token
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Marker {
    bytes: Vec<u8>,
}

impl Marker {
    /// Creates a marker from raw bytes.
    ///
    /// The marker must be non-empty and must not contain a zero byte: chunk
    /// boundaries are only placed after zero bytes, which keeps every marker
    /// occurrence inside a single chunk.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(Error::invalid_marker(&bytes, "marker is empty"));
        }
        if bytes.contains(&0) {
            return Err(Error::invalid_marker(&bytes, "marker contains a zero byte"));
        }
        Ok(Self { bytes })
    }

    /// Returns the marker bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Marker width in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if the marker has no bytes
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Iterates over the segments following each non-overlapping marker
    /// occurrence. The bytes before the first marker are not yielded.
    pub fn segments<'a>(&'a self, data: &'a [u8]) -> Segments<'a> {
        Segments {
            marker: &self.bytes,
            rest: find_subsequence(data, &self.bytes).map(|pos| &data[pos + self.bytes.len()..]),
        }
    }
}

impl Default for Marker {
    fn default() -> Self {
        Self {
            bytes: DEFAULT_MARKER.to_vec(),
        }
    }
}

impl fmt::Debug for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Marker({:?})", String::from_utf8_lossy(&self.bytes))
    }
}

impl std::str::FromStr for Marker {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s.as_bytes())
    }
}

/// Iterator returned by [`Marker::segments`]
#[derive(Debug)]
pub struct Segments<'a> {
    marker: &'a [u8],
    rest: Option<&'a [u8]>,
}

impl<'a> Iterator for Segments<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.rest.take()?;
        match find_subsequence(rest, self.marker) {
            Some(pos) => {
                self.rest = Some(&rest[pos + self.marker.len()..]);
                Some(&rest[..pos])
            }
            None => Some(rest),
        }
    }
}

/// Find a subsequence within a byte slice
pub fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    let first = needle[0];
    let last_start = haystack.len() - needle.len();
    let mut position = 0;

    while position <= last_start {
        let offset = haystack[position..=last_start]
            .iter()
            .position(|&b| b == first)?;
        let candidate = position + offset;
        if &haystack[candidate..candidate + needle.len()] == needle {
            return Some(candidate);
        }
        position = candidate + 1;
    }

    None
}

/// Bytes before the first zero byte, or `None` if the segment is unterminated
pub fn terminated_prefix(segment: &[u8]) -> Option<&[u8]> {
    segment
        .iter()
        .position(|&b| b == 0)
        .map(|end| &segment[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_subsequence() {
        let data = b"helloOlPrEfIxworld";
        assert_eq!(find_subsequence(data, b"OlPrEfIx"), Some(5));
        assert_eq!(find_subsequence(data, b"world"), Some(13));
        assert_eq!(find_subsequence(data, b"missing"), None);
        assert_eq!(find_subsequence(b"ab", b"abc"), None);
        assert_eq!(find_subsequence(b"aaab", b"ab"), Some(2));
    }

    #[test]
    fn test_marker_rejects_empty_and_zero() {
        assert!(Marker::new(Vec::<u8>::new()).is_err());
        assert!(Marker::new(&b"MA\0RK"[..]).is_err());
        assert!(Marker::new(&b"MARK"[..]).is_ok());
    }

    #[test]
    fn test_default_marker() {
        assert_eq!(Marker::default().as_bytes(), b"OlPrEfIx");
        assert_eq!(Marker::default().len(), 8);
    }

    #[test]
    fn test_segments_skip_prefix() {
        let marker: Marker = "##".parse().unwrap();
        let segments: Vec<&[u8]> = marker.segments(b"lead##one##two").collect();
        assert_eq!(segments, vec![&b"one"[..], b"two"]);
    }

    #[test]
    fn test_segments_adjacent_and_trailing_markers() {
        let marker: Marker = "##".parse().unwrap();
        let segments: Vec<&[u8]> = marker.segments(b"####x##").collect();
        assert_eq!(segments, vec![&b""[..], b"x", b""]);
    }

    #[test]
    fn test_segments_without_marker() {
        let marker = Marker::default();
        assert_eq!(marker.segments(b"no marker here").count(), 0);
    }

    #[test]
    fn test_terminated_prefix() {
        assert_eq!(terminated_prefix(b"foo\0bar"), Some(&b"foo"[..]));
        assert_eq!(terminated_prefix(b"\0"), Some(&b""[..]));
        assert_eq!(terminated_prefix(b"trunc"), None);
    }
}
