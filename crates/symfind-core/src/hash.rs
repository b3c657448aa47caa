//! Incremental content hashing.
//!
//! Every byte that flows through the chunk reader is fed into a
//! [`ContentHasher`] exactly once and in stream order, so the resulting
//! [`ContentDigest`] is independent of how the stream was chunked.

use sha2::{Digest, Sha256};
use std::fmt;

/// Hash function used for the content digest
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DigestAlgorithm {
    /// SHA-256 (digests of existing catalogs use this)
    #[default]
    Sha256,
    /// BLAKE3
    Blake3,
}

impl DigestAlgorithm {
    /// Returns the canonical lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            DigestAlgorithm::Sha256 => "sha256",
            DigestAlgorithm::Blake3 => "blake3",
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone)]
enum HasherState {
    Sha256(Sha256),
    Blake3(Box<blake3::Hasher>),
}

/// Running hash accumulator over a byte stream
#[derive(Clone)]
pub struct ContentHasher {
    state: HasherState,
}

impl fmt::Debug for ContentHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentHasher")
            .field("algorithm", &self.algorithm())
            .finish_non_exhaustive()
    }
}

impl Default for ContentHasher {
    fn default() -> Self {
        Self::new(DigestAlgorithm::default())
    }
}

impl ContentHasher {
    /// Creates a fresh hasher for the given algorithm
    pub fn new(algorithm: DigestAlgorithm) -> Self {
        let state = match algorithm {
            DigestAlgorithm::Sha256 => HasherState::Sha256(Sha256::new()),
            DigestAlgorithm::Blake3 => HasherState::Blake3(Box::new(blake3::Hasher::new())),
        };
        Self { state }
    }

    /// Returns the algorithm this hasher computes
    pub fn algorithm(&self) -> DigestAlgorithm {
        match self.state {
            HasherState::Sha256(_) => DigestAlgorithm::Sha256,
            HasherState::Blake3(_) => DigestAlgorithm::Blake3,
        }
    }

    /// Feeds more bytes into the accumulator
    pub fn update(&mut self, data: &[u8]) {
        match &mut self.state {
            HasherState::Sha256(h) => h.update(data),
            HasherState::Blake3(h) => {
                h.update(data);
            }
        }
    }

    /// Consumes the hasher and returns the digest of everything fed so far
    pub fn finalize(self) -> ContentDigest {
        match self.state {
            HasherState::Sha256(h) => ContentDigest {
                algorithm: DigestAlgorithm::Sha256,
                bytes: h.finalize().into(),
            },
            HasherState::Blake3(h) => ContentDigest {
                algorithm: DigestAlgorithm::Blake3,
                bytes: h.finalize().into(),
            },
        }
    }

    /// One-shot digest of a byte slice
    pub fn digest(algorithm: DigestAlgorithm, data: &[u8]) -> ContentDigest {
        let mut hasher = Self::new(algorithm);
        hasher.update(data);
        hasher.finalize()
    }
}

/// Final digest of a scanned stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentDigest {
    algorithm: DigestAlgorithm,
    bytes: [u8; 32],
}

impl ContentDigest {
    /// Algorithm that produced this digest
    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    /// Raw digest bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    /// Lowercase hexadecimal rendering
    pub fn to_hex(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.bytes {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}
