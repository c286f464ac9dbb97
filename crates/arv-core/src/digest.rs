//! # Content Digest: Field-Framed SHA-256
//!
//! Certificate identifiers are SHA-256 digests over a domain tag followed by
//! a sequence of length-prefixed fields. Framing every field with its
//! big-endian `u64` length makes the encoding injective: no two distinct
//! field lists produce the same byte stream, so distinct preimages only
//! collide if SHA-256 does.
//!
//! ```text
//! sha256( len(tag) || tag || len(f0) || f0 || len(f1) || f1 || ... )
//! ```

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A raw 32-byte SHA-256 digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentDigest {
    /// The raw 32-byte digest value.
    pub bytes: [u8; 32],
}

/// Incremental builder for a field-framed digest.
#[derive(Clone)]
pub struct FieldDigest {
    hasher: Sha256,
}

impl FieldDigest {
    /// Start a digest under the given domain tag.
    pub fn new(domain: &str) -> Self {
        let mut this = Self {
            hasher: Sha256::new(),
        };
        this.push_bytes(domain.as_bytes());
        this
    }

    /// Append a length-prefixed byte field.
    pub fn push_bytes(&mut self, field: &[u8]) -> &mut Self {
        self.hasher.update((field.len() as u64).to_be_bytes());
        self.hasher.update(field);
        self
    }

    /// Append a string field.
    pub fn push_str(&mut self, field: &str) -> &mut Self {
        self.push_bytes(field.as_bytes())
    }

    /// Append an integer field (8 bytes, big-endian).
    pub fn push_u64(&mut self, field: u64) -> &mut Self {
        self.push_bytes(&field.to_be_bytes())
    }

    /// Finish the digest.
    pub fn finish(self) -> ContentDigest {
        let hash = self.hasher.finalize();
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&hash);
        ContentDigest { bytes }
    }
}
