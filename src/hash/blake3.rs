//! Incremental BLAKE3 hashing.

use super::ContentHash;

/// Feeds chunks into a BLAKE3 state.
#[derive(Debug, Clone, Default)]
pub struct Blake3Hasher {
    state: blake3::Hasher,
}

impl Blake3Hasher {
    /// Creates an empty hasher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `data` to the digest.
    pub fn update(&mut self, data: &[u8]) {
        self.state.update(data);
    }

    /// Digest of everything added so far. The state is left untouched.
    pub fn finalize(&self) -> ContentHash {
        ContentHash::new(self.state.finalize().into())
    }

    /// Clears the state.
    pub fn reset(&mut self) {
        self.state.reset();
    }

    /// One-shot digest of `data`.
    pub fn hash(data: &[u8]) -> ContentHash {
        ContentHash::new(blake3::hash(data).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunked_matches_one_shot() {
        let mut hasher = Blake3Hasher::new();
        for piece in [&b"hel"[..], b"lo ", b"", b"world"] {
            hasher.update(piece);
        }
        assert_eq!(hasher.finalize(), Blake3Hasher::hash(b"hello world"));
        assert_ne!(hasher.finalize(), Blake3Hasher::hash(b"hello world!"));
    }

    #[test]
    fn test_reset() {
        let mut hasher = Blake3Hasher::new();
        hasher.update(b"discarded");
        hasher.reset();
        hasher.update(b"kept");
        assert_eq!(hasher.finalize(), Blake3Hasher::hash(b"kept"));
    }
}
