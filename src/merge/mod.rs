//! Chunk merging.
//!
//! In-memory chunks are joined into one destination allocated once at the
//! exact total length and filled in order. Streams are not joined; they are
//! chained into one logical stream by [`ChainStream`].

mod chain;

pub use chain::ChainStream;

use crate::data::PushStream;

/// Concatenates byte chunks into one exactly sized vector.
pub fn concat_bytes<B: AsRef<[u8]>>(chunks: &[B]) -> Vec<u8> {
    let total: usize = chunks.iter().map(|c| c.as_ref().len()).sum();
    let mut out = Vec::with_capacity(total);
    for chunk in chunks {
        out.extend_from_slice(chunk.as_ref());
    }
    out
}

/// Concatenates string chunks into one exactly sized string.
pub fn concat_str<S: AsRef<str>>(chunks: &[S]) -> String {
    let total: usize = chunks.iter().map(|c| c.as_ref().len()).sum();
    let mut out = String::with_capacity(total);
    for chunk in chunks {
        out.push_str(chunk.as_ref());
    }
    out
}

/// Chains push streams in order.
pub fn chain(streams: Vec<PushStream>) -> PushStream {
    Box::pin(ChainStream::new(streams))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concat_bytes() {
        let chunks: Vec<&[u8]> = vec![&[], &[1], &[2, 3]];
        let merged = concat_bytes(&chunks);
        assert_eq!(merged, vec![1, 2, 3]);
        assert_eq!(merged.capacity(), 3);
    }

    #[test]
    fn test_concat_empty() {
        let chunks: Vec<Vec<u8>> = Vec::new();
        assert!(concat_bytes(&chunks).is_empty());
        assert_eq!(concat_str::<&str>(&[]), "");
    }

    #[test]
    fn test_concat_str() {
        assert_eq!(concat_str(&["ab", "", "cé"]), "abcé");
    }
}
