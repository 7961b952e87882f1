//! Opaque binary objects.
//!
//! A [`Blob`] knows its length up front and can be sliced in O(1), but its
//! bytes are only reachable through an explicit asynchronous read.

use std::fmt;
use std::io;
use std::ops::Range;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;

use super::PushStream;
use crate::range::Window;

/// Backing storage of a blob.
#[async_trait]
pub trait BlobSource: Send + Sync + fmt::Debug {
    /// Total length in bytes.
    fn len(&self) -> u64;

    /// Returns true if the source holds no bytes.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads `range`, which always lies within `0..len()`.
    async fn read_range(&self, range: Range<u64>) -> io::Result<Bytes>;
}

#[derive(Debug)]
struct MemorySource(Bytes);

#[async_trait]
impl BlobSource for MemorySource {
    fn len(&self) -> u64 {
        self.0.len() as u64
    }

    async fn read_range(&self, range: Range<u64>) -> io::Result<Bytes> {
        Ok(self.0.slice(range.start as usize..range.end as usize))
    }
}

/// Several blobs read back to back without copying them together.
#[derive(Debug)]
struct CompositeSource {
    parts: Vec<Blob>,
    len: u64,
}

#[async_trait]
impl BlobSource for CompositeSource {
    fn len(&self) -> u64 {
        self.len
    }

    async fn read_range(&self, range: Range<u64>) -> io::Result<Bytes> {
        let window = Window::new(range.start, Some(range.end - range.start));
        let mut out = Vec::with_capacity((range.end - range.start) as usize);
        let mut offset = 0u64;

        for part in &self.parts {
            let part_len = part.len();
            let overlap = window.classify(offset, part_len);
            if let Some(r) = overlap.emit_range(part_len) {
                if !r.is_empty() {
                    let piece = part.slice(Window::new(r.start, Some(r.end - r.start)));
                    out.extend_from_slice(&piece.bytes().await?);
                }
            }
            offset += part_len;
            if overlap.is_satisfied() {
                break;
            }
        }

        Ok(Bytes::from(out))
    }
}

/// An opaque, cheaply clonable binary object.
#[derive(Clone)]
pub struct Blob {
    source: Arc<dyn BlobSource>,
    range: Range<u64>,
}

impl Blob {
    /// Creates a blob over in-memory bytes.
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        Self::from_source(Arc::new(MemorySource(bytes.into())))
    }

    /// Creates a blob over a custom source.
    pub fn from_source(source: Arc<dyn BlobSource>) -> Self {
        let len = source.len();
        Self {
            source,
            range: 0..len,
        }
    }

    /// Creates an empty blob.
    pub fn empty() -> Self {
        Self::from_bytes(Bytes::new())
    }

    /// Joins blobs in order. One part is returned as is.
    pub fn concat(mut parts: Vec<Blob>) -> Self {
        match parts.len() {
            0 => Self::empty(),
            1 => parts.remove(0),
            _ => {
                let len = parts.iter().map(Blob::len).sum();
                Self::from_source(Arc::new(CompositeSource { parts, len }))
            }
        }
    }

    /// Length in bytes.
    pub fn len(&self) -> u64 {
        self.range.end - self.range.start
    }

    /// Returns true if the blob has no bytes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a view on `window`, clipped to this blob.
    pub fn slice(&self, window: Window) -> Blob {
        let clipped = window.clip(self.len());
        Blob {
            source: Arc::clone(&self.source),
            range: self.range.start + clipped.start..self.range.start + clipped.end,
        }
    }

    /// Reads the whole blob.
    pub async fn bytes(&self) -> io::Result<Bytes> {
        if self.is_empty() {
            return Ok(Bytes::new());
        }
        self.source.read_range(self.range.clone()).await
    }

    /// Streams the blob in reads of at most `chunk_size` bytes.
    pub fn stream(&self, chunk_size: usize) -> PushStream {
        let chunk_size = chunk_size.max(1) as u64;
        futures_util::stream::unfold((self.clone(), 0u64), move |(blob, pos)| async move {
            let len = blob.len();
            if pos >= len {
                return None;
            }
            let end = (pos + chunk_size).min(len);
            match blob.slice(Window::new(pos, Some(end - pos))).bytes().await {
                Ok(bytes) => Some((Ok(bytes), (blob, end))),
                // Stop after the first failure.
                Err(e) => Some((Err(e), (blob, len))),
            }
        })
        .boxed()
    }
}

impl fmt::Debug for Blob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blob")
            .field("len", &self.len())
            .field("source", &self.source)
            .finish()
    }
}
