//! Chunked reads from an async reader.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_core::Stream;
use futures_io::AsyncRead;
use pin_project_lite::pin_project;

use crate::buffer::Buffer;

pin_project! {
    /// A stream that yields the bytes of an async reader, one read per chunk.
    ///
    /// This uses `futures_io::AsyncRead` which is runtime-agnostic. Each chunk
    /// is at most `chunk_size` bytes; a short read yields a short chunk.
    /// The reader is dropped at end of input or on the first error.
    pub struct ReadChunks<R> {
        #[pin]
        reader: Option<R>,
        buffer: Buffer,
        offset: u64,
    }
}

impl<R> ReadChunks<R> {
    /// Creates a new chunk stream from an async reader.
    ///
    /// # Arguments
    ///
    /// * `reader` - An async reader implementing `AsyncRead`
    /// * `chunk_size` - Maximum bytes per chunk (at least 1)
    pub fn new(reader: R, chunk_size: usize) -> Self {
        Self {
            reader: Some(reader),
            buffer: Buffer::take(chunk_size.max(1)),
            offset: 0,
        }
    }

    /// Bytes read so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }
}

impl<R: AsyncRead> Stream for ReadChunks<R> {
    type Item = io::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        let Some(reader) = this.reader.as_mut().as_pin_mut() else {
            return Poll::Ready(None);
        };

        match reader.poll_read(cx, &mut this.buffer[..]) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Err(e)) => {
                this.reader.set(None);
                Poll::Ready(Some(Err(e)))
            }
            Poll::Ready(Ok(0)) => {
                this.reader.set(None);
                Poll::Ready(None)
            }
            Poll::Ready(Ok(n)) => {
                *this.offset += n as u64;
                Poll::Ready(Some(Ok(Bytes::copy_from_slice(&this.buffer[..n]))))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::TryStreamExt;

    #[tokio::test]
    async fn test_read_chunks_empty() {
        let reader: &[u8] = &[];
        let chunks: Vec<Bytes> = ReadChunks::new(reader, 4).try_collect().await.unwrap();
        assert!(chunks.is_empty());
    }

    #[tokio::test]
    async fn test_read_chunks_sizes() {
        let data: Vec<u8> = (0..10).collect();
        let reader: &[u8] = &data;
        let stream = ReadChunks::new(reader, 4);
        let chunks: Vec<Bytes> = stream.try_collect().await.unwrap();

        let lens: Vec<_> = chunks.iter().map(|c| c.len()).collect();
        assert_eq!(lens, vec![4, 4, 2]);
        let flat: Vec<u8> = chunks.iter().flat_map(|c| c.iter().copied()).collect();
        assert_eq!(flat, data);
    }

    #[tokio::test]
    async fn test_push_pull_roundtrip() {
        use futures_util::AsyncReadExt;

        let data: Vec<u8> = (0..=255).collect();
        let reader = futures_util::io::Cursor::new(data.clone());
        let push = crate::stream::into_push(Box::pin(reader), 7);
        let mut pull = crate::stream::into_pull(push);
        let mut out = Vec::new();
        pull.read_to_end(&mut out).await.unwrap();
        assert_eq!(out, data);
    }
}
