//! Range extraction over push streams.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_core::{Stream, ready};
use futures_util::StreamExt;
use pin_project_lite::pin_project;
use tracing::trace;

use super::Window;
use crate::data::PushStream;

pin_project! {
    /// A stream that yields only the bytes of its source inside a [`Window`].
    ///
    /// Chunks are sliced without copying. The source is dropped as soon as the
    /// window is satisfied or the source fails, so an abandoned tail is never
    /// read.
    pub struct RangeStream<S> {
        #[pin]
        source: Option<S>,
        window: Window,
        position: u64,
    }
}

impl<S> RangeStream<S> {
    /// Wraps `source`, keeping only the bytes inside `window`.
    pub fn new(source: S, window: Window) -> Self {
        // An empty window needs nothing from the source.
        let source = if window.is_empty() { None } else { Some(source) };
        Self {
            source,
            window,
            position: 0,
        }
    }

    /// Returns true once the source has been released.
    pub fn is_released(&self) -> bool {
        self.source.is_none()
    }

    /// Number of source bytes consumed so far.
    pub fn position(&self) -> u64 {
        self.position
    }
}

impl<S> Stream for RangeStream<S>
where
    S: Stream<Item = io::Result<Bytes>>,
{
    type Item = io::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        loop {
            let Some(source) = this.source.as_mut().as_pin_mut() else {
                return Poll::Ready(None);
            };

            match ready!(source.poll_next(cx)) {
                None => {
                    this.source.set(None);
                    return Poll::Ready(None);
                }
                Some(Err(e)) => {
                    this.source.set(None);
                    return Poll::Ready(Some(Err(e)));
                }
                Some(Ok(chunk)) => {
                    let len = chunk.len() as u64;
                    let overlap = this.window.classify(*this.position, len);
                    *this.position += len;

                    if overlap.is_satisfied() {
                        trace!(position = *this.position, "range satisfied, releasing source");
                        this.source.set(None);
                    }

                    if let Some(r) = overlap.emit_range(len) {
                        if !r.is_empty() {
                            return Poll::Ready(Some(Ok(
                                chunk.slice(r.start as usize..r.end as usize)
                            )));
                        }
                    }
                }
            }
        }
    }
}

/// Restricts a push stream to `window`; a full window passes it through.
pub(crate) fn limit(source: PushStream, window: Window) -> PushStream {
    if window.is_unbounded_full() {
        source
    } else {
        RangeStream::new(source, window).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::TryStreamExt;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    fn chunked(data: &[u8], sizes: &[usize]) -> Vec<io::Result<Bytes>> {
        let mut out = Vec::new();
        let mut pos = 0;
        for &size in sizes {
            out.push(Ok(Bytes::copy_from_slice(&data[pos..pos + size])));
            pos += size;
        }
        out
    }

    /// Counts polled chunks and records when it is dropped.
    struct DropTracked {
        inner: futures_util::stream::Iter<std::vec::IntoIter<io::Result<Bytes>>>,
        polled: Arc<AtomicUsize>,
        dropped: Arc<AtomicBool>,
    }

    impl Stream for DropTracked {
        type Item = io::Result<Bytes>;

        fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
            let item = Pin::new(&mut self.inner).poll_next(cx);
            if let Poll::Ready(Some(_)) = item {
                self.polled.fetch_add(1, Ordering::SeqCst);
            }
            item
        }
    }

    impl Drop for DropTracked {
        fn drop(&mut self) {
            self.dropped.store(true, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_window_across_chunk_boundaries() {
        let data: Vec<u8> = (0..9).collect();
        let source = futures_util::stream::iter(chunked(&data, &[3, 3, 3]));
        let out: Vec<Bytes> = RangeStream::new(source, Window::new(4, Some(3)))
            .try_collect()
            .await
            .unwrap();
        let flat: Vec<u8> = out.iter().flat_map(|b| b.iter().copied()).collect();
        assert_eq!(flat, vec![4, 5, 6]);
    }

    #[tokio::test]
    async fn test_source_released_when_satisfied() {
        let data: Vec<u8> = (0..12).collect();
        let polled = Arc::new(AtomicUsize::new(0));
        let dropped = Arc::new(AtomicBool::new(false));
        let source = DropTracked {
            inner: futures_util::stream::iter(chunked(&data, &[4, 4, 4])),
            polled: polled.clone(),
            dropped: dropped.clone(),
        };

        let mut stream = RangeStream::new(source, Window::new(1, Some(3)));
        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(&first[..], &[1, 2, 3]);
        assert!(dropped.load(Ordering::SeqCst), "source must be dropped once satisfied");
        assert!(stream.is_released());
        assert!(stream.next().await.is_none());
        assert_eq!(polled.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_error_releases_source() {
        let items = vec![
            Ok(Bytes::from_static(b"ab")),
            Err(io::Error::other("boom")),
            Ok(Bytes::from_static(b"cd")),
        ];
        let mut stream = RangeStream::new(futures_util::stream::iter(items), Window::unbounded());
        assert_eq!(&stream.next().await.unwrap().unwrap()[..], b"ab");
        assert!(stream.next().await.unwrap().is_err());
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_empty_window_reads_nothing() {
        let dropped = Arc::new(AtomicBool::new(false));
        let source = DropTracked {
            inner: futures_util::stream::iter(chunked(b"abc", &[3])),
            polled: Arc::new(AtomicUsize::new(0)),
            dropped: dropped.clone(),
        };
        let mut stream = RangeStream::new(source, Window::new(1, Some(0)));
        assert!(dropped.load(Ordering::SeqCst));
        assert!(stream.next().await.is_none());
    }
}
