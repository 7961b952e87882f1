//! Sequential composition of push streams.

use std::collections::VecDeque;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_core::{Stream, ready};
use tracing::trace;

use crate::data::PushStream;

/// Forwards every chunk of each source in turn.
///
/// The first error ends the chain: it is yielded once, and every source that
/// has not been started yet is dropped without being polled.
pub struct ChainStream {
    current: Option<PushStream>,
    pending: VecDeque<PushStream>,
}

impl ChainStream {
    /// Chains `sources` in order.
    pub fn new(sources: Vec<PushStream>) -> Self {
        let mut pending: VecDeque<_> = sources.into();
        let current = pending.pop_front();
        Self { current, pending }
    }

    /// Number of sources not started yet.
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    fn cancel(&mut self) {
        if !self.pending.is_empty() {
            trace!(count = self.pending.len(), "cancelling unstarted sources");
        }
        self.current = None;
        self.pending.clear();
    }
}

impl Stream for ChainStream {
    type Item = io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;

        loop {
            let Some(current) = this.current.as_mut() else {
                return Poll::Ready(None);
            };

            match ready!(current.as_mut().poll_next(cx)) {
                Some(Ok(chunk)) => return Poll::Ready(Some(Ok(chunk))),
                Some(Err(e)) => {
                    this.cancel();
                    return Poll::Ready(Some(Err(e)));
                }
                None => this.current = this.pending.pop_front(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn source(chunks: &[&'static [u8]]) -> PushStream {
        let items: Vec<io::Result<Bytes>> =
            chunks.iter().map(|c| Ok(Bytes::from_static(*c))).collect();
        futures_util::stream::iter(items).boxed()
    }

    #[tokio::test]
    async fn test_chain_preserves_order() {
        let chain = ChainStream::new(vec![
            source(&[b"ab", b"c"]),
            source(&[]),
            source(&[b"de"]),
        ]);
        let chunks: Vec<_> = chain.map(|c| c.unwrap()).collect().await;
        let flat: Vec<u8> = chunks.iter().flat_map(|c| c.iter().copied()).collect();
        assert_eq!(flat, b"abcde");
    }

    #[tokio::test]
    async fn test_error_cancels_remaining() {
        let polled = Arc::new(AtomicUsize::new(0));
        let counter = polled.clone();
        let tail = futures_util::stream::poll_fn(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Poll::Ready(Some(Ok(Bytes::from_static(b"never"))))
        })
        .boxed();

        let failing: PushStream = futures_util::stream::iter(vec![
            Ok(Bytes::from_static(b"x")),
            Err(io::Error::other("source failed")),
        ])
        .boxed();

        let mut chain = ChainStream::new(vec![failing, tail]);
        assert_eq!(chain.remaining(), 1);
        assert!(chain.next().await.unwrap().is_ok());
        assert!(chain.next().await.unwrap().is_err());
        assert_eq!(chain.remaining(), 0);
        assert!(chain.next().await.is_none());
        assert_eq!(polled.load(Ordering::SeqCst), 0);
    }
}
