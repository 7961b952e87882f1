//! Splicing modifications over a byte stream.
//!
//! A [`Modification`] replaces the bytes of its window with its own data.
//! [`OverlayStream`] applies a validated, sorted set of them to a base
//! stream one chunk at a time, using the same window classification as
//! [`RangeStream`](crate::range::RangeStream). Chunks no modification
//! touches pass through untouched.

use std::io;
use std::ops::Range;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::{Bytes, BytesMut};
use futures_core::{Stream, ready};
use tracing::trace;

use crate::config::ConvertOptions;
use crate::data::{Data, PushStream};
use crate::error::{ConvertError, Result};
use crate::range::Window;
use crate::registry::Registry;

/// Bytes to write over a base value starting at `start`.
#[derive(Debug)]
pub struct Modification {
    /// Replacement bytes, in any representation.
    pub data: Data,
    /// Offset in the base where the replacement begins.
    pub start: u64,
    /// Caps how many bytes of `data` are used.
    pub length: Option<u64>,
}

impl Modification {
    /// Replaces bytes from `start` with all of `data`.
    pub fn new(data: impl Into<Data>, start: u64) -> Self {
        Self {
            data: data.into(),
            start,
            length: None,
        }
    }

    /// Uses at most `length` bytes of the data.
    pub fn with_length(mut self, length: u64) -> Self {
        self.length = Some(length);
        self
    }
}

/// A modification resolved to bytes.
#[derive(Debug, Clone)]
pub(crate) struct Patch {
    start: u64,
    data: Bytes,
}

impl Patch {
    fn end(&self) -> u64 {
        self.start + self.data.len() as u64
    }

    fn span(&self) -> Range<u64> {
        self.start..self.end()
    }

    fn window(&self) -> Window {
        Window::new(self.start, Some(self.data.len() as u64))
    }
}

/// Resolves modifications to bytes, sorted by start.
///
/// Empty modifications are dropped. Overlapping windows are rejected.
pub(crate) async fn prepare(
    reg: &Registry,
    modifications: Vec<Modification>,
    options: &ConvertOptions,
) -> Result<Vec<Patch>> {
    let read = options.without_range();
    let mut patches = Vec::with_capacity(modifications.len());
    for modification in modifications {
        let Modification {
            data,
            start,
            length,
        } = modification;
        let read = match length {
            Some(length) => read.clone().with_length(length),
            None => read.clone(),
        };
        let bytes = reg
            .converter_matching(&data, &read)?
            .to_byte_array(reg, data, &read)
            .await?;
        if !bytes.is_empty() {
            if start.checked_add(bytes.len() as u64).is_none() {
                return Err(ConvertError::illegal(format!(
                    "modification at {start} of {} bytes ends past u64::MAX",
                    bytes.len()
                )));
            }
            patches.push(Patch {
                start,
                data: Bytes::from(bytes),
            });
        }
    }

    patches.sort_by_key(|p| p.start);
    for pair in patches.windows(2) {
        if pair[1].start < pair[0].end() {
            return Err(ConvertError::OverlappingModifications {
                first: pair[0].span(),
                second: pair[1].span(),
            });
        }
    }
    Ok(patches)
}

/// A push stream with patches spliced over it.
///
/// Patches that begin at or past the end of the base are appended once the
/// base is exhausted, with zeros filling any gap. The appended tail is
/// produced in chunks of at most `chunk_size` bytes.
pub struct OverlayStream {
    source: Option<PushStream>,
    patches: Vec<Patch>,
    next_patch: usize,
    position: u64,
    end: u64,
    chunk_size: usize,
    failed: bool,
}

impl OverlayStream {
    pub(crate) fn new(source: PushStream, patches: Vec<Patch>, chunk_size: usize) -> Self {
        let end = patches.iter().map(Patch::end).max().unwrap_or(0);
        Self {
            source: Some(source),
            patches,
            next_patch: 0,
            position: 0,
            end,
            chunk_size: chunk_size.max(1),
            failed: false,
        }
    }

    fn splice(&mut self, chunk: Bytes) -> Bytes {
        let chunk_start = self.position;
        let chunk_len = chunk.len() as u64;
        self.position += chunk_len;

        while self
            .patches
            .get(self.next_patch)
            .is_some_and(|p| p.end() <= chunk_start)
        {
            self.next_patch += 1;
        }

        let mut out: Option<BytesMut> = None;
        let mut cursor = 0usize;
        for patch in &self.patches[self.next_patch..] {
            if patch.start >= chunk_start + chunk_len {
                break;
            }
            let Some(hit) = patch.window().intersect(chunk_start, chunk_len) else {
                continue;
            };
            let (from, to) = (hit.start as usize, hit.end as usize);
            let offset = (chunk_start + hit.start - patch.start) as usize;
            let buf = out.get_or_insert_with(|| BytesMut::with_capacity(chunk.len()));
            buf.extend_from_slice(&chunk[cursor..from]);
            buf.extend_from_slice(&patch.data[offset..offset + (to - from)]);
            cursor = to;
        }

        match out {
            None => chunk,
            Some(mut buf) => {
                buf.extend_from_slice(&chunk[cursor..]);
                buf.freeze()
            }
        }
    }

    /// Next chunk of patch bytes past the end of the base.
    fn trailer(&mut self) -> Option<Bytes> {
        if self.position >= self.end {
            return None;
        }
        let len = (self.end - self.position).min(self.chunk_size as u64) as usize;
        Some(self.splice(BytesMut::zeroed(len).freeze()))
    }
}

impl Stream for OverlayStream {
    type Item = io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;

        while let Some(source) = this.source.as_mut() {
            match ready!(source.as_mut().poll_next(cx)) {
                Some(Ok(chunk)) if chunk.is_empty() => continue,
                Some(Ok(chunk)) => return Poll::Ready(Some(Ok(this.splice(chunk)))),
                Some(Err(e)) => {
                    this.source = None;
                    this.failed = true;
                    return Poll::Ready(Some(Err(e)));
                }
                None => {
                    if this.end > this.position {
                        trace!(base_end = this.position, end = this.end, "appending modifications past the base");
                    }
                    this.source = None;
                }
            }
        }

        if this.failed {
            return Poll::Ready(None);
        }
        Poll::Ready(this.trailer().map(Ok))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::{StreamExt, TryStreamExt};

    fn base(chunks: &[&'static [u8]]) -> PushStream {
        futures_util::stream::iter(
            chunks
                .iter()
                .map(|c| Ok(Bytes::from_static(*c)))
                .collect::<Vec<_>>(),
        )
        .boxed()
    }

    fn patch(start: u64, data: &'static [u8]) -> Patch {
        Patch {
            start,
            data: Bytes::from_static(data),
        }
    }

    async fn run(chunks: &[&'static [u8]], patches: Vec<Patch>) -> Vec<u8> {
        let out: Vec<Bytes> = OverlayStream::new(base(chunks), patches, 4)
            .try_collect()
            .await
            .unwrap();
        out.concat()
    }

    #[tokio::test]
    async fn test_patch_spanning_chunks() {
        let out = run(&[b"abc", b"def", b"ghi"], vec![patch(2, b"XYZW")]).await;
        assert_eq!(out, b"abXYZWghi");
    }

    #[tokio::test]
    async fn test_untouched_chunks_are_not_copied() {
        let first = Bytes::from_static(b"abc");
        let ptr = first.as_ptr();
        let mut stream = OverlayStream::new(
            futures_util::stream::iter(vec![Ok(first), Ok(Bytes::from_static(b"def"))]).boxed(),
            vec![patch(4, b"E")],
            64,
        );
        assert_eq!(stream.next().await.unwrap().unwrap().as_ptr(), ptr);
        assert_eq!(&stream.next().await.unwrap().unwrap()[..], b"dEf");
    }

    #[tokio::test]
    async fn test_patch_past_end_zero_fills() {
        let out = run(&[b"ab"], vec![patch(1, b"XY"), patch(5, b"Z")]).await;
        assert_eq!(out, b"aXY\0\0Z");
    }

    #[tokio::test]
    async fn test_trailer_is_chunked() {
        let stream = OverlayStream::new(base(&[b"ab"]), vec![patch(9, b"Z")], 4);
        let chunks: Vec<Bytes> = stream.try_collect().await.unwrap();
        let lens: Vec<usize> = chunks.iter().map(Bytes::len).collect();
        assert_eq!(lens, vec![2, 4, 4]);
        assert_eq!(chunks.concat(), b"ab\0\0\0\0\0\0\0Z");
    }

    #[tokio::test]
    async fn test_distant_patch_streams_lazily() {
        let mut stream = OverlayStream::new(base(&[b"ab"]), vec![patch(1 << 40, b"Z")], 8);
        assert_eq!(&stream.next().await.unwrap().unwrap()[..], b"ab");
        for _ in 0..3 {
            let chunk = stream.next().await.unwrap().unwrap();
            assert_eq!(&chunk[..], &[0u8; 8], "gap is zero-filled one chunk at a time");
        }
    }

    #[tokio::test]
    async fn test_empty_base() {
        let out = run(&[], vec![patch(0, b"new")]).await;
        assert_eq!(out, b"new");
    }

    #[tokio::test]
    async fn test_prepare_rejects_overlap() {
        let reg = Registry::new();
        let err = prepare(
            &reg,
            vec![
                Modification::new(Data::buffer(&b"abc"[..]), 4),
                Modification::new(Bytes::from_static(b"xy"), 1).with_length(4),
                Modification::new(Data::byte_array(vec![1, 2]), 2),
            ],
            &ConvertOptions::new(),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            ConvertError::OverlappingModifications { first, second }
                if first == (1..3) && second == (2..4)
        ));
    }

    #[tokio::test]
    async fn test_prepare_rejects_end_overflow() {
        let reg = Registry::new();
        let err = prepare(
            &reg,
            vec![Modification::new("xy", u64::MAX)],
            &ConvertOptions::new(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::IllegalArgument);

        // The last addressable byte is still a valid target
        let patches = prepare(
            &reg,
            vec![Modification::new("x", u64::MAX - 1)],
            &ConvertOptions::new(),
        )
        .await
        .unwrap();
        assert_eq!(patches[0].span(), u64::MAX - 1..u64::MAX);
    }

    #[tokio::test]
    async fn test_prepare_caps_length() {
        let reg = Registry::new();
        let patches = prepare(
            &reg,
            vec![
                Modification::new("hello", 3).with_length(2),
                Modification::new("", 0),
            ],
            &ConvertOptions::new(),
        )
        .await
        .unwrap();
        assert_eq!(patches.len(), 1);
        assert_eq!(patches[0].span(), 3..5);
    }
}
