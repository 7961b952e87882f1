use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{StreamExt, TryStreamExt};

use super::{Converter, mismatch};
use crate::config::ConvertOptions;
use crate::data::{Data, PushStream, RepresentationTag};
use crate::error::{ConvertError, Result};
use crate::merge::{self, concat_bytes};
use crate::range;
use crate::registry::Registry;
use crate::stream::into_push;
use crate::util::{clip_bytes, split_bytes};

/// Push-style stream.
///
/// Streams never know their size; ranges are applied on the fly by
/// [`RangeStream`](crate::range::RangeStream), which releases the source
/// as soon as the range is complete.
#[derive(Debug, Default, Clone, Copy)]
pub struct PushStreamConverter;

/// Produces a push stream of the bytes of `value` inside the options' range.
///
/// Sources that can read a range directly (buffers, blobs, base64 text,
/// URLs) do so; streams are wrapped in a range filter; every other
/// representation goes through its byte array.
pub(crate) async fn stream_of(
    reg: &Registry,
    value: Data,
    options: &ConvertOptions,
) -> Result<PushStream> {
    let source = reg.converter_matching(&value, options)?;
    if !source.is_available() {
        return Err(ConvertError::RepresentationUnavailable { tag: source.tag() });
    }

    let window = options.window();
    let chunk_size = options.buffer_size();
    match (source.tag(), value) {
        (_, Data::Push(stream)) => Ok(range::limit(stream, window)),
        (_, Data::Pull(reader)) => Ok(range::limit(into_push(reader, chunk_size), window)),
        (_, Data::Blob(blob)) => Ok(blob.slice(window).stream(chunk_size)),
        (_, Data::Buffer(bytes)) => Ok(chunks(clip_bytes(bytes, window), chunk_size)),
        (RepresentationTag::Base64Text, Data::Str(encoded)) => {
            super::base64::decode_stream(encoded, window, chunk_size)
        }
        (RepresentationTag::UrlReference, Data::Str(url)) => {
            super::url::open_stream(reg, &url, window, chunk_size).await
        }
        (_, other) => {
            let bytes = source.to_byte_array(reg, other, options).await?;
            Ok(chunks(Bytes::from(bytes), chunk_size))
        }
    }
}

/// Drains a stream into one byte array.
pub(crate) async fn collect(stream: PushStream) -> Result<Vec<u8>> {
    let chunks: Vec<Bytes> = stream.try_collect().await?;
    Ok(concat_bytes(&chunks))
}

fn chunks(bytes: Bytes, chunk_size: usize) -> PushStream {
    futures_util::stream::iter(split_bytes(bytes, chunk_size).into_iter().map(Ok)).boxed()
}

#[async_trait]
impl Converter for PushStreamConverter {
    fn tag(&self) -> RepresentationTag {
        RepresentationTag::PushStream
    }

    fn empty(&self) -> Data {
        Data::Push(futures_util::stream::empty().boxed())
    }

    fn is(&self, value: &Data) -> bool {
        matches!(value, Data::Push(_))
    }

    async fn convert_data(
        &self,
        reg: &Registry,
        value: Data,
        options: &ConvertOptions,
    ) -> Result<Data> {
        Ok(Data::Push(stream_of(reg, value, options).await?))
    }

    async fn merge_chunks(
        &self,
        _reg: &Registry,
        chunks: Vec<Data>,
        options: &ConvertOptions,
    ) -> Result<Data> {
        let streams = chunks
            .into_iter()
            .map(|chunk| match chunk {
                Data::Push(stream) => Ok(stream),
                other => Err(mismatch(&other, options)),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Data::Push(merge::chain(streams)))
    }

    fn size(&self, _reg: &Registry, _value: &Data, _options: &ConvertOptions) -> Result<u64> {
        Err(ConvertError::SizeUnavailable { tag: self.tag() })
    }

    async fn to_byte_array(
        &self,
        reg: &Registry,
        value: Data,
        options: &ConvertOptions,
    ) -> Result<Vec<u8>> {
        if !self.is(&value) {
            return Err(mismatch(&value, options));
        }
        collect(stream_of(reg, value, options).await?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn source(chunks: &[&'static [u8]]) -> Data {
        let items: Vec<io::Result<Bytes>> =
            chunks.iter().map(|c| Ok(Bytes::from_static(*c))).collect();
        Data::push(futures_util::stream::iter(items))
    }

    #[tokio::test]
    async fn test_push_range_across_chunks() {
        let reg = Registry::new();
        let opts = ConvertOptions::new().with_range(4, 3);
        let bytes = PushStreamConverter
            .to_byte_array(&reg, source(&[&[0, 1, 2], &[3, 4, 5], &[6, 7, 8]]), &opts)
            .await
            .unwrap();
        assert_eq!(bytes, vec![4, 5, 6]);
    }

    #[tokio::test]
    async fn test_buffer_becomes_sized_chunks() {
        let reg = Registry::new();
        let opts = ConvertOptions::new().with_buffer_size(4);
        let stream = stream_of(&reg, Data::buffer(vec![7u8; 10]), &opts)
            .await
            .unwrap();
        let lens: Vec<usize> = stream.map(|c| c.unwrap().len()).collect().await;
        assert_eq!(lens, vec![4, 4, 2]);
    }

    #[test]
    fn test_stream_size_unavailable() {
        let reg = Registry::new();
        let err = PushStreamConverter
            .size(&reg, &source(&[b"x"]), &ConvertOptions::new())
            .unwrap_err();
        assert!(matches!(err, ConvertError::SizeUnavailable { .. }));
    }
}
