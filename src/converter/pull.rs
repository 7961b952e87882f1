use async_trait::async_trait;

use super::push::{collect, stream_of};
use super::{Converter, mismatch};
use crate::config::ConvertOptions;
use crate::data::{Data, RepresentationTag};
use crate::error::{ConvertError, Result};
use crate::merge;
use crate::registry::Registry;
use crate::stream::{into_pull, into_push};

/// Pull-style stream.
///
/// Ranged reads and merges go through a push stream and come back as a
/// reader over it.
#[derive(Debug, Default, Clone, Copy)]
pub struct PullStreamConverter;

#[async_trait]
impl Converter for PullStreamConverter {
    fn tag(&self) -> RepresentationTag {
        RepresentationTag::PullStream
    }

    fn empty(&self) -> Data {
        Data::Pull(Box::pin(futures_util::io::empty()))
    }

    fn is(&self, value: &Data) -> bool {
        matches!(value, Data::Pull(_))
    }

    async fn convert_data(
        &self,
        reg: &Registry,
        value: Data,
        options: &ConvertOptions,
    ) -> Result<Data> {
        match value {
            Data::Pull(reader) if !options.has_range() => Ok(Data::Pull(reader)),
            other => Ok(Data::Pull(into_pull(stream_of(reg, other, options).await?))),
        }
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
                Data::Pull(reader) => Ok(into_push(reader, options.buffer_size())),
                other => Err(mismatch(&other, options)),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Data::Pull(into_pull(merge::chain(streams))))
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
