use async_trait::async_trait;
use bytes::Bytes;

use super::{Converter, mismatch, windowed_len};
use crate::config::ConvertOptions;
use crate::data::{Data, RepresentationTag};
use crate::error::Result;
use crate::merge::concat_bytes;
use crate::registry::Registry;
use crate::util::clip_bytes;

/// Immutable shared buffer. Slicing never copies.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixedBufferConverter;

#[async_trait]
impl Converter for FixedBufferConverter {
    fn tag(&self) -> RepresentationTag {
        RepresentationTag::FixedByteBuffer
    }

    fn empty(&self) -> Data {
        Data::Buffer(Bytes::new())
    }

    fn is(&self, value: &Data) -> bool {
        matches!(value, Data::Buffer(_))
    }

    async fn convert_data(
        &self,
        reg: &Registry,
        value: Data,
        options: &ConvertOptions,
    ) -> Result<Data> {
        match value {
            Data::Buffer(bytes) => Ok(Data::Buffer(clip_bytes(bytes, options.window()))),
            other => {
                let source = reg.converter_matching(&other, options)?;
                let bytes = source.to_byte_array(reg, other, options).await?;
                Ok(Data::Buffer(Bytes::from(bytes)))
            }
        }
    }

    async fn merge_chunks(
        &self,
        _reg: &Registry,
        chunks: Vec<Data>,
        options: &ConvertOptions,
    ) -> Result<Data> {
        let buffers = chunks
            .into_iter()
            .map(|chunk| match chunk {
                Data::Buffer(bytes) => Ok(bytes),
                other => Err(mismatch(&other, options)),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Data::Buffer(Bytes::from(concat_bytes(&buffers))))
    }

    fn size(&self, _reg: &Registry, value: &Data, options: &ConvertOptions) -> Result<u64> {
        match value {
            Data::Buffer(bytes) => Ok(windowed_len(bytes.len() as u64, options)),
            other => Err(mismatch(other, options)),
        }
    }

    async fn to_byte_array(
        &self,
        _reg: &Registry,
        value: Data,
        options: &ConvertOptions,
    ) -> Result<Vec<u8>> {
        match value {
            Data::Buffer(bytes) => Ok(Vec::from(clip_bytes(bytes, options.window()))),
            other => Err(mismatch(&other, options)),
        }
    }
}
