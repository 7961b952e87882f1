use async_trait::async_trait;

use super::{Converter, mismatch, windowed_len};
use crate::config::ConvertOptions;
use crate::data::{Data, RepresentationTag};
use crate::error::Result;
use crate::merge::concat_bytes;
use crate::registry::Registry;
use crate::util::clip_vec;

/// Owned byte array, the pivot every other representation can reach.
#[derive(Debug, Default, Clone, Copy)]
pub struct ByteArrayConverter;

#[async_trait]
impl Converter for ByteArrayConverter {
    fn tag(&self) -> RepresentationTag {
        RepresentationTag::MutableByteArray
    }

    fn empty(&self) -> Data {
        Data::ByteArray(Vec::new())
    }

    fn is(&self, value: &Data) -> bool {
        matches!(value, Data::ByteArray(_))
    }

    async fn convert_data(
        &self,
        reg: &Registry,
        value: Data,
        options: &ConvertOptions,
    ) -> Result<Data> {
        match value {
            Data::ByteArray(bytes) => Ok(Data::ByteArray(clip_vec(bytes, options.window()))),
            other => {
                let source = reg.converter_matching(&other, options)?;
                Ok(Data::ByteArray(source.to_byte_array(reg, other, options).await?))
            }
        }
    }

    async fn merge_chunks(
        &self,
        _reg: &Registry,
        chunks: Vec<Data>,
        options: &ConvertOptions,
    ) -> Result<Data> {
        let arrays = chunks
            .into_iter()
            .map(|chunk| match chunk {
                Data::ByteArray(bytes) => Ok(bytes),
                other => Err(mismatch(&other, options)),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Data::ByteArray(concat_bytes(&arrays)))
    }

    fn size(&self, _reg: &Registry, value: &Data, options: &ConvertOptions) -> Result<u64> {
        match value {
            Data::ByteArray(bytes) => Ok(windowed_len(bytes.len() as u64, options)),
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
            Data::ByteArray(bytes) => Ok(clip_vec(bytes, options.window())),
            other => Err(mismatch(&other, options)),
        }
    }
}
