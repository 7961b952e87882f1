use async_trait::async_trait;

use super::{Converter, mismatch, windowed_len};
use crate::config::ConvertOptions;
use crate::data::{Blob, Data, RepresentationTag};
use crate::error::Result;
use crate::registry::Registry;
use crate::util::clip_bytes;

/// Opaque blob.
///
/// Slices are views on the same source and merging builds a composite blob,
/// so neither copies bytes.
#[derive(Debug, Default, Clone, Copy)]
pub struct BlobConverter;

#[async_trait]
impl Converter for BlobConverter {
    fn tag(&self) -> RepresentationTag {
        RepresentationTag::OpaqueBlob
    }

    fn empty(&self) -> Data {
        Data::Blob(Blob::empty())
    }

    fn is(&self, value: &Data) -> bool {
        matches!(value, Data::Blob(_))
    }

    async fn convert_data(
        &self,
        reg: &Registry,
        value: Data,
        options: &ConvertOptions,
    ) -> Result<Data> {
        let blob = match value {
            Data::Blob(blob) => blob.slice(options.window()),
            Data::Buffer(bytes) => Blob::from_bytes(clip_bytes(bytes, options.window())),
            other => {
                let source = reg.converter_matching(&other, options)?;
                Blob::from_bytes(source.to_byte_array(reg, other, options).await?)
            }
        };
        Ok(Data::Blob(blob))
    }

    async fn merge_chunks(
        &self,
        _reg: &Registry,
        chunks: Vec<Data>,
        options: &ConvertOptions,
    ) -> Result<Data> {
        let parts = chunks
            .into_iter()
            .map(|chunk| match chunk {
                Data::Blob(blob) => Ok(blob),
                other => Err(mismatch(&other, options)),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Data::Blob(Blob::concat(parts)))
    }

    fn size(&self, _reg: &Registry, value: &Data, options: &ConvertOptions) -> Result<u64> {
        match value {
            Data::Blob(blob) => Ok(windowed_len(blob.len(), options)),
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
            Data::Blob(blob) => Ok(Vec::from(blob.slice(options.window()).bytes().await?)),
            other => Err(mismatch(&other, options)),
        }
    }
}
