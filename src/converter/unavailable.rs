use async_trait::async_trait;

use super::Converter;
use crate::config::ConvertOptions;
use crate::data::{Data, RepresentationTag};
use crate::error::{ConvertError, Result};
use crate::registry::Registry;

/// Stand-in for a representation this runtime cannot handle.
///
/// It still recognizes values of its shape, so dispatch reports
/// [`ConvertError::RepresentationUnavailable`] instead of a missing
/// converter, and every operation fails with that error.
#[derive(Debug, Clone, Copy)]
pub struct UnavailableConverter {
    tag: RepresentationTag,
}

impl UnavailableConverter {
    /// Creates a stand-in for `tag`.
    pub fn new(tag: RepresentationTag) -> Self {
        Self { tag }
    }

    fn error(&self) -> ConvertError {
        ConvertError::RepresentationUnavailable { tag: self.tag }
    }
}

#[async_trait]
impl Converter for UnavailableConverter {
    fn tag(&self) -> RepresentationTag {
        self.tag
    }

    fn is_available(&self) -> bool {
        false
    }

    fn empty(&self) -> Data {
        Data::ByteArray(Vec::new())
    }

    fn is(&self, value: &Data) -> bool {
        value.natural_tag() == Some(self.tag)
    }

    fn matches(&self, value: &Data, _options: &ConvertOptions) -> bool {
        self.is(value)
    }

    async fn convert(&self, _reg: &Registry, _value: Data, _options: &ConvertOptions) -> Result<Data> {
        Err(self.error())
    }

    async fn convert_data(
        &self,
        _reg: &Registry,
        _value: Data,
        _options: &ConvertOptions,
    ) -> Result<Data> {
        Err(self.error())
    }

    async fn merge(
        &self,
        _reg: &Registry,
        _chunks: Vec<Data>,
        _options: &ConvertOptions,
    ) -> Result<Data> {
        Err(self.error())
    }

    async fn merge_chunks(
        &self,
        _reg: &Registry,
        _chunks: Vec<Data>,
        _options: &ConvertOptions,
    ) -> Result<Data> {
        Err(self.error())
    }

    fn size(&self, _reg: &Registry, _value: &Data, _options: &ConvertOptions) -> Result<u64> {
        Err(self.error())
    }

    async fn to_byte_array(
        &self,
        _reg: &Registry,
        _value: Data,
        _options: &ConvertOptions,
    ) -> Result<Vec<u8>> {
        Err(self.error())
    }

    async fn slice(&self, _reg: &Registry, _value: Data, _options: &ConvertOptions) -> Result<Data> {
        Err(self.error())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Blob;

    #[tokio::test]
    async fn test_every_operation_fails() {
        let reg = Registry::new();
        let conv = UnavailableConverter::new(RepresentationTag::OpaqueBlob);
        let opts = ConvertOptions::new();
        let blob = || Data::Blob(Blob::from_bytes(&b"x"[..]));

        assert!(conv.is(&blob()));
        assert!(!conv.is(&Data::text("x")));
        assert!(conv.convert(&reg, blob(), &opts).await.is_err());
        assert!(conv.convert(&reg, blob(), &opts.clone().with_length(0)).await.is_err());
        assert!(conv.merge(&reg, Vec::new(), &opts).await.is_err());
        assert!(conv.size(&reg, &blob(), &opts).is_err());
        assert!(conv.to_text(&reg, blob(), &opts).await.is_err());
        let err = conv.to_base64(&reg, blob(), &opts).await.unwrap_err();
        assert!(matches!(
            err,
            ConvertError::RepresentationUnavailable {
                tag: RepresentationTag::OpaqueBlob
            }
        ));
    }
}
