//! The conversion engine.
//!
//! A [`Registry`] owns one converter per representation and dispatches every
//! public operation. There is no global instance: build one with
//! [`Registry::new`] or [`Registry::builder`] and share it by reference.
//!
//! # Example
//!
//! ```
//! use binconv::{ConvertOptions, Data, Registry, RepresentationTag};
//!
//! # tokio_test::block_on(async {
//! let registry = Registry::new();
//! let out = registry
//!     .convert(RepresentationTag::Base64Text, Data::text("ab"), &ConvertOptions::new())
//!     .await?;
//! assert_eq!(out.as_str(), Some("YWI="));
//! # Ok::<(), binconv::ConvertError>(())
//! # }).unwrap();
//! ```

mod object_urls;
mod pipe;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::{debug, trace};

pub use pipe::Destination;

pub(crate) use object_urls::ObjectUrls;

use crate::capability::Capabilities;
use crate::codec::{TextCodec, default_codec};
use crate::config::ConvertOptions;
use crate::converter::{
    Base64Converter, BlobConverter, ByteArrayConverter, Converter, FixedBufferConverter,
    HexConverter, PullStreamConverter, PushStreamConverter, RawByteTextConverter, TextConverter,
    UnavailableConverter, UrlConverter, push,
};
use crate::data::{Data, PushStream, RepresentationTag};
use crate::error::{ConvertError, Result};
use crate::overlay::{self, Modification, OverlayStream};

fn blob_converter() -> Arc<dyn Converter> {
    Arc::new(BlobConverter)
}

fn url_converter() -> Arc<dyn Converter> {
    Arc::new(UrlConverter)
}

/// A converter slot. Optional representations are built on first use.
#[derive(Debug)]
enum Slot {
    Ready(Arc<dyn Converter>),
    Lazy {
        cell: OnceCell<Arc<dyn Converter>>,
        init: fn() -> Arc<dyn Converter>,
    },
}

impl Slot {
    fn for_tag(tag: RepresentationTag, capabilities: &Capabilities) -> Self {
        if !capabilities.supports(tag) {
            return Slot::Ready(Arc::new(UnavailableConverter::new(tag)));
        }
        match tag {
            RepresentationTag::Text => Slot::Ready(Arc::new(TextConverter)),
            RepresentationTag::Base64Text => Slot::Ready(Arc::new(Base64Converter)),
            RepresentationTag::HexText => Slot::Ready(Arc::new(HexConverter)),
            RepresentationTag::RawByteText => Slot::Ready(Arc::new(RawByteTextConverter)),
            RepresentationTag::FixedByteBuffer => Slot::Ready(Arc::new(FixedBufferConverter)),
            RepresentationTag::MutableByteArray => Slot::Ready(Arc::new(ByteArrayConverter)),
            RepresentationTag::PullStream => Slot::Ready(Arc::new(PullStreamConverter)),
            RepresentationTag::PushStream => Slot::Ready(Arc::new(PushStreamConverter)),
            RepresentationTag::OpaqueBlob => Slot::Lazy {
                cell: OnceCell::new(),
                init: blob_converter,
            },
            RepresentationTag::UrlReference => Slot::Lazy {
                cell: OnceCell::new(),
                init: url_converter,
            },
            RepresentationTag::Unavailable => Slot::Ready(Arc::new(UnavailableConverter::new(tag))),
        }
    }

    fn get(&self) -> &dyn Converter {
        match self {
            Slot::Ready(converter) => converter.as_ref(),
            Slot::Lazy { cell, init } => cell
                .get_or_init(|| {
                    let converter = init();
                    debug!(tag = %converter.tag(), "constructed converter");
                    converter
                })
                .as_ref(),
        }
    }
}

/// Builder for [`Registry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    capabilities: Option<Capabilities>,
    codec: Option<Arc<dyn TextCodec>>,
    temp_dir: Option<PathBuf>,
}

impl RegistryBuilder {
    /// Overrides the detected runtime capabilities.
    pub fn capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = Some(capabilities);
        self
    }

    /// Uses `codec` for every text encode and decode.
    pub fn codec(mut self, codec: Arc<dyn TextCodec>) -> Self {
        self.codec = Some(codec);
        self
    }

    /// Directory for files created when producing `file:` URLs.
    pub fn temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    /// Builds the registry.
    pub fn build(self) -> Registry {
        let capabilities = self.capabilities.unwrap_or_else(Capabilities::detect);
        let slots = RepresentationTag::ALL.map(|tag| Slot::for_tag(tag, &capabilities));
        Registry {
            capabilities,
            codec: self.codec.unwrap_or_else(default_codec),
            temp_dir: self.temp_dir.unwrap_or_else(std::env::temp_dir),
            slots,
            object_urls: ObjectUrls::default(),
        }
    }
}

/// Converter registry and dispatcher.
#[derive(Debug)]
pub struct Registry {
    capabilities: Capabilities,
    codec: Arc<dyn TextCodec>,
    temp_dir: PathBuf,
    slots: [Slot; RepresentationTag::ALL.len()],
    object_urls: ObjectUrls,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Registry with detected capabilities and the default codec.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Starts a customized registry.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Capabilities this registry was built with.
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// The text codec.
    pub fn codec(&self) -> &dyn TextCodec {
        self.codec.as_ref()
    }

    /// Directory for files behind produced `file:` URLs.
    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    pub(crate) fn object_urls(&self) -> &ObjectUrls {
        &self.object_urls
    }

    /// Returns the converter for `tag`.
    ///
    /// Representations missing from this runtime get a converter whose
    /// operations fail with [`ConvertError::RepresentationUnavailable`].
    pub fn converter_for(&self, tag: RepresentationTag) -> Result<&dyn Converter> {
        RepresentationTag::ALL
            .iter()
            .position(|t| *t == tag)
            .map(|i| self.slots[i].get())
            .ok_or_else(|| ConvertError::UnknownRepresentation {
                name: tag.to_string(),
            })
    }

    /// Looks up a converter by its representation name.
    pub fn converter_named(&self, name: &str) -> Result<&dyn Converter> {
        self.converter_for(name.parse()?)
    }

    /// All converters, in tag order.
    pub fn converters(&self) -> impl Iterator<Item = &dyn Converter> {
        self.slots.iter().map(Slot::get)
    }

    /// Returns the converter that owns `value` under `options`.
    pub fn converter_matching(
        &self,
        value: &Data,
        options: &ConvertOptions,
    ) -> Result<&dyn Converter> {
        let no_match = || ConvertError::NoMatchingConverter {
            observed: value.type_name(),
            src_string_type: options.src_string_type(),
        };
        let converter = self
            .converter_for(value.resolve_tag(options))
            .map_err(|_| no_match())?;
        if converter.matches(value, options) {
            Ok(converter)
        } else {
            Err(no_match())
        }
    }

    /// Converts `value` into `tag`, honoring the options' range.
    pub async fn convert(
        &self,
        tag: RepresentationTag,
        value: Data,
        options: &ConvertOptions,
    ) -> Result<Data> {
        options.validate()?;
        let target = self.converter_for(tag)?;
        let source = self.converter_matching(&value, options)?;
        let options = options.aligned_for(source.tag(), tag);
        trace!(from = %source.tag(), to = %tag, "convert");
        target.convert(self, value, &options).await
    }

    /// Converts `value` into the options' `dst_type`.
    pub async fn convert_to(&self, value: Data, options: &ConvertOptions) -> Result<Data> {
        let tag = options
            .dst_type()
            .ok_or_else(|| ConvertError::illegal("dstType is required"))?;
        self.convert(tag, value, options).await
    }

    /// Concatenates `values` into one value of `tag`.
    ///
    /// Each value is converted to `tag` first; string values with no
    /// `src_string_type` are taken to already be in `tag` when it is a
    /// string representation. A range in `options` applies to the merged
    /// result.
    pub async fn merge(
        &self,
        tag: RepresentationTag,
        values: Vec<Data>,
        options: &ConvertOptions,
    ) -> Result<Data> {
        options.validate()?;
        let target = self.converter_for(tag)?;
        let unranged = options.without_range();
        let as_target = unranged.with_string_type(tag);

        let mut chunks = Vec::with_capacity(values.len());
        for value in values {
            let item_options = match value {
                Data::Str(_) if tag.is_string() && options.src_string_type().is_none() => {
                    &as_target
                }
                _ => &unranged,
            };
            chunks.push(self.convert(tag, value, item_options).await?);
        }
        trace!(%tag, count = chunks.len(), "merge");

        let merged = target.merge(self, chunks, &as_target).await?;
        if options.has_range() {
            let ranged = options.with_string_type(tag);
            target.slice(self, merged, &ranged).await
        } else {
            Ok(merged)
        }
    }

    /// Byte length of `value` after the options' range, without consuming it.
    ///
    /// Streams fail with [`ConvertError::SizeUnavailable`].
    pub fn size(&self, value: &Data, options: &ConvertOptions) -> Result<u64> {
        self.converter_matching(value, options)?
            .size(self, value, options)
    }

    /// The requested range of `value`, in its own representation.
    pub async fn slice(&self, value: Data, options: &ConvertOptions) -> Result<Data> {
        options.validate()?;
        let source = self.converter_matching(&value, options)?;
        source.slice(self, value, options).await
    }

    /// Streams `value` with `modifications` spliced over it.
    ///
    /// The result is a push stream. Modification windows may not overlap;
    /// windows past the end of the base extend it, zero-filling any gap.
    pub async fn apply_modifications(
        &self,
        value: Data,
        modifications: Vec<Modification>,
        options: &ConvertOptions,
    ) -> Result<Data> {
        options.validate()?;
        let patches = overlay::prepare(self, modifications, options).await?;
        let base: PushStream = push::stream_of(self, value, &options.without_range()).await?;
        Ok(Data::push(OverlayStream::new(base, patches, options.buffer_size())))
    }

    /// Forgets an object URL. Returns false if it was not registered.
    pub fn revoke_object_url(&self, url: &str) -> bool {
        self.object_urls.revoke(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Blob;

    #[test]
    fn test_converter_for_every_tag() {
        let reg = Registry::builder().capabilities(Capabilities::all()).build();
        for tag in RepresentationTag::ALL {
            let converter = reg.converter_for(tag).unwrap();
            assert_eq!(converter.tag(), tag);
            assert!(converter.is_available());
        }
        assert!(matches!(
            reg.converter_for(RepresentationTag::Unavailable),
            Err(ConvertError::UnknownRepresentation { .. })
        ));
        assert!(reg.converter_named("no-such-thing").is_err());
    }

    #[tokio::test]
    async fn test_missing_capability_is_unavailable() {
        let reg = Registry::builder()
            .capabilities(Capabilities::all().without(RepresentationTag::OpaqueBlob))
            .build();
        let converter = reg.converter_for(RepresentationTag::OpaqueBlob).unwrap();
        assert!(!converter.is_available());

        let err = reg
            .convert(RepresentationTag::OpaqueBlob, Data::text("x"), &ConvertOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ConvertError::RepresentationUnavailable { .. }));

        let err = reg
            .convert(
                RepresentationTag::Text,
                Data::Blob(Blob::from_bytes(&b"x"[..])),
                &ConvertOptions::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ConvertError::RepresentationUnavailable { .. }));
    }

    #[test]
    fn test_no_matching_converter() {
        let reg = Registry::new();
        let opts = ConvertOptions::new().with_src_string_type(RepresentationTag::FixedByteBuffer);
        let err = reg.converter_matching(&Data::text("x"), &opts).unwrap_err();
        assert!(matches!(
            err,
            ConvertError::NoMatchingConverter {
                observed: "String",
                src_string_type: Some(RepresentationTag::FixedByteBuffer),
            }
        ));
    }

    #[tokio::test]
    async fn test_convert_to_requires_dst_type() {
        let reg = Registry::new();
        let err = reg
            .convert_to(Data::text("x"), &ConvertOptions::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::IllegalArgument);

        let out = reg
            .convert_to(
                Data::text("x"),
                &ConvertOptions::new().with_dst_type(RepresentationTag::HexText),
            )
            .await
            .unwrap();
        assert_eq!(out.as_str(), Some("78"));
    }

    #[test]
    fn test_blob_converter_is_lazy() {
        let reg = Registry::builder().capabilities(Capabilities::all()).build();
        let index = RepresentationTag::ALL
            .iter()
            .position(|t| *t == RepresentationTag::OpaqueBlob)
            .unwrap();
        let Slot::Lazy { cell, .. } = &reg.slots[index] else {
            panic!("blob slot should be lazy");
        };
        assert!(cell.get().is_none());
        reg.converter_for(RepresentationTag::OpaqueBlob).unwrap();
        assert!(cell.get().is_some());
    }
}
