//! Per-representation converters.
//!
//! Every representation has one [`Converter`]. A converter knows how to
//! produce and consume exactly its own form; anything else goes through the
//! [`Registry`] passed to each call, with the byte array as the pivot when no
//! cheaper path exists.
//!
//! Ranges are applied once: a converter honors the options' range when it
//! reads its own value (`to_byte_array`, `to_text`, `to_base64`, or a native
//! slice in `convert_data`) and never re-slices bytes it got from another
//! converter.

mod base64;
mod blob;
mod buffer;
mod byte_array;
mod hex;
pub(crate) mod push;
mod pull;
mod raw;
mod text;
mod unavailable;
mod url;

use std::fmt;

use ::base64::Engine as _;
use ::base64::engine::general_purpose::STANDARD as BASE64;
use async_trait::async_trait;

pub use self::base64::Base64Converter;
pub use self::blob::BlobConverter;
pub use self::buffer::FixedBufferConverter;
pub use self::byte_array::ByteArrayConverter;
pub use self::hex::HexConverter;
pub use self::pull::PullStreamConverter;
pub use self::push::PushStreamConverter;
pub use self::raw::RawByteTextConverter;
pub use self::text::TextConverter;
pub use self::unavailable::UnavailableConverter;
pub use self::url::UrlConverter;

use crate::config::ConvertOptions;
use crate::data::{Data, RepresentationTag};
use crate::error::{ConvertError, Result};
use crate::registry::Registry;

/// The operations every representation supports.
#[async_trait]
pub trait Converter: Send + Sync + fmt::Debug {
    /// The representation this converter produces.
    fn tag(&self) -> RepresentationTag;

    /// Returns false for stand-ins of representations this runtime lacks.
    fn is_available(&self) -> bool {
        true
    }

    /// Zero-length value of this representation.
    fn empty(&self) -> Data;

    /// Returns true if `value` has this converter's physical shape.
    fn is(&self, value: &Data) -> bool;

    /// Returns true if `value` is this representation under `options`.
    fn matches(&self, value: &Data, options: &ConvertOptions) -> bool {
        self.is(value) && value.resolve_tag(options) == self.tag()
    }

    /// Converts `value` into this representation.
    async fn convert(&self, reg: &Registry, value: Data, options: &ConvertOptions) -> Result<Data> {
        if options.length() == Some(0) {
            return Ok(self.empty());
        }
        self.convert_data(reg, value, options).await
    }

    /// Representation-specific part of [`Converter::convert`].
    async fn convert_data(
        &self,
        reg: &Registry,
        value: Data,
        options: &ConvertOptions,
    ) -> Result<Data>;

    /// Merges chunks of this representation into one value.
    async fn merge(
        &self,
        reg: &Registry,
        mut chunks: Vec<Data>,
        options: &ConvertOptions,
    ) -> Result<Data> {
        match chunks.pop() {
            None => Ok(self.empty()),
            Some(only) if chunks.is_empty() => Ok(only),
            Some(last) => {
                chunks.push(last);
                self.merge_chunks(reg, chunks, options).await
            }
        }
    }

    /// Merges two or more chunks.
    async fn merge_chunks(
        &self,
        reg: &Registry,
        chunks: Vec<Data>,
        options: &ConvertOptions,
    ) -> Result<Data>;

    /// Byte length of `value` after the options' range is applied.
    fn size(&self, reg: &Registry, value: &Data, options: &ConvertOptions) -> Result<u64>;

    /// Bytes of `value` inside the options' range.
    async fn to_byte_array(
        &self,
        reg: &Registry,
        value: Data,
        options: &ConvertOptions,
    ) -> Result<Vec<u8>>;

    /// Text decoded from the bytes of `value`.
    async fn to_text(&self, reg: &Registry, value: Data, options: &ConvertOptions) -> Result<String> {
        let bytes = self.to_byte_array(reg, value, options).await?;
        reg.codec()
            .decode_owned(bytes, options.buffer_to_text_charset())
    }

    /// Base64 encoding of the bytes of `value`.
    async fn to_base64(
        &self,
        reg: &Registry,
        value: Data,
        options: &ConvertOptions,
    ) -> Result<String> {
        let bytes = self.to_byte_array(reg, value, options).await?;
        Ok(BASE64.encode(bytes))
    }

    /// The requested range of `value`, in this representation.
    ///
    /// Fails with [`ConvertError::IllegalArgument`] unless `start` or
    /// `length` is given.
    async fn slice(&self, reg: &Registry, value: Data, options: &ConvertOptions) -> Result<Data> {
        if !options.has_range() {
            return Err(ConvertError::illegal(
                "slice requires at least one of start or length",
            ));
        }
        self.convert(reg, value, options).await
    }
}

/// Error for a value handed to a converter that does not own its shape.
pub(crate) fn mismatch(value: &Data, options: &ConvertOptions) -> ConvertError {
    ConvertError::NoMatchingConverter {
        observed: value.type_name(),
        src_string_type: options.src_string_type(),
    }
}

/// Extracts the string payloads of string chunks.
pub(crate) fn strings(chunks: Vec<Data>, options: &ConvertOptions) -> Result<Vec<String>> {
    chunks
        .into_iter()
        .map(|chunk| match chunk {
            Data::Str(s) => Ok(s),
            other => Err(mismatch(&other, options)),
        })
        .collect()
}

/// Size of a value of `total` bytes after the options' range.
pub(crate) fn windowed_len(total: u64, options: &ConvertOptions) -> u64 {
    let r = options.window().clip(total);
    r.end - r.start
}

/// Unwraps a string value.
pub(crate) fn into_string(value: Data, options: &ConvertOptions) -> Result<String> {
    match value {
        Data::Str(s) => Ok(s),
        other => Err(mismatch(&other, options)),
    }
}
