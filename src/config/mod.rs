//! Configuration for conversions.
//!
//! - [`ConvertOptions`] - Per-call options: chunk size, string types, charsets, range
//! - [`UrlKind`] - Flavor of URL produced for `url-reference` output
//!
//! # Example
//!
//! ```
//! use binconv::{ConvertOptions, RepresentationTag};
//!
//! let options = ConvertOptions::default()
//!     .with_src_string_type(RepresentationTag::Base64Text)
//!     .with_range(4, 16)
//!     .with_buffer_size(64 * 1024);
//!
//! assert_eq!(options.start(), Some(4));
//! options.validate()?;
//! # Ok::<(), binconv::ConvertError>(())
//! ```

use std::borrow::Cow;

use tracing::warn;

use crate::codec::Charset;
use crate::data::RepresentationTag;
use crate::error::ConvertError;
use crate::range::Window;

/// Default chunk granularity for streaming (96 KiB).
pub const DEFAULT_BUFFER_SIZE: usize = 96 * 1024;

/// Chunk sizes touching base64 text must be a multiple of this.
pub const BASE64_ALIGNMENT: usize = 6;

/// Kind of URL produced when converting to `url-reference`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum UrlKind {
    /// `file:` URL of a file written to the temp directory.
    File,
    /// `blob:` object URL held in the registry's object URL store.
    Blob,
    /// Inline `data:` URL.
    Data,
}

/// Options for a single conversion.
///
/// Every field is optional in spirit: the defaults convert the whole value
/// with utf8 text and 96 KiB stream chunks.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default, rename_all = "camelCase")
)]
pub struct ConvertOptions {
    /// Chunk granularity when streaming or re-chunking.
    buffer_size: usize,

    /// What a plain string value denotes.
    src_string_type: Option<RepresentationTag>,

    /// Target tag for [`Registry::convert_to`](crate::Registry::convert_to).
    dst_type: Option<RepresentationTag>,

    /// Charset used to decode bytes into text.
    buffer_to_text_charset: Charset,

    /// Charset used to encode text into bytes.
    text_to_buffer_charset: Charset,

    /// First byte of the requested range.
    start: Option<u64>,

    /// Length of the requested range; absent means to the end.
    length: Option<u64>,

    /// URL flavor for `url-reference` output.
    #[cfg_attr(feature = "serde", serde(rename = "dstURLType"))]
    dst_url_kind: Option<UrlKind>,
}

impl ConvertOptions {
    /// Creates options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the chunk granularity.
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    /// Declares what a plain string value denotes.
    pub fn with_src_string_type(mut self, tag: RepresentationTag) -> Self {
        self.src_string_type = Some(tag);
        self
    }

    /// Sets the target used by [`Registry::convert_to`](crate::Registry::convert_to).
    pub fn with_dst_type(mut self, tag: RepresentationTag) -> Self {
        self.dst_type = Some(tag);
        self
    }

    /// Sets the charset used when bytes become text.
    pub fn with_buffer_to_text_charset(mut self, charset: impl Into<Charset>) -> Self {
        self.buffer_to_text_charset = charset.into();
        self
    }

    /// Sets the charset used when text becomes bytes.
    pub fn with_text_to_buffer_charset(mut self, charset: impl Into<Charset>) -> Self {
        self.text_to_buffer_charset = charset.into();
        self
    }

    /// Sets the first byte of the range.
    pub fn with_start(mut self, start: u64) -> Self {
        self.start = Some(start);
        self
    }

    /// Sets the range length.
    pub fn with_length(mut self, length: u64) -> Self {
        self.length = Some(length);
        self
    }

    /// Sets both range bounds.
    pub fn with_range(self, start: u64, length: u64) -> Self {
        self.with_start(start).with_length(length)
    }

    /// Sets the URL flavor for `url-reference` output.
    pub fn with_dst_url_kind(mut self, kind: UrlKind) -> Self {
        self.dst_url_kind = Some(kind);
        self
    }

    /// Returns the chunk granularity.
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Returns the declared string type.
    pub fn src_string_type(&self) -> Option<RepresentationTag> {
        self.src_string_type
    }

    /// Returns the declared target type.
    pub fn dst_type(&self) -> Option<RepresentationTag> {
        self.dst_type
    }

    /// Returns the bytes-to-text charset.
    pub fn buffer_to_text_charset(&self) -> &Charset {
        &self.buffer_to_text_charset
    }

    /// Returns the text-to-bytes charset.
    pub fn text_to_buffer_charset(&self) -> &Charset {
        &self.text_to_buffer_charset
    }

    /// Returns the range start, if set.
    pub fn start(&self) -> Option<u64> {
        self.start
    }

    /// Returns the range length, if set.
    pub fn length(&self) -> Option<u64> {
        self.length
    }

    /// Returns the requested URL flavor, if set.
    pub fn dst_url_kind(&self) -> Option<UrlKind> {
        self.dst_url_kind
    }

    /// Returns true if either range bound is set.
    pub fn has_range(&self) -> bool {
        self.start.is_some() || self.length.is_some()
    }

    /// Returns the requested byte window.
    pub fn window(&self) -> Window {
        Window::from_options(self)
    }

    /// Returns a copy with both range bounds cleared.
    pub fn without_range(&self) -> Self {
        Self {
            start: None,
            length: None,
            ..self.clone()
        }
    }

    /// Returns a copy declaring plain strings as `tag`.
    pub(crate) fn with_string_type(&self, tag: RepresentationTag) -> Self {
        Self {
            src_string_type: Some(tag),
            ..self.clone()
        }
    }

    /// Validates the options.
    ///
    /// # Example
    ///
    /// ```
    /// use binconv::ConvertOptions;
    ///
    /// assert!(ConvertOptions::default().with_buffer_size(0).validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), ConvertError> {
        if self.buffer_size == 0 {
            return Err(ConvertError::InvalidOptions {
                message: "bufferSize must be non-zero",
            });
        }
        Ok(())
    }

    /// Rounds `buffer_size` down to a multiple of 6 when base64 text is on
    /// either side of the conversion, so 4-character groups never straddle
    /// a chunk boundary.
    ///
    /// The correction is logged, never an error.
    ///
    /// # Example
    ///
    /// ```
    /// use binconv::{ConvertOptions, RepresentationTag};
    ///
    /// let options = ConvertOptions::default().with_buffer_size(97);
    /// let aligned = options.aligned_for(
    ///     RepresentationTag::PushStream,
    ///     RepresentationTag::Base64Text,
    /// );
    /// assert_eq!(aligned.buffer_size(), 96);
    /// ```
    pub fn aligned_for(&self, src: RepresentationTag, dst: RepresentationTag) -> Cow<'_, Self> {
        let involves_base64 =
            src == RepresentationTag::Base64Text || dst == RepresentationTag::Base64Text;
        if !involves_base64 || self.buffer_size % BASE64_ALIGNMENT == 0 {
            return Cow::Borrowed(self);
        }

        let aligned = (self.buffer_size - self.buffer_size % BASE64_ALIGNMENT).max(BASE64_ALIGNMENT);
        warn!(
            requested = self.buffer_size,
            aligned,
            "bufferSize is not a multiple of {BASE64_ALIGNMENT} for base64 text, adjusting"
        );
        Cow::Owned(Self {
            buffer_size: aligned,
            ..self.clone()
        })
    }
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            src_string_type: None,
            dst_type: None,
            buffer_to_text_charset: Charset::Utf8,
            text_to_buffer_charset: Charset::Utf8,
            start: None,
            length: None,
            dst_url_kind: None,
        }
    }
}
