//! The `Data` sum type.

use std::fmt;
use std::io;
use std::pin::Pin;

use bytes::Bytes;
use futures_core::Stream;
use futures_io::AsyncRead;
use futures_util::stream::BoxStream;

use super::{Blob, RepresentationTag};
use crate::config::ConvertOptions;

/// A pull-style byte source: the consumer asks for the next bytes.
pub type PullStream = Pin<Box<dyn AsyncRead + Send>>;

/// A push-style byte source: the source decides chunk boundaries.
pub type PushStream = BoxStream<'static, io::Result<Bytes>>;

/// A value in one of the supported physical representations.
///
/// Strings are ambiguous on their own: a `Data::Str` is text, base64, hex,
/// raw-byte text or a URL depending on
/// [`ConvertOptions::src_string_type`](crate::ConvertOptions::src_string_type),
/// and plain text when that option is absent.
pub enum Data {
    /// Any string-carried representation.
    Str(String),
    /// Immutable shared buffer.
    Buffer(Bytes),
    /// Owned growable byte array.
    ByteArray(Vec<u8>),
    /// Opaque blob.
    Blob(Blob),
    /// Pull-style stream.
    Pull(PullStream),
    /// Push-style stream.
    Push(PushStream),
}

impl Data {
    /// Creates a string value.
    pub fn text(s: impl Into<String>) -> Self {
        Data::Str(s.into())
    }

    /// Creates a fixed buffer value.
    pub fn buffer(bytes: impl Into<Bytes>) -> Self {
        Data::Buffer(bytes.into())
    }

    /// Creates a byte array value.
    pub fn byte_array(bytes: impl Into<Vec<u8>>) -> Self {
        Data::ByteArray(bytes.into())
    }

    /// Wraps a pull-style reader.
    pub fn pull<R>(reader: R) -> Self
    where
        R: AsyncRead + Send + 'static,
    {
        Data::Pull(Box::pin(reader))
    }

    /// Wraps a push-style chunk stream.
    pub fn push<S>(stream: S) -> Self
    where
        S: Stream<Item = io::Result<Bytes>> + Send + 'static,
    {
        Data::Push(Box::pin(stream))
    }

    /// Returns the tag implied by the variant alone, `None` for strings.
    pub fn natural_tag(&self) -> Option<RepresentationTag> {
        match self {
            Data::Str(_) => None,
            Data::Buffer(_) => Some(RepresentationTag::FixedByteBuffer),
            Data::ByteArray(_) => Some(RepresentationTag::MutableByteArray),
            Data::Blob(_) => Some(RepresentationTag::OpaqueBlob),
            Data::Pull(_) => Some(RepresentationTag::PullStream),
            Data::Push(_) => Some(RepresentationTag::PushStream),
        }
    }

    /// Resolves the representation of this value under the given options.
    pub fn resolve_tag(&self, options: &ConvertOptions) -> RepresentationTag {
        self.natural_tag().unwrap_or_else(|| {
            options
                .src_string_type()
                .unwrap_or(RepresentationTag::Text)
        })
    }

    /// Short name of the runtime shape, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Data::Str(_) => "String",
            Data::Buffer(_) => "Bytes",
            Data::ByteArray(_) => "Vec<u8>",
            Data::Blob(_) => "Blob",
            Data::Pull(_) => "AsyncRead",
            Data::Push(_) => "Stream",
        }
    }

    /// Returns the string payload, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Data::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the bytes of in-memory byte variants.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Data::Buffer(b) => Some(b),
            Data::ByteArray(v) => Some(v),
            _ => None,
        }
    }

    /// Consumes the value and returns the string payload.
    pub fn into_string(self) -> Option<String> {
        match self {
            Data::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Consumes the value and returns the blob.
    pub fn into_blob(self) -> Option<Blob> {
        match self {
            Data::Blob(b) => Some(b),
            _ => None,
        }
    }

    /// Consumes the value and returns the push stream.
    pub fn into_push(self) -> Option<PushStream> {
        match self {
            Data::Push(s) => Some(s),
            _ => None,
        }
    }

    /// Consumes the value and returns the pull stream.
    pub fn into_pull(self) -> Option<PullStream> {
        match self {
            Data::Pull(r) => Some(r),
            _ => None,
        }
    }
}

impl fmt::Debug for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Data::Str(s) => f.debug_tuple("Str").field(s).finish(),
            Data::Buffer(b) => f.debug_tuple("Buffer").field(b).finish(),
            Data::ByteArray(v) => f.debug_tuple("ByteArray").field(v).finish(),
            Data::Blob(b) => f.debug_tuple("Blob").field(b).finish(),
            Data::Pull(_) => f.write_str("Pull(..)"),
            Data::Push(_) => f.write_str("Push(..)"),
        }
    }
}

impl From<String> for Data {
    fn from(s: String) -> Self {
        Data::Str(s)
    }
}

impl From<&str> for Data {
    fn from(s: &str) -> Self {
        Data::Str(s.to_string())
    }
}

impl From<Bytes> for Data {
    fn from(b: Bytes) -> Self {
        Data::Buffer(b)
    }
}

impl From<Vec<u8>> for Data {
    fn from(v: Vec<u8>) -> Self {
        Data::ByteArray(v)
    }
}

impl From<Blob> for Data {
    fn from(b: Blob) -> Self {
        Data::Blob(b)
    }
}
