//! Representation tags.

use std::fmt;
use std::str::FromStr;

use crate::error::ConvertError;

/// Identifies one physical form of byte data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum RepresentationTag {
    /// Text in a charset (utf8 unless configured otherwise).
    Text,
    /// Base64 (standard alphabet, padded) text.
    Base64Text,
    /// Lowercase hexadecimal text, two characters per byte.
    HexText,
    /// One character per byte (code points 0..=255).
    RawByteText,
    /// A `data:`, `file:` or `blob:` URL.
    UrlReference,
    /// Immutable shared byte buffer ([`bytes::Bytes`]).
    FixedByteBuffer,
    /// Growable owned byte array (`Vec<u8>`); the canonical pivot form.
    MutableByteArray,
    /// Opaque large binary object ([`crate::Blob`]).
    OpaqueBlob,
    /// Pull-style stream ([`futures_io::AsyncRead`]).
    PullStream,
    /// Push-style stream of byte chunks ([`futures_core::Stream`]).
    PushStream,
    /// Sentinel for representations this runtime does not support.
    Unavailable,
}

impl RepresentationTag {
    /// Every tag bound to a converter slot, in registration order.
    pub const ALL: [RepresentationTag; 10] = [
        RepresentationTag::Text,
        RepresentationTag::Base64Text,
        RepresentationTag::HexText,
        RepresentationTag::RawByteText,
        RepresentationTag::UrlReference,
        RepresentationTag::FixedByteBuffer,
        RepresentationTag::MutableByteArray,
        RepresentationTag::OpaqueBlob,
        RepresentationTag::PullStream,
        RepresentationTag::PushStream,
    ];

    /// Returns the canonical name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            RepresentationTag::Text => "text",
            RepresentationTag::Base64Text => "base64-text",
            RepresentationTag::HexText => "hex-text",
            RepresentationTag::RawByteText => "raw-byte-text",
            RepresentationTag::UrlReference => "url-reference",
            RepresentationTag::FixedByteBuffer => "fixed-byte-buffer",
            RepresentationTag::MutableByteArray => "mutable-byte-array",
            RepresentationTag::OpaqueBlob => "opaque-blob",
            RepresentationTag::PullStream => "pull-stream",
            RepresentationTag::PushStream => "push-stream",
            RepresentationTag::Unavailable => "unavailable",
        }
    }

    /// Returns true if values of this tag are carried as strings.
    pub const fn is_string(&self) -> bool {
        matches!(
            self,
            RepresentationTag::Text
                | RepresentationTag::Base64Text
                | RepresentationTag::HexText
                | RepresentationTag::RawByteText
                | RepresentationTag::UrlReference
        )
    }

    /// Returns true for the stream representations.
    pub const fn is_stream(&self) -> bool {
        matches!(
            self,
            RepresentationTag::PullStream | RepresentationTag::PushStream
        )
    }
}

impl fmt::Display for RepresentationTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RepresentationTag {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RepresentationTag::ALL
            .iter()
            .chain(std::iter::once(&RepresentationTag::Unavailable))
            .find(|tag| tag.as_str() == s)
            .copied()
            .ok_or_else(|| ConvertError::UnknownRepresentation {
                name: s.to_string(),
            })
    }
}
