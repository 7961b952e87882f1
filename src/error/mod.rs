//! Error types for binconv.

use std::ops::Range;

use crate::data::RepresentationTag;

/// Result alias used across the crate.
pub type Result<T, E = ConvertError> = std::result::Result<T, E>;

/// Errors that can occur during conversion, merging, slicing and piping.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConvertError {
    /// A representation name or tag has no registered converter.
    #[error("unknown representation: {name}")]
    UnknownRepresentation {
        /// The name or tag that was requested.
        name: String,
    },

    /// No converter accepts the given value.
    #[error("no converter matches value of type {observed} (srcStringType: {src_string_type:?})")]
    NoMatchingConverter {
        /// Runtime shape of the value.
        observed: &'static str,
        /// The string type requested by the caller, if any.
        src_string_type: Option<RepresentationTag>,
    },

    /// The representation is known but not supported by this runtime.
    #[error("{tag} is not supported in this runtime")]
    RepresentationUnavailable {
        /// The unavailable representation.
        tag: RepresentationTag,
    },

    /// The caller supplied an ambiguous or unsupported argument.
    #[error("illegal argument: {message}")]
    IllegalArgument {
        /// Description of what was wrong.
        message: String,
    },

    /// The charset is neither built in nor resolvable by an extension.
    #[error("unsupported encoding: {charset}")]
    UnsupportedEncoding {
        /// The requested charset label.
        charset: String,
    },

    /// The size of the value cannot be known without consuming it.
    #[error("size of {tag} is unavailable without consuming it")]
    SizeUnavailable {
        /// Representation of the value.
        tag: RepresentationTag,
    },

    /// The value is malformed for its representation (bad base64, odd hex, ...).
    #[error("invalid {tag} data: {message}")]
    InvalidData {
        /// Representation the data claimed to be.
        tag: RepresentationTag,
        /// Description of the problem.
        message: String,
    },

    /// The URL scheme cannot be resolved by this engine.
    #[error("unsupported url: {url}")]
    UnsupportedUrl {
        /// The offending URL.
        url: String,
    },

    /// Two modification windows cover the same bytes.
    #[error("overlapping modifications: {first:?} and {second:?}")]
    OverlappingModifications {
        /// The earlier window.
        first: Range<u64>,
        /// The window that overlaps it.
        second: Range<u64>,
    },

    /// Invalid option value.
    #[error("invalid options: {message}")]
    InvalidOptions {
        /// Description of what was invalid.
        message: &'static str,
    },

    /// An I/O error occurred while reading a source or writing a destination.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse error classification for callers that branch on the kind only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Dispatch failed (by tag or by value).
    Dispatch,
    /// Representation not available in this runtime.
    Unavailable,
    /// Ambiguous or unsupported argument, including invalid options.
    IllegalArgument,
    /// Charset not supported.
    Encoding,
    /// Size not knowable.
    SizeUnavailable,
    /// Malformed input data.
    InvalidData,
    /// I/O failure.
    Io,
}

impl ConvertError {
    /// Returns the coarse kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConvertError::UnknownRepresentation { .. } | ConvertError::NoMatchingConverter { .. } => {
                ErrorKind::Dispatch
            }
            ConvertError::RepresentationUnavailable { .. } => ErrorKind::Unavailable,
            ConvertError::IllegalArgument { .. }
            | ConvertError::UnsupportedUrl { .. }
            | ConvertError::OverlappingModifications { .. }
            | ConvertError::InvalidOptions { .. } => ErrorKind::IllegalArgument,
            ConvertError::UnsupportedEncoding { .. } => ErrorKind::Encoding,
            ConvertError::SizeUnavailable { .. } => ErrorKind::SizeUnavailable,
            ConvertError::InvalidData { .. } => ErrorKind::InvalidData,
            ConvertError::Io(_) => ErrorKind::Io,
        }
    }

    pub(crate) fn illegal(message: impl Into<String>) -> Self {
        ConvertError::IllegalArgument {
            message: message.into(),
        }
    }

    pub(crate) fn invalid(tag: RepresentationTag, message: impl ToString) -> Self {
        ConvertError::InvalidData {
            tag,
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err: ConvertError = io_err.into();
        assert!(matches!(err, ConvertError::Io(_)));
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_display() {
        let err = ConvertError::NoMatchingConverter {
            observed: "Vec<u8>",
            src_string_type: Some(RepresentationTag::Base64Text),
        };
        let s = err.to_string();
        assert!(s.contains("Vec<u8>"));
        assert!(s.contains("Base64Text"));

        let err = ConvertError::RepresentationUnavailable {
            tag: RepresentationTag::OpaqueBlob,
        };
        assert_eq!(err.to_string(), "opaque-blob is not supported in this runtime");
    }

    #[test]
    fn test_kind_classification() {
        let err = ConvertError::OverlappingModifications {
            first: 0..4,
            second: 2..6,
        };
        assert_eq!(err.kind(), ErrorKind::IllegalArgument);
        assert_eq!(
            ConvertError::SizeUnavailable {
                tag: RepresentationTag::PushStream
            }
            .kind(),
            ErrorKind::SizeUnavailable
        );
    }
}
