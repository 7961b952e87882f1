//! Text codec provider.
//!
//! Encodes text to bytes and back. `utf8` and `utf16le` are always
//! available; other charsets go through an optional [`CharsetExtension`]
//! (the `extended-charsets` feature installs one backed by `encoding_rs`).
//!
//! The provider is chosen once per process by [`default_codec`] and has no
//! per-call state.

#[cfg(feature = "extended-charsets")]
mod extended;
mod utf16;

use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use tracing::debug;

use crate::error::{ConvertError, Result};

#[cfg(feature = "extended-charsets")]
pub use extended::EncodingRsExtension;

/// A charset identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "String", into = "String")
)]
pub enum Charset {
    /// UTF-8.
    Utf8,
    /// UTF-16 little endian.
    Utf16Le,
    /// Any other label, resolved by the codec's extension.
    Other(String),
}

impl Charset {
    /// Parses a label; `utf-8`/`utf8` and `utf-16le`/`utf16le`/`ucs2` are
    /// recognized case-insensitively.
    pub fn from_label(label: &str) -> Self {
        let lower = label.trim().to_ascii_lowercase();
        match lower.as_str() {
            "utf8" | "utf-8" => Charset::Utf8,
            "utf16le" | "utf-16le" | "ucs2" | "ucs-2" => Charset::Utf16Le,
            _ => Charset::Other(lower),
        }
    }

    /// Canonical label.
    pub fn label(&self) -> &str {
        match self {
            Charset::Utf8 => "utf8",
            Charset::Utf16Le => "utf16le",
            Charset::Other(label) => label,
        }
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<&str> for Charset {
    fn from(label: &str) -> Self {
        Charset::from_label(label)
    }
}

impl From<String> for Charset {
    fn from(label: String) -> Self {
        Charset::from_label(&label)
    }
}

impl From<Charset> for String {
    fn from(charset: Charset) -> Self {
        charset.label().to_string()
    }
}

/// Additional charsets beyond the built-in ones.
pub trait CharsetExtension: Send + Sync + fmt::Debug {
    /// Returns true if `label` can be handled.
    fn supports(&self, label: &str) -> bool;

    /// Encodes `text`, `None` if the label is unknown.
    fn encode(&self, label: &str, text: &str) -> Option<Vec<u8>>;

    /// Decodes `bytes`, `None` if the label is unknown.
    fn decode(&self, label: &str, bytes: &[u8]) -> Option<String>;
}

/// Encode/decode between text and bytes.
pub trait TextCodec: Send + Sync + fmt::Debug {
    /// Encodes `text` in `charset`.
    fn encode(&self, text: &str, charset: &Charset) -> Result<Vec<u8>>;

    /// Decodes `bytes` from `charset`. Invalid sequences are replaced.
    fn decode(&self, bytes: &[u8], charset: &Charset) -> Result<String>;

    /// Encodes an owned string, reusing its allocation when possible.
    fn encode_owned(&self, text: String, charset: &Charset) -> Result<Vec<u8>> {
        self.encode(&text, charset)
    }

    /// Decodes an owned buffer, reusing its allocation when possible.
    fn decode_owned(&self, bytes: Vec<u8>, charset: &Charset) -> Result<String> {
        self.decode(&bytes, charset)
    }

    /// Byte length of `text` once encoded.
    fn encoded_len(&self, text: &str, charset: &Charset) -> Result<u64> {
        Ok(self.encode(text, charset)?.len() as u64)
    }
}

/// Built-in codec with an optional extension.
#[derive(Debug, Clone, Default)]
pub struct StandardCodec {
    extension: Option<Arc<dyn CharsetExtension>>,
}

impl StandardCodec {
    /// Codec with the built-in charsets only.
    pub fn new() -> Self {
        Self { extension: None }
    }

    /// Codec that falls back to `extension` for other charsets.
    pub fn with_extension(extension: Arc<dyn CharsetExtension>) -> Self {
        Self {
            extension: Some(extension),
        }
    }

    fn unsupported(charset: &Charset) -> ConvertError {
        ConvertError::UnsupportedEncoding {
            charset: charset.label().to_string(),
        }
    }
}

impl TextCodec for StandardCodec {
    fn encode(&self, text: &str, charset: &Charset) -> Result<Vec<u8>> {
        match charset {
            Charset::Utf8 => Ok(text.as_bytes().to_vec()),
            Charset::Utf16Le => Ok(utf16::encode(text)),
            Charset::Other(label) => self
                .extension
                .as_ref()
                .and_then(|ext| ext.encode(label, text))
                .ok_or_else(|| Self::unsupported(charset)),
        }
    }

    fn decode(&self, bytes: &[u8], charset: &Charset) -> Result<String> {
        match charset {
            Charset::Utf8 => Ok(String::from_utf8_lossy(bytes).into_owned()),
            Charset::Utf16Le => Ok(utf16::decode(bytes)),
            Charset::Other(label) => self
                .extension
                .as_ref()
                .and_then(|ext| ext.decode(label, bytes))
                .ok_or_else(|| Self::unsupported(charset)),
        }
    }

    fn encode_owned(&self, text: String, charset: &Charset) -> Result<Vec<u8>> {
        match charset {
            Charset::Utf8 => Ok(text.into_bytes()),
            _ => self.encode(&text, charset),
        }
    }

    fn decode_owned(&self, bytes: Vec<u8>, charset: &Charset) -> Result<String> {
        match charset {
            Charset::Utf8 => Ok(String::from_utf8(bytes)
                .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())),
            _ => self.decode(&bytes, charset),
        }
    }

    fn encoded_len(&self, text: &str, charset: &Charset) -> Result<u64> {
        match charset {
            Charset::Utf8 => Ok(text.len() as u64),
            Charset::Utf16Le => Ok(utf16::encoded_len(text)),
            Charset::Other(_) => Ok(self.encode(text, charset)?.len() as u64),
        }
    }
}

static DEFAULT_CODEC: Lazy<Arc<dyn TextCodec>> = Lazy::new(|| {
    #[cfg(feature = "extended-charsets")]
    {
        debug!("text codec: built-in charsets + encoding_rs");
        Arc::new(StandardCodec::with_extension(Arc::new(EncodingRsExtension)))
    }
    #[cfg(not(feature = "extended-charsets"))]
    {
        debug!("text codec: built-in charsets only");
        Arc::new(StandardCodec::new())
    }
});

/// The process-wide codec, selected on first use.
pub fn default_codec() -> Arc<dyn TextCodec> {
    Arc::clone(&DEFAULT_CODEC)
}
