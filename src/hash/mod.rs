//! Content hashing of any representation.
//!
//! [`content_hash`] streams a value through BLAKE3 without materializing it,
//! so two values with equal bytes hash equally whatever their
//! representation. Requires the `hash-blake3` feature.

mod blake3;

use std::fmt;
use std::str::FromStr;

use futures_util::TryStreamExt;

pub use self::blake3::Blake3Hasher;

use crate::config::ConvertOptions;
use crate::converter::push;
use crate::data::{Data, RepresentationTag};
use crate::error::{ConvertError, Result};
use crate::registry::Registry;

/// A 32-byte BLAKE3 digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Digest length in bytes.
    pub const SIZE: usize = 32;

    /// Wraps raw digest bytes.
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex form.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parses the hex form. Returns `None` unless it is 64 hex digits.
    pub fn from_hex(digits: &str) -> Option<Self> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(digits, &mut bytes).ok()?;
        Some(Self(bytes))
    }
}

impl AsRef<[u8]> for ContentHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for ContentHash {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s).ok_or_else(|| {
            ConvertError::invalid(RepresentationTag::HexText, "expected 64 hex digits")
        })
    }
}

/// Hashes the bytes of `value` inside the options' range.
pub async fn content_hash(
    reg: &Registry,
    value: Data,
    options: &ConvertOptions,
) -> Result<ContentHash> {
    options.validate()?;
    let stream = push::stream_of(reg, value, options).await?;
    let hasher = stream
        .try_fold(Blake3Hasher::new(), |mut hasher, chunk| async move {
            hasher.update(&chunk);
            Ok(hasher)
        })
        .await?;
    Ok(hasher.finalize())
}
