//! binconv
//!
//! Conversion between in-memory representations of binary data.
//!
//! `binconv` moves bytes between strings (plain text, base64, hex, raw-byte
//! text, URLs), shared buffers, byte arrays, opaque blobs and async streams.
//! Any representation converts to any other, and every conversion can be
//! restricted to a byte range. It is designed for:
//!
//! - decoding and re-encoding payloads without caring what form they arrive in
//! - reading a slice of a large value without materializing the rest
//! - joining chunks of the same representation
//! - streaming a value into a writer, a sink or a file
//!
//! The crate intentionally:
//! - does NOT sniff strings: a string is plain text unless told otherwise
//! - does NOT keep global state: every operation goes through a [`Registry`]
//! - does NOT spawn tasks: streams do work only when polled
//!
//! Streams stop reading from their source as soon as a range is complete,
//! and dropping any stream cancels it.
//!
//! # Convert
//!
//! ```
//! use binconv::{ConvertOptions, Data, Registry, RepresentationTag};
//!
//! # tokio_test::block_on(async {
//! let registry = Registry::new();
//!
//! let hex = registry
//!     .convert(RepresentationTag::HexText, Data::text("hi"), &ConvertOptions::new())
//!     .await?;
//! assert_eq!(hex.as_str(), Some("6869"));
//!
//! let options = ConvertOptions::new()
//!     .with_src_string_type(RepresentationTag::Base64Text)
//!     .with_range(1, 2);
//! let bytes = registry
//!     .convert(RepresentationTag::MutableByteArray, Data::text("YWJjZA=="), &options)
//!     .await?;
//! assert_eq!(bytes.as_bytes(), Some(&b"bc"[..]));
//! # Ok::<(), binconv::ConvertError>(())
//! # }).unwrap();
//! ```
//!
//! # Stream
//!
//! ```
//! use binconv::{ConvertOptions, Data, Registry, RepresentationTag};
//! use futures_util::TryStreamExt;
//!
//! # tokio_test::block_on(async {
//! let registry = Registry::new();
//! let options = ConvertOptions::new().with_buffer_size(4);
//! let stream = registry
//!     .convert(RepresentationTag::PushStream, Data::text("hello world"), &options)
//!     .await?
//!     .into_push()
//!     .unwrap();
//!
//! let chunks: Vec<bytes::Bytes> = stream.try_collect().await?;
//! assert_eq!(chunks.len(), 3);
//! # Ok::<(), binconv::ConvertError>(())
//! # }).unwrap();
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod buffer; // internal (thread-local reuse)
mod capability;
mod codec;
mod config;
pub mod converter;
mod data;
mod error;
mod fs; // internal file access
#[cfg(feature = "hash-blake3")]
mod hash;
pub mod merge;
mod overlay;
pub mod range;
mod registry;
pub mod stream;
mod util;

//
// Public surface
//

pub use capability::Capabilities;
pub use codec::{Charset, CharsetExtension, StandardCodec, TextCodec, default_codec};
pub use config::{BASE64_ALIGNMENT, ConvertOptions, DEFAULT_BUFFER_SIZE, UrlKind};
pub use converter::Converter;
pub use data::{Blob, BlobSource, Data, PullStream, PushStream, RepresentationTag};
pub use error::{ConvertError, ErrorKind, Result};
pub use overlay::{Modification, OverlayStream};
pub use range::{Overlap, RangeStream, Window};
pub use registry::{Destination, Registry, RegistryBuilder};

#[cfg(feature = "extended-charsets")]
pub use codec::EncodingRsExtension;

#[cfg(feature = "hash-blake3")]
pub use hash::{Blake3Hasher, ContentHash, content_hash};
