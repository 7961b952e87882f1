use std::io;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use bytes::Bytes;
use futures_util::StreamExt;

use super::{Converter, into_string, mismatch, strings, windowed_len};
use crate::config::ConvertOptions;
use crate::data::{Data, PushStream, RepresentationTag};
use crate::error::{ConvertError, Result};
use crate::merge::{concat_bytes, concat_str};
use crate::range::{self, Window};
use crate::registry::Registry;
use crate::util::clip_vec;

const TAG: RepresentationTag = RepresentationTag::Base64Text;

/// Standard base64 text with padding.
///
/// Ranges are in decoded bytes. Only the 4-character groups covering the
/// range are decoded.
#[derive(Debug, Default, Clone, Copy)]
pub struct Base64Converter;

/// Decoded length of a padded base64 string, computed without decoding.
pub(crate) fn decoded_len(encoded: &str) -> Result<u64> {
    if encoded.len() % 4 != 0 {
        return Err(ConvertError::invalid(
            TAG,
            format!("length {} is not a multiple of 4", encoded.len()),
        ));
    }
    let padding = encoded
        .as_bytes()
        .iter()
        .rev()
        .take(2)
        .take_while(|b| **b == b'=')
        .count();
    Ok((encoded.len() / 4 * 3 - padding) as u64)
}

/// Character span of the groups that decode to `bytes`.
///
/// The span must be ASCII, so any sub-slice of it is a valid `str` slice.
fn group_span(encoded: &str, bytes: &std::ops::Range<u64>) -> Result<(usize, usize, u64)> {
    let first_group = bytes.start / 3;
    let last_group = bytes.end.div_ceil(3);
    let from = (first_group * 4) as usize;
    let to = ((last_group * 4) as usize).min(encoded.len());
    if !encoded.as_bytes().get(from..to).is_some_and(<[u8]>::is_ascii) {
        return Err(ConvertError::invalid(TAG, "non-ASCII character"));
    }
    Ok((from, to, bytes.start - first_group * 3))
}

fn decode_window(encoded: &str, window: Window) -> Result<Vec<u8>> {
    let r = window.clip(decoded_len(encoded)?);
    if r.is_empty() {
        return Ok(Vec::new());
    }
    let (from, to, skip) = group_span(encoded, &r)?;
    let decoded = BASE64
        .decode(&encoded[from..to])
        .map_err(|e| ConvertError::invalid(TAG, e))?;
    Ok(clip_vec(decoded, Window::new(skip, Some(r.end - r.start))))
}

/// Streams the decoded bytes of `encoded` inside `window`.
///
/// Each chunk decodes `buffer_size / 3 * 4` characters, so with a buffer
/// size that is a multiple of 6 every chunk is exactly `buffer_size` bytes.
pub(crate) fn decode_stream(encoded: String, window: Window, buffer_size: usize) -> Result<PushStream> {
    let r = window.clip(decoded_len(&encoded)?);
    if r.is_empty() {
        return Ok(futures_util::stream::empty().boxed());
    }
    let (from, to, skip) = group_span(&encoded, &r)?;
    let step = (buffer_size / 3).max(1) * 4;

    let chunks = futures_util::stream::unfold((encoded, from), move |(encoded, pos)| async move {
        if pos >= to {
            return None;
        }
        let end = (pos + step).min(to);
        let item = BASE64
            .decode(&encoded[pos..end])
            .map(Bytes::from)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e));
        Some((item, (encoded, end)))
    });

    Ok(range::limit(
        chunks.boxed(),
        Window::new(skip, Some(r.end - r.start)),
    ))
}

#[async_trait]
impl Converter for Base64Converter {
    fn tag(&self) -> RepresentationTag {
        TAG
    }

    fn empty(&self) -> Data {
        Data::Str(String::new())
    }

    fn is(&self, value: &Data) -> bool {
        matches!(value, Data::Str(_))
    }

    async fn convert_data(
        &self,
        reg: &Registry,
        value: Data,
        options: &ConvertOptions,
    ) -> Result<Data> {
        if self.matches(&value, options) {
            return Ok(Data::Str(self.to_base64(reg, value, options).await?));
        }
        let source = reg.converter_matching(&value, options)?;
        Ok(Data::Str(source.to_base64(reg, value, options).await?))
    }

    async fn merge_chunks(
        &self,
        _reg: &Registry,
        chunks: Vec<Data>,
        options: &ConvertOptions,
    ) -> Result<Data> {
        let chunks = strings(chunks, options)?;
        // Padding may only appear at the very end of the merged text.
        let aligned = match chunks.split_last() {
            Some((last, init)) => {
                last.len() % 4 == 0
                    && init.iter().all(|c| c.len() % 4 == 0 && !c.ends_with('='))
            }
            None => true,
        };
        if aligned {
            return Ok(Data::Str(concat_str(&chunks)));
        }

        let decoded = chunks
            .iter()
            .map(|c| decode_window(c, Window::unbounded()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Data::Str(BASE64.encode(concat_bytes(&decoded))))
    }

    fn size(&self, _reg: &Registry, value: &Data, options: &ConvertOptions) -> Result<u64> {
        let Data::Str(encoded) = value else {
            return Err(mismatch(value, options));
        };
        Ok(windowed_len(decoded_len(encoded)?, options))
    }

    async fn to_byte_array(
        &self,
        _reg: &Registry,
        value: Data,
        options: &ConvertOptions,
    ) -> Result<Vec<u8>> {
        let encoded = into_string(value, options)?;
        decode_window(&encoded, options.window())
    }

    async fn to_base64(
        &self,
        reg: &Registry,
        value: Data,
        options: &ConvertOptions,
    ) -> Result<String> {
        match value {
            Data::Str(encoded) if !options.has_range() => {
                decoded_len(&encoded)?;
                Ok(encoded)
            }
            other => Ok(BASE64.encode(self.to_byte_array(reg, other, options).await?)),
        }
    }
}
