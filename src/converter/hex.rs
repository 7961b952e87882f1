use async_trait::async_trait;

use super::{Converter, into_string, mismatch, strings, windowed_len};
use crate::config::ConvertOptions;
use crate::data::{Data, RepresentationTag};
use crate::error::{ConvertError, Result};
use crate::merge::concat_str;
use crate::range::Window;
use crate::registry::Registry;

const TAG: RepresentationTag = RepresentationTag::HexText;

/// Hexadecimal text, two characters per byte.
#[derive(Debug, Default, Clone, Copy)]
pub struct HexConverter;

fn decoded_len(encoded: &str) -> Result<u64> {
    if encoded.len() % 2 != 0 {
        return Err(ConvertError::invalid(TAG, "odd number of digits"));
    }
    Ok((encoded.len() / 2) as u64)
}

/// The digits encoding the bytes inside `window`, validated.
fn digits(encoded: &str, window: Window) -> Result<&str> {
    let r = window.clip(decoded_len(encoded)?);
    let selected = encoded
        .get((r.start * 2) as usize..(r.end * 2) as usize)
        .ok_or_else(|| ConvertError::invalid(TAG, "non-ASCII character"))?;
    if let Some(bad) = selected.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(ConvertError::invalid(TAG, format!("invalid digit {bad:?}")));
    }
    Ok(selected)
}

#[async_trait]
impl Converter for HexConverter {
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
            let encoded = into_string(value, options)?;
            if !options.has_range() {
                return Ok(Data::Str(encoded));
            }
            return Ok(Data::Str(digits(&encoded, options.window())?.to_string()));
        }
        let source = reg.converter_matching(&value, options)?;
        let bytes = source.to_byte_array(reg, value, options).await?;
        Ok(Data::Str(hex::encode(bytes)))
    }

    async fn merge_chunks(
        &self,
        _reg: &Registry,
        chunks: Vec<Data>,
        options: &ConvertOptions,
    ) -> Result<Data> {
        Ok(Data::Str(concat_str(&strings(chunks, options)?)))
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
        hex::decode(digits(&encoded, options.window())?).map_err(|e| ConvertError::invalid(TAG, e))
    }
}
