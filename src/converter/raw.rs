use async_trait::async_trait;

use super::{Converter, into_string, mismatch, strings, windowed_len};
use crate::config::ConvertOptions;
use crate::data::{Data, RepresentationTag};
use crate::error::{ConvertError, Result};
use crate::merge::concat_str;
use crate::registry::Registry;

/// Text where each character carries one byte in its low eight bits.
#[derive(Debug, Default, Clone, Copy)]
pub struct RawByteTextConverter;

fn window_chars<'a>(text: &'a str, options: &ConvertOptions) -> impl Iterator<Item = char> + 'a {
    let window = options.window();
    text.chars()
        .skip(window.start() as usize)
        .take(window.length().map_or(usize::MAX, |len| len as usize))
}

#[async_trait]
impl Converter for RawByteTextConverter {
    fn tag(&self) -> RepresentationTag {
        RepresentationTag::RawByteText
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
            return match value {
                Data::Str(text) if !options.has_range() => Ok(Data::Str(text)),
                Data::Str(text) => Ok(Data::Str(window_chars(&text, options).collect())),
                other => Err(mismatch(&other, options)),
            };
        }
        let source = reg.converter_matching(&value, options)?;
        let bytes = source.to_byte_array(reg, value, options).await?;
        Ok(Data::Str(bytes.into_iter().map(char::from).collect()))
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
        let Data::Str(text) = value else {
            return Err(mismatch(value, options));
        };
        Ok(windowed_len(text.chars().count() as u64, options))
    }

    async fn to_byte_array(
        &self,
        _reg: &Registry,
        value: Data,
        options: &ConvertOptions,
    ) -> Result<Vec<u8>> {
        let text = into_string(value, options)?;
        window_chars(&text, options)
            .map(|c| {
                u8::try_from(c).map_err(|_| {
                    ConvertError::invalid(
                        RepresentationTag::RawByteText,
                        format!("character U+{:04X} does not fit in a byte", u32::from(c)),
                    )
                })
            })
            .collect()
    }
}
