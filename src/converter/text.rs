use async_trait::async_trait;

use super::{Converter, into_string, mismatch, strings, windowed_len};
use crate::config::ConvertOptions;
use crate::data::{Data, RepresentationTag};
use crate::error::Result;
use crate::merge::concat_str;
use crate::registry::Registry;
use crate::util::clip_vec;

/// Plain text.
///
/// Byte offsets refer to the text encoded with `text_to_buffer_charset`;
/// a ranged read decodes the selected bytes with `buffer_to_text_charset`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextConverter;

#[async_trait]
impl Converter for TextConverter {
    fn tag(&self) -> RepresentationTag {
        RepresentationTag::Text
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
        let text = if self.matches(&value, options) {
            self.to_text(reg, value, options).await?
        } else {
            let source = reg.converter_matching(&value, options)?;
            source.to_text(reg, value, options).await?
        };
        Ok(Data::Str(text))
    }

    async fn merge_chunks(
        &self,
        _reg: &Registry,
        chunks: Vec<Data>,
        options: &ConvertOptions,
    ) -> Result<Data> {
        Ok(Data::Str(concat_str(&strings(chunks, options)?)))
    }

    fn size(&self, reg: &Registry, value: &Data, options: &ConvertOptions) -> Result<u64> {
        let Data::Str(text) = value else {
            return Err(mismatch(value, options));
        };
        let total = reg
            .codec()
            .encoded_len(text, options.text_to_buffer_charset())?;
        Ok(windowed_len(total, options))
    }

    async fn to_byte_array(
        &self,
        reg: &Registry,
        value: Data,
        options: &ConvertOptions,
    ) -> Result<Vec<u8>> {
        let text = into_string(value, options)?;
        let bytes = reg
            .codec()
            .encode_owned(text, options.text_to_buffer_charset())?;
        Ok(clip_vec(bytes, options.window()))
    }

    async fn to_text(&self, reg: &Registry, value: Data, options: &ConvertOptions) -> Result<String> {
        match value {
            Data::Str(text) if !options.has_range() => Ok(text),
            other => {
                let bytes = self.to_byte_array(reg, other, options).await?;
                reg.codec()
                    .decode_owned(bytes, options.buffer_to_text_charset())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_text_passthrough_and_range() {
        let reg = Registry::new();
        let opts = ConvertOptions::new();
        let out = TextConverter
            .convert(&reg, Data::text("héllo"), &opts)
            .await
            .unwrap();
        assert_eq!(out.as_str(), Some("héllo"));

        // "é" is two bytes in utf8, so [3, 6) is "llo"
        let opts = ConvertOptions::new().with_start(3);
        let out = TextConverter
            .convert(&reg, Data::text("héllo"), &opts)
            .await
            .unwrap();
        assert_eq!(out.as_str(), Some("llo"));
    }

    #[test]
    fn test_text_size_uses_encoding() {
        let reg = Registry::new();
        let value = Data::text("hé");
        assert_eq!(TextConverter.size(&reg, &value, &ConvertOptions::new()).unwrap(), 3);
        let utf16 = ConvertOptions::new().with_text_to_buffer_charset("utf16le");
        assert_eq!(TextConverter.size(&reg, &value, &utf16).unwrap(), 4);
    }

    #[test]
    fn test_text_does_not_match_other_string_types() {
        let opts = ConvertOptions::new().with_src_string_type(RepresentationTag::HexText);
        assert!(!TextConverter.matches(&Data::text("00"), &opts));
        assert!(TextConverter.matches(&Data::text("00"), &ConvertOptions::new()));
    }
}
