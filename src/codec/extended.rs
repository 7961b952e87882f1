//! Charsets resolved through `encoding_rs`.

use encoding_rs::Encoding;

use super::CharsetExtension;

/// Resolves any WHATWG encoding label (latin1, shift_jis, windows-1252, ...).
#[derive(Debug, Default, Clone, Copy)]
pub struct EncodingRsExtension;

impl CharsetExtension for EncodingRsExtension {
    fn supports(&self, label: &str) -> bool {
        Encoding::for_label(label.as_bytes()).is_some()
    }

    fn encode(&self, label: &str, text: &str) -> Option<Vec<u8>> {
        let encoding = Encoding::for_label(label.as_bytes())?;
        let (bytes, _, _) = encoding.encode(text);
        Some(bytes.into_owned())
    }

    fn decode(&self, label: &str, bytes: &[u8]) -> Option<String> {
        let encoding = Encoding::for_label(label.as_bytes())?;
        let (text, _) = encoding.decode_without_bom_handling(bytes);
        Some(text.into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latin1() {
        let ext = EncodingRsExtension;
        assert!(ext.supports("latin1"));
        assert_eq!(ext.encode("latin1", "é").unwrap(), vec![0xE9]);
        assert_eq!(ext.decode("latin1", &[0xE9]).unwrap(), "é");
    }

    #[test]
    fn test_unknown_label() {
        assert!(!EncodingRsExtension.supports("klingon"));
        assert!(EncodingRsExtension.encode("klingon", "x").is_none());
    }
}
