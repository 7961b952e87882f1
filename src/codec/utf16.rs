//! Manual UTF-16LE transcoding, two bytes per code unit.

/// Encodes `text` as UTF-16LE.
pub(crate) fn encode(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() * 2);
    for unit in text.encode_utf16() {
        out.extend_from_slice(&unit.to_le_bytes());
    }
    out
}

/// Byte length of `text` encoded as UTF-16LE.
pub(crate) fn encoded_len(text: &str) -> u64 {
    text.encode_utf16().count() as u64 * 2
}

/// Decodes UTF-16LE, ignoring a trailing odd byte and replacing unpaired
/// surrogates.
pub(crate) fn decode(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}
