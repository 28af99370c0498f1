//! Ordered text decoding for byte runs recovered from containers.
//!
//! Legacy projects come from Mac and Windows workstations alike, so a
//! candidate path is tried against several single-byte encodings in a fixed
//! order until one yields an acceptable string.

use encoding_rs::{MACINTOSH, WINDOWS_1252};

/// A text encoding tried when decoding candidate paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Latin1,
    MacRoman,
    Windows1252,
}

/// Decode order for structured path candidates.
pub const PATH_ENCODINGS: &[TextEncoding] = &[
    TextEncoding::Utf8,
    TextEncoding::Latin1,
    TextEncoding::MacRoman,
    TextEncoding::Windows1252,
];

/// Decode order for null-delimited segments.
pub const SEGMENT_ENCODINGS: &[TextEncoding] = &[
    TextEncoding::Utf8,
    TextEncoding::Latin1,
    TextEncoding::MacRoman,
];

impl TextEncoding {
    /// Decodes `bytes`, returning `None` when they are malformed for this
    /// encoding.
    pub fn decode(self, bytes: &[u8]) -> Option<String> {
        match self {
            TextEncoding::Utf8 => std::str::from_utf8(bytes).ok().map(str::to_owned),
            // Every byte maps to the code point of the same value.
            TextEncoding::Latin1 => Some(bytes.iter().map(|&b| b as char).collect()),
            TextEncoding::MacRoman => MACINTOSH
                .decode_without_bom_handling_and_without_replacement(bytes)
                .map(|s| s.into_owned()),
            TextEncoding::Windows1252 => WINDOWS_1252
                .decode_without_bom_handling_and_without_replacement(bytes)
                .map(|s| s.into_owned()),
        }
    }
}

/// Returns the first decoding of `bytes` that `accept` maps to a value.
///
/// Encodings that fail to decode, or whose result is rejected, fall through
/// to the next one in `order`.
pub fn decode_first<T>(
    bytes: &[u8],
    order: &[TextEncoding],
    mut accept: impl FnMut(String) -> Option<T>,
) -> Option<T> {
    order
        .iter()
        .filter_map(|encoding| encoding.decode(bytes))
        .find_map(|text| accept(text))
}
