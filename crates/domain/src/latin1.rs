//! ISO-8859-1 (Latin-1) conversions.
//!
//! Header values are bytes on the wire. Decoding them one byte per `char`
//! never fails and never loses information, so a value can always be
//! re-encoded to the exact bytes it came from.

/// Decode bytes as ISO-8859-1.
#[must_use]
pub fn decode(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Encode text as ISO-8859-1.
///
/// Returns `None` if any character is above `U+00FF`.
#[must_use]
pub fn encode(text: &str) -> Option<Vec<u8>> {
    text.chars().map(|c| u8::try_from(u32::from(c)).ok()).collect()
}
