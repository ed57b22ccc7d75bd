//! Header value sniffing.
//!
//! Some producers (Azure Event Hubs' Kafka endpoint among them) write header
//! values in an AMQP-style binary encoding. The first byte selects how the
//! value is shown:
//!
//! - `0xA1`: short string, `bytes[1]` is the length of the text that follows
//! - `0x83`: 64-bit big-endian unsigned integer in `bytes[1..9]`
//! - anything else: the bytes as they are
//!
//! This is a best-effort sniff for that one encoding, not a general binary
//! format detector. Truncated values fall back to the raw bytes and never fail.

const SHORT_STRING: u8 = 0xA1;
const UNSIGNED_LONG: u8 = 0x83;

/// Render a header value for display.
///
/// Bytes that are not one of the tagged encodings are returned unchanged,
/// including invalid UTF-8.
pub fn decode_header_value(value: &[u8]) -> Vec<u8> {
    let sniffed = match value.first() {
        Some(&SHORT_STRING) => short_string(value),
        Some(&UNSIGNED_LONG) => unsigned_long(value),
        _ => None,
    };
    sniffed.unwrap_or_else(|| value.to_vec())
}

fn short_string(value: &[u8]) -> Option<Vec<u8>> {
    let len = usize::from(*value.get(1)?);
    value.get(2..2 + len).map(<[u8]>::to_vec)
}

fn unsigned_long(value: &[u8]) -> Option<Vec<u8>> {
    let bytes: [u8; 8] = value.get(1..9)?.try_into().ok()?;
    Some(u64::from_be_bytes(bytes).to_string().into_bytes())
}
