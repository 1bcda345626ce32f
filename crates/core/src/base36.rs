//! Compact base-36 ids used throughout the diff wire format.
//!
//! Every diff id, knot key, entry key and delta-op count is written as a
//! lowercase base-36 string. Decoding is case-insensitive and strict: the
//! whole input must be digits, otherwise `None` is returned. `None` is the
//! "not a number" sentinel of the wire format; delta-op readers treat it as
//! a count of 1.

const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Encode a non-negative integer as base-36.
pub fn encode(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut buf = Vec::with_capacity(13);
    while value > 0 {
        buf.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    buf.reverse();
    // Only ASCII digits were pushed.
    buf.into_iter().map(char::from).collect()
}

/// Decode a base-36 string. Empty, non-digit, or overflowing input yields `None`.
pub fn decode(text: &str) -> Option<u64> {
    if text.is_empty() {
        return None;
    }
    text.chars().try_fold(0u64, |acc, ch| {
        let digit = ch.to_digit(36)?;
        acc.checked_mul(36)?.checked_add(u64::from(digit))
    })
}

/// Decode a delta-op count, substituting 1 for anything unparsable.
pub fn decode_count(text: &str) -> usize {
    decode(text)
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(1)
}
