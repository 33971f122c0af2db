//! Human-readable byte amounts.

use crate::error::{Error, Result};

const SUFFIXES: &[u8] = b"bkmgtp";

/// Convert a byte amount such as `"500k"` or `"2.5M"` to a number of bytes.
///
/// An optional trailing suffix out of `b`, `k`, `m`, `g`, `t` or `p`
/// (case-insensitive) scales the value by the matching power of 1024. The
/// numeric part may be fractional; the result is rounded to the nearest byte.
///
/// # Example
///
/// ```rust
/// use steady::utils::parse_bytes;
///
/// assert_eq!(parse_bytes("2.5M").unwrap(), 2_621_440);
/// assert_eq!(parse_bytes("100").unwrap(), 100);
/// assert!(parse_bytes("ten").is_err());
/// ```
pub fn parse_bytes(value: &str) -> Result<u64> {
    let invalid = || Error::InvalidByteSize(value.to_string());
    let trimmed = value.trim();
    let last = trimmed
        .bytes()
        .last()
        .ok_or_else(invalid)?
        .to_ascii_lowercase();

    let (number, multiplier) = match SUFFIXES.iter().position(|s| *s == last) {
        Some(power) => (&trimmed[..trimmed.len() - 1], 1024f64.powi(power as i32)),
        None => (trimmed, 1.0),
    };

    let amount = number.trim().parse::<f64>().map_err(|_| invalid())?;
    let bytes = (amount * multiplier).round();
    if !bytes.is_finite() || bytes < 0.0 {
        return Err(invalid());
    }
    Ok(bytes as u64)
}
