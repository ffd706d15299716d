//! Hex byte strings as typed on the command line or stored in captures.

use std::fmt::Write as _;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum HexError {
    #[error("invalid hex digit '{0}'")]
    InvalidDigit(char),
    #[error("odd number of hex digits")]
    OddLength,
}

/// Parses bytes written as hex pairs. Whitespace, commas, colons and `0x`
/// prefixes are ignored, so "20 00 0a", "20000a" and "0x20,0x00,0x0a" all
/// give the same bytes.
pub(crate) fn parse_hex(input: &str) -> Result<Vec<u8>, HexError> {
    let mut digits = Vec::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if c.is_whitespace() || c == ',' || c == ':' {
            continue;
        }
        if c == '0' && matches!(chars.peek(), Some('x' | 'X')) {
            chars.next();
            continue;
        }
        let value = c.to_digit(16).ok_or(HexError::InvalidDigit(c))?;
        digits.push(value as u8);
    }
    if digits.len() % 2 != 0 {
        return Err(HexError::OddLength);
    }
    Ok(digits
        .chunks_exact(2)
        .map(|pair| (pair[0] << 4) | pair[1])
        .collect())
}

pub(crate) fn format_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for (i, byte) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{byte:02x}");
    }
    out
}
