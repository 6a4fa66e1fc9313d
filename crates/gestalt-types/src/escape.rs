//! Escaping codec for feature-file fields.
//!
//! bulk_extractor writes non-printable bytes with octal escapes (`\012`);
//! re-processed files may carry hex escapes (`\x0a`). Raw bytes that were
//! never escaped, including bytes >= 0x80, are passed through as they are.
//!
//! Decoding notes:
//! - `\'` stays the two bytes `\` `'`. The extractor uses single quotes as
//!   delimiters internally and leaves this pair escaped in its output.
//! - A backslash followed by a character with no escape meaning is kept
//!   verbatim together with that character.
//! - Octal escapes take one to three digits and must not exceed 0o377.

use gestalt_error::{GestaltError, Result};

/// Decode an escaped feature-file field into raw bytes.
pub fn unescape(input: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(input.len());
    let mut pos = 0;

    while pos < input.len() {
        let byte = input[pos];
        if byte != b'\\' {
            out.push(byte);
            pos += 1;
            continue;
        }

        let Some(&selector) = input.get(pos + 1) else {
            return Err(GestaltError::decode(pos, "trailing backslash"));
        };
        match selector {
            b'0'..=b'7' => {
                let digits = input[pos + 1..]
                    .iter()
                    .take(3)
                    .take_while(|b| (b'0'..=b'7').contains(*b))
                    .count();
                let value = input[pos + 1..pos + 1 + digits]
                    .iter()
                    .fold(0_u32, |acc, d| acc * 8 + u32::from(d - b'0'));
                let value = u8::try_from(value).map_err(|_| {
                    GestaltError::decode(pos, format!("octal escape out of range: {value:#o}"))
                })?;
                out.push(value);
                pos += 1 + digits;
            }
            b'x' => {
                let hex = input
                    .get(pos + 2..pos + 4)
                    .filter(|pair| pair.iter().all(u8::is_ascii_hexdigit))
                    .ok_or_else(|| GestaltError::decode(pos, "truncated \\x escape"))?;
                out.push((hex_value(hex[0]) << 4) | hex_value(hex[1]));
                pos += 4;
            }
            b'\'' => {
                out.extend_from_slice(b"\\'");
                pos += 2;
            }
            b'\n' => pos += 2,
            other => {
                match simple_escape(other) {
                    Some(decoded) => out.push(decoded),
                    None => out.extend_from_slice(&[b'\\', other]),
                }
                pos += 2;
            }
        }
    }

    Ok(out)
}

fn simple_escape(selector: u8) -> Option<u8> {
    let decoded = match selector {
        b'\\' => b'\\',
        b'"' => b'"',
        b'a' => 0x07,
        b'b' => 0x08,
        b'f' => 0x0c,
        b'n' => b'\n',
        b'r' => b'\r',
        b't' => b'\t',
        b'v' => 0x0b,
        _ => return None,
    };
    Some(decoded)
}

const fn hex_value(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        _ => digit - b'A' + 10,
    }
}

/// Whether a byte is written to output as-is.
///
/// Printable ASCII passes through, except whitespace other than the space
/// character and the backslash (which would otherwise read back as an
/// escape introducer).
#[must_use]
pub const fn passes_through(byte: u8) -> bool {
    byte == b' ' || (byte.is_ascii_graphic() && byte != b'\\')
}

/// Render raw bytes for a feature-file field, hex-escaping everything that
/// does not [pass through](passes_through).
#[must_use]
pub fn escape_for_output(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len());
    for &byte in bytes {
        if passes_through(byte) {
            out.push(char::from(byte));
        } else {
            out.push_str("\\x");
            out.push(char::from(HEX[usize::from(byte >> 4)]));
            out.push(char::from(HEX[usize::from(byte & 0x0f)]));
        }
    }
    out
}
