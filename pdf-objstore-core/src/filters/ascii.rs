//! ASCIIHexDecode and ASCII85Decode codecs

use super::{FilterEncoder, FilterType, StreamFilter};
use crate::error::{PdfError, Result};
use crate::objects::Dictionary;

#[derive(Debug, Clone, Copy, Default)]
pub struct AsciiHexFilter;

#[derive(Debug, Clone, Copy, Default)]
pub struct Ascii85Filter;

struct AsciiHexEncoder;

impl FilterEncoder for AsciiHexEncoder {
    fn encode(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<()> {
        const DIGITS: &[u8; 16] = b"0123456789ABCDEF";
        out.reserve(input.len() * 2);
        for &byte in input {
            out.push(DIGITS[(byte >> 4) as usize]);
            out.push(DIGITS[(byte & 0x0F) as usize]);
        }
        Ok(())
    }

    fn finish(&mut self, out: &mut Vec<u8>) -> Result<()> {
        out.push(b'>');
        Ok(())
    }
}

impl StreamFilter for AsciiHexFilter {
    fn filter_type(&self) -> FilterType {
        FilterType::ASCIIHexDecode
    }

    fn encoder(&self, _params: Option<&Dictionary>) -> Result<Box<dyn FilterEncoder>> {
        Ok(Box::new(AsciiHexEncoder))
    }

    fn decode(&self, data: &[u8], _params: Option<&Dictionary>) -> Result<Vec<u8>> {
        decode_ascii_hex(data)
    }
}

/// Decode ASCIIHexDecode data
fn decode_ascii_hex(data: &[u8]) -> Result<Vec<u8>> {
    let mut result = Vec::new();
    let mut high: Option<u8> = None;

    for &ch in data.iter().filter(|b| !b.is_ascii_whitespace()) {
        if ch == b'>' {
            break;
        }
        let value = hex_digit_value(ch).ok_or_else(|| {
            PdfError::FilterError(format!("Invalid hex digit: {}", ch as char))
        })?;
        match high.take() {
            Some(h) => result.push((h << 4) | value),
            None => high = Some(value),
        }
    }

    // Odd number of digits, pad with 0
    if let Some(h) = high {
        result.push(h << 4);
    }

    Ok(result)
}

/// Get value of hex digit
fn hex_digit_value(ch: u8) -> Option<u8> {
    match ch {
        b'0'..=b'9' => Some(ch - b'0'),
        b'A'..=b'F' => Some(ch - b'A' + 10),
        b'a'..=b'f' => Some(ch - b'a' + 10),
        _ => None,
    }
}

/// Buffers up to three bytes between calls so groups never straddle them.
#[derive(Default)]
struct Ascii85Encoder {
    pending: Vec<u8>,
}

fn push_base85(value: u32, count: usize, out: &mut Vec<u8>) {
    let mut digits = [0u8; 5];
    let mut rest = value;
    for digit in digits.iter_mut().rev() {
        *digit = (rest % 85) as u8 + b'!';
        rest /= 85;
    }
    out.extend_from_slice(&digits[..count]);
}

impl FilterEncoder for Ascii85Encoder {
    fn encode(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<()> {
        self.pending.extend_from_slice(input);
        let whole = self.pending.len() / 4 * 4;
        for group in self.pending[..whole].chunks_exact(4) {
            let value = u32::from_be_bytes([group[0], group[1], group[2], group[3]]);
            if value == 0 {
                out.push(b'z');
            } else {
                push_base85(value, 5, out);
            }
        }
        self.pending.drain(..whole);
        Ok(())
    }

    fn finish(&mut self, out: &mut Vec<u8>) -> Result<()> {
        if !self.pending.is_empty() {
            let count = self.pending.len();
            let mut group = [0u8; 4];
            group[..count].copy_from_slice(&self.pending);
            push_base85(u32::from_be_bytes(group), count + 1, out);
            self.pending.clear();
        }
        out.extend_from_slice(b"~>");
        Ok(())
    }
}

impl StreamFilter for Ascii85Filter {
    fn filter_type(&self) -> FilterType {
        FilterType::ASCII85Decode
    }

    fn encoder(&self, _params: Option<&Dictionary>) -> Result<Box<dyn FilterEncoder>> {
        Ok(Box::new(Ascii85Encoder::default()))
    }

    fn decode(&self, data: &[u8], _params: Option<&Dictionary>) -> Result<Vec<u8>> {
        decode_ascii85(data)
    }
}

fn group_value(group: &[u8]) -> Result<u32> {
    let value = group
        .iter()
        .fold(0u64, |acc, &ch| acc * 85 + (ch - b'!') as u64);
    u32::try_from(value)
        .map_err(|_| PdfError::FilterError("ASCII85 group out of range".to_string()))
}

/// Decode ASCII85Decode data
fn decode_ascii85(data: &[u8]) -> Result<Vec<u8>> {
    let mut result = Vec::new();
    let mut chars = data.iter().copied().filter(|b| !b.is_ascii_whitespace()).peekable();
    let mut group = Vec::with_capacity(5);

    // Skip optional <~ prefix
    if chars.peek() == Some(&b'<') {
        chars.next();
        if chars.next() != Some(b'~') {
            return Err(PdfError::FilterError(
                "Invalid ASCII85 start marker".to_string(),
            ));
        }
    }

    while let Some(c) = chars.next() {
        match c {
            b'~' => {
                // Check for end marker ~>
                if chars.next() == Some(b'>') {
                    break;
                }
                return Err(PdfError::FilterError(
                    "Invalid ASCII85 end marker".to_string(),
                ));
            }
            // Special case: 'z' represents four zero bytes
            b'z' if group.is_empty() => result.extend_from_slice(&[0, 0, 0, 0]),
            b'!'..=b'u' => {
                group.push(c);
                if group.len() == 5 {
                    result.extend_from_slice(&group_value(&group)?.to_be_bytes());
                    group.clear();
                }
            }
            _ => {
                return Err(PdfError::FilterError(format!(
                    "Invalid ASCII85 character: {}",
                    c as char
                )));
            }
        }
    }

    // Handle incomplete final group
    match group.len() {
        0 => {}
        1 => {
            return Err(PdfError::FilterError(
                "Truncated ASCII85 group".to_string(),
            ))
        }
        count => {
            // Pad with 'u' (84)
            group.resize(5, b'u');
            let bytes = group_value(&group)?.to_be_bytes();
            result.extend_from_slice(&bytes[..count - 1]);
        }
    }

    Ok(result)
}
