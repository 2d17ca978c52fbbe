//! RunLengthDecode codec (ISO 32000-1 Section 7.4.5)

use super::{FilterEncoder, FilterType, StreamFilter};
use crate::error::{PdfError, Result};
use crate::objects::Dictionary;

const EOD: u8 = 128;
const MAX_RUN: usize = 128;

#[derive(Debug, Clone, Copy, Default)]
pub struct RunLengthFilter;

/// Runs can span `encode` calls, so input is buffered and encoded on finish.
#[derive(Default)]
struct RunLengthEncoder {
    pending: Vec<u8>,
}

impl FilterEncoder for RunLengthEncoder {
    fn encode(&mut self, input: &[u8], _out: &mut Vec<u8>) -> Result<()> {
        self.pending.extend_from_slice(input);
        Ok(())
    }

    fn finish(&mut self, out: &mut Vec<u8>) -> Result<()> {
        encode_run_length(&self.pending, out);
        self.pending.clear();
        Ok(())
    }
}

fn encode_run_length(data: &[u8], out: &mut Vec<u8>) {
    let mut pos = 0;
    while pos < data.len() {
        let byte = data[pos];
        let run = data[pos..]
            .iter()
            .take(MAX_RUN)
            .take_while(|&&b| b == byte)
            .count();

        if run >= 2 {
            out.push((257 - run) as u8);
            out.push(byte);
            pos += run;
            continue;
        }

        // Literal block up to the next run of at least two
        let start = pos;
        while pos < data.len() && pos - start < MAX_RUN {
            if pos + 1 < data.len() && data[pos] == data[pos + 1] {
                break;
            }
            pos += 1;
        }
        out.push((pos - start - 1) as u8);
        out.extend_from_slice(&data[start..pos]);
    }
    out.push(EOD);
}

impl StreamFilter for RunLengthFilter {
    fn filter_type(&self) -> FilterType {
        FilterType::RunLengthDecode
    }

    fn encoder(&self, _params: Option<&Dictionary>) -> Result<Box<dyn FilterEncoder>> {
        Ok(Box::new(RunLengthEncoder::default()))
    }

    fn decode(&self, data: &[u8], _params: Option<&Dictionary>) -> Result<Vec<u8>> {
        let mut result = Vec::new();
        let mut pos = 0;
        while pos < data.len() {
            let length = data[pos] as usize;
            pos += 1;
            match length {
                0..=127 => {
                    let end = pos + length + 1;
                    let literal = data.get(pos..end).ok_or_else(|| {
                        PdfError::FilterError("Truncated run-length literal".to_string())
                    })?;
                    result.extend_from_slice(literal);
                    pos = end;
                }
                128 => break,
                _ => {
                    let byte = *data.get(pos).ok_or_else(|| {
                        PdfError::FilterError("Truncated run-length repeat".to_string())
                    })?;
                    result.resize(result.len() + 257 - length, byte);
                    pos += 1;
                }
            }
        }
        Ok(result)
    }
}
