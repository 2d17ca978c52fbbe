//! FlateDecode (zlib/deflate) codec

use super::{FilterEncoder, FilterType, StreamFilter};
use crate::error::{PdfError, Result};
use crate::objects::Dictionary;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::{Read, Write};

#[derive(Debug, Clone, Copy, Default)]
pub struct FlateFilter;

/// Streaming zlib encoder; compressed bytes are drained after every write.
struct FlateEncoder {
    inner: ZlibEncoder<Vec<u8>>,
}

impl FilterEncoder for FlateEncoder {
    fn encode(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<()> {
        self.inner.write_all(input).map_err(PdfError::Io)?;
        out.append(self.inner.get_mut());
        Ok(())
    }

    fn finish(&mut self, out: &mut Vec<u8>) -> Result<()> {
        self.inner.try_finish().map_err(PdfError::Io)?;
        out.append(self.inner.get_mut());
        Ok(())
    }
}

impl StreamFilter for FlateFilter {
    fn filter_type(&self) -> FilterType {
        FilterType::FlateDecode
    }

    fn encoder(&self, params: Option<&Dictionary>) -> Result<Box<dyn FilterEncoder>> {
        reject_predictor(params)?;
        Ok(Box::new(FlateEncoder {
            inner: ZlibEncoder::new(Vec::new(), Compression::default()),
        }))
    }

    fn decode(&self, data: &[u8], params: Option<&Dictionary>) -> Result<Vec<u8>> {
        reject_predictor(params)?;
        let mut decoder = ZlibDecoder::new(data);
        let mut result = Vec::new();
        decoder
            .read_to_end(&mut result)
            .map_err(|e| PdfError::FilterError(format!("Flate decode error: {e}")))?;
        Ok(result)
    }
}

// PNG/TIFF predictors are not implemented; only the identity predictor passes.
fn reject_predictor(params: Option<&Dictionary>) -> Result<()> {
    let predictor = params
        .and_then(|p| p.get("Predictor"))
        .and_then(|v| v.try_get_number())
        .unwrap_or(1);
    if predictor > 1 {
        return Err(PdfError::NotImplemented(format!(
            "FlateDecode predictor {predictor}"
        )));
    }
    Ok(())
}
