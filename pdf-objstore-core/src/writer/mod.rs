//! PDF value serialization
//!
//! Renders the object model in PDF textual syntax. Two layouts are
//! supported: [`WriteMode::Compact`] emits the minimum whitespace needed to
//! keep tokens apart, [`WriteMode::Clean`] produces output that is easy to
//! read in a text editor.

use crate::error::Result;
use std::io::Write;

/// Layout used when serializing values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Minimal whitespace; literal tokens carry a single leading space.
    #[default]
    Compact,
    /// Spaces and line breaks between tokens.
    Clean,
}

impl WriteMode {
    pub fn is_compact(self) -> bool {
        self == WriteMode::Compact
    }

    pub fn is_clean(self) -> bool {
        self == WriteMode::Clean
    }
}

/// Types that can be rendered in PDF syntax.
pub trait PdfWrite {
    fn write_pdf(&self, out: &mut dyn Write, mode: WriteMode) -> Result<()>;

    fn to_pdf_bytes(&self, mode: WriteMode) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.write_pdf(&mut buffer, mode)?;
        Ok(buffer)
    }

    /// Lossy UTF-8 rendering, convenient for diagnostics and tests.
    fn to_pdf_string(&self, mode: WriteMode) -> Result<String> {
        let bytes = self.to_pdf_bytes(mode)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Fixed-point rendering of a real number with six fractional digits.
///
/// In compact mode trailing zeros and a trailing decimal point are dropped;
/// a value that strips down to nothing is written as `0`.
pub(crate) fn format_real(value: f64, mode: WriteMode) -> String {
    let formatted = format!("{value:.6}");
    if !mode.is_compact() || !formatted.contains('.') {
        return formatted;
    }

    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}
