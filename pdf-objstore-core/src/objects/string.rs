use crate::error::Result;
use crate::writer::{PdfWrite, WriteMode};
use std::borrow::Borrow;
use std::fmt;
use std::io::Write;

/// A PDF string: raw bytes plus the preferred serialization form.
#[derive(Debug, Clone, Default, Eq)]
pub struct PdfString {
    bytes: Vec<u8>,
    hex: bool,
}

impl PdfString {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            hex: false,
        }
    }

    /// A string that serializes as `<...>`.
    pub fn hex(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            hex: true,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn is_hex(&self) -> bool {
        self.hex
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

// The serialization form is presentation only.
impl PartialEq for PdfString {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl From<&str> for PdfString {
    fn from(s: &str) -> Self {
        Self::new(s.as_bytes())
    }
}

impl From<String> for PdfString {
    fn from(s: String) -> Self {
        Self::new(s.into_bytes())
    }
}

impl From<Vec<u8>> for PdfString {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl PdfWrite for PdfString {
    fn write_pdf(&self, out: &mut dyn Write, _mode: WriteMode) -> Result<()> {
        if self.hex {
            out.write_all(b"<")?;
            for byte in &self.bytes {
                write!(out, "{byte:02X}")?;
            }
            out.write_all(b">")?;
            return Ok(());
        }

        out.write_all(b"(")?;
        for &byte in &self.bytes {
            match byte {
                b'(' => out.write_all(b"\\(")?,
                b')' => out.write_all(b"\\)")?,
                b'\\' => out.write_all(b"\\\\")?,
                b'\n' => out.write_all(b"\\n")?,
                b'\r' => out.write_all(b"\\r")?,
                b'\t' => out.write_all(b"\\t")?,
                0x08 => out.write_all(b"\\b")?,
                0x0C => out.write_all(b"\\f")?,
                _ => out.write_all(&[byte])?,
            }
        }
        out.write_all(b")")?;
        Ok(())
    }
}

/// A PDF name, stored without the leading slash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Name(String);

impl Name {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Borrow<str> for Name {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.0)
    }
}

impl From<&str> for Name {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Name {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl PartialEq<str> for Name {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Name {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

fn is_name_delimiter(byte: u8) -> bool {
    matches!(
        byte,
        b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%' | b'#'
    )
}

impl PdfWrite for Name {
    fn write_pdf(&self, out: &mut dyn Write, _mode: WriteMode) -> Result<()> {
        out.write_all(b"/")?;
        for &byte in self.0.as_bytes() {
            if !(b'!'..=b'~').contains(&byte) || is_name_delimiter(byte) {
                write!(out, "#{byte:02X}")?;
            } else {
                out.write_all(&[byte])?;
            }
        }
        Ok(())
    }
}
