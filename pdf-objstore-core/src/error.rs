use crate::objects::ObjectId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid data type: expected {expected}, found {found}")]
    InvalidDataType {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Invalid handle: value payload is missing")]
    InvalidHandle,

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("Missing object: {0}")]
    MissingObject(ObjectId),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Value out of range: {0}")]
    ValueOutOfRange(String),

    #[error("Unsupported filter: {0}")]
    UnsupportedFilter(String),

    #[error("Filter error: {0}")]
    FilterError(String),

    #[error("Parse error at position {position}: {message}")]
    ParseError { position: usize, message: String },
}

pub type Result<T> = std::result::Result<T, PdfError>;

impl PdfError {
    pub(crate) fn data_type(expected: &'static str, found: &'static str) -> Self {
        PdfError::InvalidDataType { expected, found }
    }

    pub(crate) fn parse(position: usize, message: impl Into<String>) -> Self {
        PdfError::ParseError {
            position,
            message: message.into(),
        }
    }
}
