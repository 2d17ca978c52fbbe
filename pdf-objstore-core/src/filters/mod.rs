//! PDF stream filters
//!
//! Encoding and decoding of stream payloads according to ISO 32000-1
//! Section 7.4. A stream records its filters in the `/Filter` key of its
//! dictionary, in decode order: the first filter listed is the first one a
//! reader undoes. Writers therefore apply the filters in reverse.
//!
//! Codecs are looked up through a [`FilterRegistry`], which callers can
//! extend or replace with their own [`StreamFilter`] implementations.

mod ascii;
#[cfg(feature = "compression")]
mod flate;
mod run_length;

pub use ascii::{Ascii85Filter, AsciiHexFilter};
#[cfg(feature = "compression")]
pub use flate::FlateFilter;
pub use run_length::RunLengthFilter;

use crate::error::{PdfError, Result};
use crate::objects::{Array, Dictionary, Name, Value};
use std::collections::HashMap;
use std::fmt;

/// Standard PDF filter names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterType {
    /// ASCII hex decode
    ASCIIHexDecode,

    /// ASCII 85 decode
    ASCII85Decode,

    /// LZW decode
    LZWDecode,

    /// Flate decode (zlib/deflate compression)
    FlateDecode,

    /// Run length decode
    RunLengthDecode,

    /// CCITT fax decode
    CCITTFaxDecode,

    /// JBIG2 decode
    JBIG2Decode,

    /// DCT decode (JPEG)
    DCTDecode,

    /// JPX decode (JPEG 2000)
    JPXDecode,

    /// Crypt filter
    Crypt,
}

impl FilterType {
    /// Parse filter from name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ASCIIHexDecode" => Some(FilterType::ASCIIHexDecode),
            "ASCII85Decode" => Some(FilterType::ASCII85Decode),
            "LZWDecode" => Some(FilterType::LZWDecode),
            "FlateDecode" => Some(FilterType::FlateDecode),
            "RunLengthDecode" => Some(FilterType::RunLengthDecode),
            "CCITTFaxDecode" => Some(FilterType::CCITTFaxDecode),
            "JBIG2Decode" => Some(FilterType::JBIG2Decode),
            "DCTDecode" => Some(FilterType::DCTDecode),
            "JPXDecode" => Some(FilterType::JPXDecode),
            "Crypt" => Some(FilterType::Crypt),
            _ => None,
        }
    }

    pub fn as_name(&self) -> &'static str {
        match self {
            FilterType::ASCIIHexDecode => "ASCIIHexDecode",
            FilterType::ASCII85Decode => "ASCII85Decode",
            FilterType::LZWDecode => "LZWDecode",
            FilterType::FlateDecode => "FlateDecode",
            FilterType::RunLengthDecode => "RunLengthDecode",
            FilterType::CCITTFaxDecode => "CCITTFaxDecode",
            FilterType::JBIG2Decode => "JBIG2Decode",
            FilterType::DCTDecode => "DCTDecode",
            FilterType::JPXDecode => "JPXDecode",
            FilterType::Crypt => "Crypt",
        }
    }
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_name())
    }
}

/// Incremental encoder produced by a [`StreamFilter`].
///
/// Output may be held back until [`finish`](FilterEncoder::finish); callers
/// must always call it exactly once after the last `encode`.
pub trait FilterEncoder {
    fn encode(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<()>;

    fn finish(&mut self, out: &mut Vec<u8>) -> Result<()>;
}

/// A reversible byte transform identified by a PDF filter name.
pub trait StreamFilter {
    fn filter_type(&self) -> FilterType;

    /// Creates an encoder. `params` is the matching `/DecodeParms` entry.
    fn encoder(&self, params: Option<&Dictionary>) -> Result<Box<dyn FilterEncoder>>;

    fn decode(&self, data: &[u8], params: Option<&Dictionary>) -> Result<Vec<u8>>;
}

/// Codec lookup table keyed by filter name.
pub struct FilterRegistry {
    filters: HashMap<FilterType, Box<dyn StreamFilter>>,
}

impl FilterRegistry {
    /// A registry without any codecs.
    pub fn empty() -> Self {
        Self {
            filters: HashMap::new(),
        }
    }

    /// Replaces any codec already registered under the same name.
    pub fn register(&mut self, filter: Box<dyn StreamFilter>) {
        self.filters.insert(filter.filter_type(), filter);
    }

    pub fn unregister(&mut self, filter_type: FilterType) -> Option<Box<dyn StreamFilter>> {
        self.filters.remove(&filter_type)
    }

    pub fn contains(&self, filter_type: FilterType) -> bool {
        self.filters.contains_key(&filter_type)
    }

    pub fn get(&self, filter_type: FilterType) -> Result<&dyn StreamFilter> {
        self.filters
            .get(&filter_type)
            .map(|filter| &**filter)
            .ok_or_else(|| PdfError::UnsupportedFilter(filter_type.as_name().to_string()))
    }

    /// Undoes `filters` in listed order.
    pub fn decode(
        &self,
        data: &[u8],
        filters: &[FilterType],
        dictionary: &Dictionary,
    ) -> Result<Vec<u8>> {
        let mut result = data.to_vec();
        for (index, filter_type) in filters.iter().enumerate() {
            let params = decode_params(dictionary, index, filters.len());
            result = self.get(*filter_type)?.decode(&result, params)?;
        }
        Ok(result)
    }
}

impl Default for FilterRegistry {
    /// Registry with the built-in codecs.
    fn default() -> Self {
        let mut registry = Self::empty();
        #[cfg(feature = "compression")]
        registry.register(Box::new(FlateFilter));
        registry.register(Box::new(AsciiHexFilter));
        registry.register(Box::new(Ascii85Filter));
        registry.register(Box::new(RunLengthFilter));
        registry
    }
}

impl fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.filters.keys()).finish()
    }
}

/// Chain of encoders applying a `/Filter` list in write order.
pub struct EncodePipeline {
    stages: Vec<Box<dyn FilterEncoder>>,
}

impl EncodePipeline {
    pub fn new(
        registry: &FilterRegistry,
        filters: &[FilterType],
        dictionary: &Dictionary,
    ) -> Result<Self> {
        let stages = filters
            .iter()
            .enumerate()
            .rev()
            .map(|(index, filter_type)| {
                let params = decode_params(dictionary, index, filters.len());
                registry.get(*filter_type)?.encoder(params)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { stages })
    }

    pub fn is_passthrough(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn encode(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<()> {
        let mut data = input.to_vec();
        for stage in &mut self.stages {
            let mut next = Vec::new();
            stage.encode(&data, &mut next)?;
            data = next;
        }
        out.extend_from_slice(&data);
        Ok(())
    }

    /// Flushes every stage, feeding each stage's tail into the next one.
    pub fn finish(&mut self, out: &mut Vec<u8>) -> Result<()> {
        let mut carry = Vec::new();
        for stage in &mut self.stages {
            let mut next = Vec::new();
            if !carry.is_empty() {
                stage.encode(&carry, &mut next)?;
            }
            stage.finish(&mut next)?;
            carry = next;
        }
        out.extend_from_slice(&carry);
        Ok(())
    }
}

impl fmt::Debug for EncodePipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodePipeline")
            .field("stages", &self.stages.len())
            .finish()
    }
}

/// The `/DecodeParms` entry for filter `index` of `count`.
fn decode_params(dictionary: &Dictionary, index: usize, count: usize) -> Option<&Dictionary> {
    match dictionary.get(Dictionary::KEY_DECODE_PARMS)? {
        Value::Dictionary(params) if count == 1 => Some(params),
        Value::Array(params) => params.get(index).and_then(Value::try_get_dictionary),
        _ => None,
    }
}

/// Reads the `/Filter` key of a stream dictionary.
///
/// A missing key yields an empty list. Unknown filter names fail with
/// [`PdfError::UnsupportedFilter`].
pub fn filters_from_dictionary(dictionary: &Dictionary) -> Result<Vec<FilterType>> {
    fn lookup(name: &Name) -> Result<FilterType> {
        FilterType::from_name(name.as_str())
            .ok_or_else(|| PdfError::UnsupportedFilter(name.as_str().to_string()))
    }

    match dictionary.get(Dictionary::KEY_FILTER) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Name(name)) => Ok(vec![lookup(name)?]),
        Some(Value::Array(names)) => names
            .iter()
            .map(|value| match value {
                Value::Name(name) => lookup(name),
                other => Err(PdfError::FilterError(format!(
                    "Invalid filter in array: {}",
                    other.type_name()
                ))),
            })
            .collect(),
        Some(other) => Err(PdfError::FilterError(format!(
            "Invalid Filter type: {}",
            other.type_name()
        ))),
    }
}

/// Writes `filters` into the `/Filter` key: removed when empty, a name for
/// a single filter, an array of names otherwise.
pub fn set_filter_key(dictionary: &mut Dictionary, filters: &[FilterType]) {
    match filters {
        [] => {
            dictionary.remove(Dictionary::KEY_FILTER);
        }
        [single] => dictionary.set(Dictionary::KEY_FILTER, Name::from(single.as_name())),
        many => {
            let names: Array = many
                .iter()
                .map(|filter| Value::Name(Name::from(filter.as_name())))
                .collect();
            dictionary.set(Dictionary::KEY_FILTER, names);
        }
    }
}
