use crate::error::{PdfError, Result};
use crate::objects::{Array, DataType, Dictionary, Name, ObjectId, PdfString};
use crate::writer::{format_real, PdfWrite, WriteMode};
use std::io::Write;

/// Opaque, already-serialized PDF data written verbatim.
#[derive(Debug, Clone, Default)]
pub struct RawData(Vec<u8>);

impl RawData {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// The universal PDF datum.
///
/// Container payloads are boxed and exclusively owned; `clone` performs a
/// deep copy of whatever payload the current variant holds.
#[derive(Debug, Clone, Default)]
pub enum Value {
    Bool(bool),
    Integer(i64),
    Real(f64),
    String(PdfString),
    Name(Name),
    Array(Box<Array>),
    Dictionary(Box<Dictionary>),
    Reference(ObjectId),
    #[default]
    Null,
    RawData(RawData),
}

impl Value {
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Bool(_) => DataType::Bool,
            Value::Integer(_) => DataType::Integer,
            Value::Real(_) => DataType::Real,
            Value::String(_) => DataType::String,
            Value::Name(_) => DataType::Name,
            Value::Array(_) => DataType::Array,
            Value::Dictionary(_) => DataType::Dictionary,
            Value::Reference(_) => DataType::Reference,
            Value::Null => DataType::Null,
            Value::RawData(_) => DataType::RawData,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.data_type().as_str()
    }

    fn mismatch(&self, expected: &'static str) -> PdfError {
        PdfError::data_type(expected, self.type_name())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Integer(_))
    }

    pub fn is_real_strict(&self) -> bool {
        matches!(self, Value::Real(_))
    }

    pub fn is_number_or_real(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Real(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    pub fn is_name(&self) -> bool {
        matches!(self, Value::Name(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    pub fn is_dictionary(&self) -> bool {
        matches!(self, Value::Dictionary(_))
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, Value::Reference(_))
    }

    pub fn is_raw_data(&self) -> bool {
        matches!(self, Value::RawData(_))
    }

    // Non-failing accessors

    pub fn try_get_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer value; `None` for anything but an integer.
    pub fn try_get_number(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Integer value, rounding a real to the nearest integer.
    pub fn try_get_number_lenient(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            Value::Real(r) => Some(r.round() as i64),
            _ => None,
        }
    }

    /// Real value, widening an integer.
    pub fn try_get_real(&self) -> Option<f64> {
        match self {
            Value::Real(r) => Some(*r),
            Value::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn try_get_real_strict(&self) -> Option<f64> {
        match self {
            Value::Real(r) => Some(*r),
            _ => None,
        }
    }

    pub fn try_get_string(&self) -> Option<&PdfString> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn try_get_name(&self) -> Option<&Name> {
        match self {
            Value::Name(n) => Some(n),
            _ => None,
        }
    }

    pub fn try_get_reference(&self) -> Option<ObjectId> {
        match self {
            Value::Reference(id) => Some(*id),
            _ => None,
        }
    }

    pub fn try_get_array(&self) -> Option<&Array> {
        match self {
            Value::Array(array) => Some(array),
            _ => None,
        }
    }

    pub fn try_get_array_mut(&mut self) -> Option<&mut Array> {
        match self {
            Value::Array(array) => Some(array),
            _ => None,
        }
    }

    pub fn try_get_dictionary(&self) -> Option<&Dictionary> {
        match self {
            Value::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }

    pub fn try_get_dictionary_mut(&mut self) -> Option<&mut Dictionary> {
        match self {
            Value::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }

    pub fn try_get_raw_data(&self) -> Option<&RawData> {
        match self {
            Value::RawData(data) => Some(data),
            _ => None,
        }
    }

    // Failing accessors

    pub fn get_bool(&self) -> Result<bool> {
        self.try_get_bool().ok_or_else(|| self.mismatch("Bool"))
    }

    pub fn get_number(&self) -> Result<i64> {
        self.try_get_number().ok_or_else(|| self.mismatch("Integer"))
    }

    pub fn get_number_lenient(&self) -> Result<i64> {
        self.try_get_number_lenient()
            .ok_or_else(|| self.mismatch("Integer or Real"))
    }

    pub fn get_real(&self) -> Result<f64> {
        self.try_get_real()
            .ok_or_else(|| self.mismatch("Real or Integer"))
    }

    pub fn get_real_strict(&self) -> Result<f64> {
        self.try_get_real_strict()
            .ok_or_else(|| self.mismatch("Real"))
    }

    pub fn get_string(&self) -> Result<&PdfString> {
        self.try_get_string().ok_or_else(|| self.mismatch("String"))
    }

    pub fn get_name(&self) -> Result<&Name> {
        self.try_get_name().ok_or_else(|| self.mismatch("Name"))
    }

    pub fn get_reference(&self) -> Result<ObjectId> {
        self.try_get_reference()
            .ok_or_else(|| self.mismatch("Reference"))
    }

    pub fn get_array(&self) -> Result<&Array> {
        self.try_get_array().ok_or_else(|| self.mismatch("Array"))
    }

    pub fn get_array_mut(&mut self) -> Result<&mut Array> {
        let found = self.type_name();
        self.try_get_array_mut()
            .ok_or_else(|| PdfError::data_type("Array", found))
    }

    pub fn get_dictionary(&self) -> Result<&Dictionary> {
        self.try_get_dictionary()
            .ok_or_else(|| self.mismatch("Dictionary"))
    }

    pub fn get_dictionary_mut(&mut self) -> Result<&mut Dictionary> {
        let found = self.type_name();
        self.try_get_dictionary_mut()
            .ok_or_else(|| PdfError::data_type("Dictionary", found))
    }

    pub fn get_raw_data(&self) -> Result<&RawData> {
        self.try_get_raw_data()
            .ok_or_else(|| self.mismatch("RawData"))
    }

    // In-place setters: the variant never changes

    pub fn set_bool(&mut self, value: bool) -> Result<()> {
        match self {
            Value::Bool(b) => {
                *b = value;
                Ok(())
            }
            _ => Err(self.mismatch("Bool")),
        }
    }

    /// Sets a numeric value; a real keeps its variant and stores the widened value.
    pub fn set_number(&mut self, value: i64) -> Result<()> {
        match self {
            Value::Integer(n) => *n = value,
            Value::Real(r) => *r = value as f64,
            _ => return Err(self.mismatch("Integer or Real")),
        }
        Ok(())
    }

    /// Sets a numeric value; an integer keeps its variant and stores the rounded value.
    pub fn set_real(&mut self, value: f64) -> Result<()> {
        match self {
            Value::Real(r) => *r = value,
            Value::Integer(n) => *n = value.round() as i64,
            _ => return Err(self.mismatch("Real or Integer")),
        }
        Ok(())
    }

    pub fn set_name(&mut self, value: impl Into<Name>) -> Result<()> {
        match self {
            Value::Name(n) => {
                *n = value.into();
                Ok(())
            }
            _ => Err(self.mismatch("Name")),
        }
    }

    pub fn set_string(&mut self, value: impl Into<PdfString>) -> Result<()> {
        match self {
            Value::String(s) => {
                *s = value.into();
                Ok(())
            }
            _ => Err(self.mismatch("String")),
        }
    }

    pub fn set_reference(&mut self, value: ObjectId) -> Result<()> {
        match self {
            Value::Reference(id) => {
                *id = value;
                Ok(())
            }
            _ => Err(self.mismatch("Reference")),
        }
    }

    /// Tag-aware equality.
    ///
    /// Values of different variants are unequal; in particular an integer
    /// never equals a real, even when both hold the same number. Containers
    /// compare structurally. Raw data cannot be compared: if either side is
    /// raw data the result is [`PdfError::NotImplemented`] regardless of
    /// operand order, and so is any nested comparison that reaches raw data.
    pub fn try_eq(&self, other: &Value) -> Result<bool> {
        if self.is_raw_data() || other.is_raw_data() {
            return Err(PdfError::NotImplemented(
                "equality is not implemented for raw data".to_string(),
            ));
        }

        let equal = match self {
            Value::Bool(b) => other.try_get_bool() == Some(*b),
            Value::Integer(n) => other.try_get_number() == Some(*n),
            Value::Real(r) => other.try_get_real_strict() == Some(*r),
            Value::Reference(id) => other.try_get_reference() == Some(*id),
            Value::String(s) => other.try_get_string() == Some(s),
            Value::Name(n) => other.try_get_name() == Some(n),
            Value::Array(a) => match other.try_get_array() {
                Some(b) => array_eq(a, b)?,
                None => false,
            },
            Value::Dictionary(a) => match other.try_get_dictionary() {
                Some(b) => dictionary_eq(a, b)?,
                None => false,
            },
            Value::Null => other.is_null(),
            Value::RawData(_) => false,
        };
        Ok(equal)
    }
}

fn array_eq(a: &Array, b: &Array) -> Result<bool> {
    if a.len() != b.len() {
        return Ok(false);
    }
    for (left, right) in a.iter().zip(b.iter()) {
        if !left.try_eq(right)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn dictionary_eq(a: &Dictionary, b: &Dictionary) -> Result<bool> {
    if a.len() != b.len() {
        return Ok(false);
    }
    for (key, left) in a.iter() {
        match b.get(key.as_str()) {
            Some(right) if left.try_eq(right)? => {}
            _ => return Ok(false),
        }
    }
    Ok(true)
}

/// # Panics
///
/// Panics when either operand is raw data, or a nested comparison reaches
/// raw data. Use [`Value::try_eq`] when that is possible.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match self.try_eq(other) {
            Ok(equal) => equal,
            Err(err) => panic!("{err}"),
        }
    }
}

impl PdfWrite for Value {
    fn write_pdf(&self, out: &mut dyn Write, mode: WriteMode) -> Result<()> {
        let token = match self {
            Value::Bool(b) => b.to_string(),
            Value::Integer(n) => n.to_string(),
            Value::Real(r) => format_real(*r, mode),
            Value::Reference(id) => format!("{} {} R", id.number(), id.generation()),
            Value::Null => "null".to_string(),
            Value::String(s) => return s.write_pdf(out, mode),
            Value::Name(n) => return n.write_pdf(out, mode),
            Value::Array(a) => return a.write_pdf(out, mode),
            Value::Dictionary(d) => return d.write_pdf(out, mode),
            Value::RawData(data) => {
                out.write_all(data.as_bytes())?;
                return Ok(());
            }
        };

        // Literal tokens need a separator from whatever precedes them
        if mode.is_compact() {
            out.write_all(b" ")?;
        }
        out.write_all(token.as_bytes())?;
        Ok(())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i as i64)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Integer(i as i64)
    }
}

impl From<usize> for Value {
    fn from(i: usize) -> Self {
        Value::Integer(i as i64)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::Real(f as f64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Real(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(PdfString::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(PdfString::from(s))
    }
}

impl From<PdfString> for Value {
    fn from(s: PdfString) -> Self {
        Value::String(s)
    }
}

impl From<Name> for Value {
    fn from(n: Name) -> Self {
        Value::Name(n)
    }
}

impl From<ObjectId> for Value {
    fn from(id: ObjectId) -> Self {
        Value::Reference(id)
    }
}

impl From<Array> for Value {
    fn from(a: Array) -> Self {
        Value::Array(Box::new(a))
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(Box::new(Array::from(v)))
    }
}

impl From<Dictionary> for Value {
    fn from(d: Dictionary) -> Self {
        Value::Dictionary(Box::new(d))
    }
}

impl From<RawData> for Value {
    fn from(data: RawData) -> Self {
        Value::RawData(data)
    }
}

#[cfg(test)]
mod tests;
