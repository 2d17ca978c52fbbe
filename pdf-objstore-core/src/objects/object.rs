use crate::error::{PdfError, Result};
use crate::objects::{Dictionary, ObjectId, Stream, Value};
use crate::writer::{PdfWrite, WriteMode};
use std::io::Write;

/// An indirect object: an addressable value plus an optional stream payload.
///
/// Objects are created and owned by an [`ObjectStore`](crate::store::ObjectStore).
/// Any mutable access to the value marks the object dirty, which writers
/// use to decide what needs to be serialized again.
#[derive(Debug)]
pub struct PdfObject {
    id: ObjectId,
    value: Value,
    stream: Option<Stream>,
    dirty: bool,
}

impl PdfObject {
    pub(crate) fn new(id: ObjectId, value: Value) -> Self {
        Self {
            id,
            value,
            stream: None,
            dirty: false,
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: ObjectId) {
        self.id = id;
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut Value {
        self.dirty = true;
        &mut self.value
    }

    /// Replaces the value and returns the previous one.
    pub fn set_value(&mut self, value: impl Into<Value>) -> Value {
        self.dirty = true;
        std::mem::replace(&mut self.value, value.into())
    }

    /// Mutable access that does not touch the dirty flag.
    pub(crate) fn value_mut_untracked(&mut self) -> &mut Value {
        &mut self.value
    }

    pub fn dictionary(&self) -> Result<&Dictionary> {
        self.value.get_dictionary()
    }

    pub fn dictionary_mut(&mut self) -> Result<&mut Dictionary> {
        self.dirty = true;
        self.value.get_dictionary_mut()
    }

    pub fn has_stream(&self) -> bool {
        self.stream.is_some()
    }

    pub fn stream(&self) -> Option<&Stream> {
        self.stream.as_ref()
    }

    /// The stream, or [`PdfError::InvalidHandle`] if the object has none.
    pub fn must_get_stream(&self) -> Result<&Stream> {
        self.stream.as_ref().ok_or(PdfError::InvalidHandle)
    }

    pub fn take_stream(&mut self) -> Option<Stream> {
        self.dirty = true;
        self.stream.take()
    }

    pub(crate) fn install_stream(&mut self, stream: Stream) {
        self.stream = Some(stream);
    }

    /// Borrows the stream together with the dictionary that describes it.
    pub(crate) fn stream_parts(&mut self) -> Result<(&mut Stream, &mut Dictionary, &mut bool)> {
        let stream = self.stream.as_mut().ok_or(PdfError::InvalidHandle)?;
        let dictionary = self.value.get_dictionary_mut()?;
        Ok((stream, dictionary, &mut self.dirty))
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn set_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn reset_dirty(&mut self) {
        self.dirty = false;
    }
}

impl PdfWrite for PdfObject {
    /// Writes `N G obj ... endobj`. Stream payloads are written verbatim.
    fn write_pdf(&self, out: &mut dyn Write, mode: WriteMode) -> Result<()> {
        write!(out, "{} {} obj", self.id.number(), self.id.generation())?;
        out.write_all(if mode.is_clean() { b"\n" } else { b"" })?;
        self.value.write_pdf(out, mode)?;
        if let Some(stream) = &self.stream {
            out.write_all(b"\nstream\n")?;
            out.write_all(stream.raw_data())?;
            out.write_all(b"\nendstream")?;
        }
        out.write_all(b"\nendobj\n")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::Name;

    #[test]
    fn test_new_object_is_clean() {
        let obj = PdfObject::new(ObjectId::new(1, 0), Value::Null);
        assert_eq!(obj.id(), ObjectId::new(1, 0));
        assert!(!obj.is_dirty());
        assert!(!obj.has_stream());
    }

    #[test]
    fn test_mutation_marks_dirty() {
        let mut obj = PdfObject::new(ObjectId::new(1, 0), Value::Integer(1));
        obj.value_mut().set_number(2).unwrap();
        assert!(obj.is_dirty());
        obj.reset_dirty();

        let previous = obj.set_value(true);
        assert_eq!(previous, Value::Integer(2));
        assert!(obj.is_dirty());

        obj.reset_dirty();
        let _ = obj.value_mut_untracked();
        assert!(!obj.is_dirty());
    }

    #[test]
    fn test_dictionary_access() {
        let mut obj = PdfObject::new(ObjectId::new(3, 0), Dictionary::new().into());
        obj.dictionary_mut().unwrap().set("Type", Name::from("Page"));
        assert_eq!(obj.dictionary().unwrap().type_name(), Some("Page"));

        let scalar = PdfObject::new(ObjectId::new(4, 0), Value::Null);
        assert!(matches!(
            scalar.dictionary(),
            Err(PdfError::InvalidDataType { .. })
        ));
    }

    #[test]
    fn test_stream_access() {
        let mut obj = PdfObject::new(ObjectId::new(5, 0), Dictionary::new().into());
        assert!(matches!(obj.must_get_stream(), Err(PdfError::InvalidHandle)));
        assert!(obj.stream_parts().is_err());

        obj.install_stream(Stream::new());
        assert!(obj.must_get_stream().is_ok());
        let (_, dict, _) = obj.stream_parts().unwrap();
        assert!(dict.is_empty());

        assert!(obj.take_stream().is_some());
        assert!(!obj.has_stream());
    }

    #[test]
    fn test_write_object_compact() {
        let mut dict = Dictionary::new();
        dict.set("Type", Name::from("Catalog"));
        dict.set("Pages", ObjectId::new(2, 0));
        let obj = PdfObject::new(ObjectId::new(1, 0), dict.into());

        let written = obj.to_pdf_string(WriteMode::Compact).unwrap();
        assert_eq!(written, "1 0 obj<</Type/Catalog/Pages 2 0 R>>\nendobj\n");
    }

    #[test]
    fn test_write_object_clean() {
        let obj = PdfObject::new(ObjectId::new(7, 1), Value::Integer(42));
        let written = obj.to_pdf_string(WriteMode::Clean).unwrap();
        assert_eq!(written, "7 1 obj\n42\nendobj\n");
    }
}
