use crate::error::Result;
use crate::objects::Value;
use crate::writer::{PdfWrite, WriteMode};
use std::io::Write;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Array {
    elements: Vec<Value>,
}

impl Array {
    pub fn new() -> Self {
        Self {
            elements: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            elements: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, value: impl Into<Value>) {
        self.elements.push(value.into());
    }

    pub fn pop(&mut self) -> Option<Value> {
        self.elements.pop()
    }

    pub fn insert(&mut self, index: usize, value: impl Into<Value>) {
        self.elements.insert(index, value.into());
    }

    pub fn remove(&mut self, index: usize) -> Value {
        self.elements.remove(index)
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.elements.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Value> {
        self.elements.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn clear(&mut self) {
        self.elements.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.elements.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Value> {
        self.elements.iter_mut()
    }
}

impl From<Vec<Value>> for Array {
    fn from(elements: Vec<Value>) -> Self {
        Self { elements }
    }
}

impl From<Array> for Vec<Value> {
    fn from(array: Array) -> Self {
        array.elements
    }
}

impl FromIterator<Value> for Array {
    fn from_iter<T: IntoIterator<Item = Value>>(iter: T) -> Self {
        Self {
            elements: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Array {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

impl PdfWrite for Array {
    fn write_pdf(&self, out: &mut dyn Write, mode: WriteMode) -> Result<()> {
        if mode.is_clean() {
            out.write_all(b"[ ")?;
        } else {
            out.write_all(b"[")?;
        }

        for (index, value) in self.elements.iter().enumerate() {
            value.write_pdf(out, mode)?;
            if mode.is_clean() {
                // Break long arrays every ten items
                out.write_all(if (index + 1) % 10 == 0 { b"\n" } else { b" " })?;
            }
        }

        out.write_all(b"]")?;
        Ok(())
    }
}
