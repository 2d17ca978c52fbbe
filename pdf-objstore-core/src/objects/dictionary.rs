use crate::error::Result;
use crate::objects::{Array, Name, Value};
use crate::writer::{PdfWrite, WriteMode};
use indexmap::IndexMap;
use std::io::Write;

/// Name-keyed mapping that keeps keys in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dictionary {
    entries: IndexMap<Name, Value>,
}

impl Dictionary {
    pub const KEY_TYPE: &'static str = "Type";
    pub const KEY_FILTER: &'static str = "Filter";
    pub const KEY_DECODE_PARMS: &'static str = "DecodeParms";
    pub const KEY_LENGTH: &'static str = "Length";

    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    /// Inserts or replaces `key`. A replaced key keeps its position.
    pub fn set(&mut self, key: impl Into<Name>, value: impl Into<Value>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries.get_mut(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn keys(&self) -> impl Iterator<Item = &Name> {
        self.entries.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.values()
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut Value> {
        self.entries.values_mut()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Name, &Value)> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&Name, &mut Value)> {
        self.entries.iter_mut()
    }

    pub fn get_dict(&self, key: &str) -> Option<&Dictionary> {
        self.get(key).and_then(Value::try_get_dictionary)
    }

    pub fn get_array(&self, key: &str) -> Option<&Array> {
        self.get(key).and_then(Value::try_get_array)
    }

    pub fn get_name(&self, key: &str) -> Option<&Name> {
        self.get(key).and_then(Value::try_get_name)
    }

    /// The `/Type` entry, if present and a name.
    pub fn type_name(&self) -> Option<&str> {
        self.get_name(Self::KEY_TYPE).map(Name::as_str)
    }
}

impl FromIterator<(Name, Value)> for Dictionary {
    fn from_iter<T: IntoIterator<Item = (Name, Value)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl PdfWrite for Dictionary {
    fn write_pdf(&self, out: &mut dyn Write, mode: WriteMode) -> Result<()> {
        fn write_entry(
            out: &mut dyn Write,
            mode: WriteMode,
            key: &Name,
            value: &Value,
        ) -> Result<()> {
            key.write_pdf(out, mode)?;
            if mode.is_clean() {
                out.write_all(b" ")?;
            }
            value.write_pdf(out, mode)?;
            if mode.is_clean() {
                out.write_all(b"\n")?;
            }
            Ok(())
        }

        if mode.is_clean() {
            out.write_all(b"<<\n")?;
        } else {
            out.write_all(b"<<")?;
        }

        // /Type goes first so readers can classify the object early
        if let Some((key, value)) = self.entries.get_key_value(Self::KEY_TYPE) {
            write_entry(out, mode, key, value)?;
        }
        for (key, value) in &self.entries {
            if key.as_str() != Self::KEY_TYPE {
                write_entry(out, mode, key, value)?;
            }
        }

        out.write_all(b">>")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{ObjectId, PdfString};

    #[test]
    fn test_new_dictionary() {
        let dict = Dictionary::new();
        assert!(dict.is_empty());
        assert_eq!(dict.len(), 0);
        assert!(Dictionary::with_capacity(4).is_empty());
    }

    #[test]
    fn test_set_and_get() {
        let mut dict = Dictionary::new();
        dict.set("Title", "Test");
        dict.set("Count", 42);
        dict.set("Open", true);

        assert_eq!(dict.get("Title"), Some(&Value::String(PdfString::from("Test"))));
        assert_eq!(dict.get("Count"), Some(&Value::Integer(42)));
        assert_eq!(dict.get("Open"), Some(&Value::Bool(true)));
        assert_eq!(dict.get("Missing"), None);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut dict = Dictionary::new();
        dict.set("Zeta", 1);
        dict.set("Alpha", 2);
        dict.set("Mid", 3);
        dict.set("Zeta", 4);

        let keys: Vec<&str> = dict.keys().map(Name::as_str).collect();
        assert_eq!(keys, vec!["Zeta", "Alpha", "Mid"]);
        assert_eq!(dict.get("Zeta"), Some(&Value::Integer(4)));
    }

    #[test]
    fn test_remove_keeps_order_of_rest() {
        let mut dict = Dictionary::new();
        dict.set("A", 1);
        dict.set("B", 2);
        dict.set("C", 3);

        assert_eq!(dict.remove("B"), Some(Value::Integer(2)));
        assert_eq!(dict.remove("B"), None);
        let keys: Vec<&str> = dict.keys().map(Name::as_str).collect();
        assert_eq!(keys, vec!["A", "C"]);
    }

    #[test]
    fn test_get_mut() {
        let mut dict = Dictionary::new();
        dict.set("Counter", 1);

        if let Some(Value::Integer(val)) = dict.get_mut("Counter") {
            *val = 2;
        }
        assert_eq!(dict.get("Counter"), Some(&Value::Integer(2)));
    }

    #[test]
    fn test_typed_getters() {
        let mut child = Dictionary::new();
        child.set("Leaf", true);

        let mut dict = Dictionary::new();
        dict.set("Type", Name::from("Pages"));
        dict.set("Child", child);
        dict.set("Kids", Array::from(vec![Value::Reference(ObjectId::new(2, 0))]));

        assert_eq!(dict.type_name(), Some("Pages"));
        assert!(dict.get_dict("Child").is_some());
        assert_eq!(dict.get_array("Kids").map(Array::len), Some(1));
        assert!(dict.get_dict("Kids").is_none());
    }

    #[test]
    fn test_equality_ignores_order() {
        let mut a = Dictionary::new();
        a.set("X", 1);
        a.set("Y", 2);
        let mut b = Dictionary::new();
        b.set("Y", 2);
        b.set("X", 1);
        assert_eq!(a, b);
    }

    #[test]
    fn test_write_type_first_compact() {
        let mut dict = Dictionary::new();
        dict.set("Count", 3);
        dict.set("Type", Name::from("Pages"));
        dict.set("Kids", Array::from(vec![Value::Reference(ObjectId::new(2, 0))]));

        let written = dict.to_pdf_string(WriteMode::Compact).unwrap();
        assert_eq!(written, "<</Type/Pages/Count 3/Kids[ 2 0 R]>>");
    }

    #[test]
    fn test_write_clean() {
        let mut dict = Dictionary::new();
        dict.set("Type", Name::from("Catalog"));
        dict.set("Version", 1.5);

        let written = dict.to_pdf_string(WriteMode::Clean).unwrap();
        assert_eq!(written, "<<\n/Type /Catalog\n/Version 1.500000\n>>");
    }

    #[test]
    fn test_from_iterator() {
        let dict: Dictionary = vec![
            (Name::from("A"), Value::Integer(1)),
            (Name::from("B"), Value::Null),
        ]
        .into_iter()
        .collect();
        assert_eq!(dict.len(), 2);
        assert_eq!(dict.get("B"), Some(&Value::Null));
    }
}
