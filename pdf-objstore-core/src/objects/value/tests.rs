//! Tests for Value functionality

use super::*;
use pretty_assertions::assert_eq;

fn compact(value: &Value) -> String {
    value.to_pdf_string(WriteMode::Compact).unwrap()
}

fn clean(value: &Value) -> String {
    value.to_pdf_string(WriteMode::Clean).unwrap()
}

#[test]
fn test_default_is_null() {
    let value = Value::default();
    assert!(value.is_null());
    assert_eq!(value.data_type(), DataType::Null);
}

#[test]
fn test_data_type_per_variant() {
    let cases = vec![
        (Value::Bool(true), DataType::Bool),
        (Value::Integer(1), DataType::Integer),
        (Value::Real(1.0), DataType::Real),
        (Value::from("s"), DataType::String),
        (Value::from(Name::from("N")), DataType::Name),
        (Value::from(Array::new()), DataType::Array),
        (Value::from(Dictionary::new()), DataType::Dictionary),
        (Value::from(ObjectId::new(1, 0)), DataType::Reference),
        (Value::Null, DataType::Null),
        (Value::from(RawData::new(b"q".to_vec())), DataType::RawData),
    ];
    for (value, expected) in cases {
        assert_eq!(value.data_type(), expected);
        assert_eq!(value.type_name(), expected.as_str());
    }
}

#[test]
fn test_number_accessors() {
    let int = Value::Integer(7);
    assert_eq!(int.get_number().unwrap(), 7);
    assert_eq!(int.get_real().unwrap(), 7.0);
    assert!(int.get_real_strict().is_err());

    let real = Value::Real(2.6);
    assert!(real.get_number().is_err());
    assert_eq!(real.get_number_lenient().unwrap(), 3);
    assert_eq!(real.get_real_strict().unwrap(), 2.6);
    assert_eq!(Value::Real(-2.5).try_get_number_lenient(), Some(-3));
}

#[test]
fn test_failing_accessor_reports_types() {
    let err = Value::Name(Name::from("X")).get_bool().unwrap_err();
    match err {
        PdfError::InvalidDataType { expected, found } => {
            assert_eq!(expected, "Bool");
            assert_eq!(found, "Name");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(Value::Null.get_dictionary().is_err());
    assert!(Value::Integer(1).get_reference().is_err());
}

#[test]
fn test_try_accessors_return_none_on_mismatch() {
    let value = Value::from("text");
    assert!(value.try_get_bool().is_none());
    assert!(value.try_get_name().is_none());
    assert_eq!(value.try_get_string().map(PdfString::as_bytes), Some(&b"text"[..]));
}

#[test]
fn test_mutable_container_access() {
    let mut value = Value::from(Dictionary::new());
    value.get_dictionary_mut().unwrap().set("K", 1);
    assert_eq!(value.get_dictionary().unwrap().len(), 1);
    assert!(value.get_array_mut().is_err());

    let mut list = Value::from(vec![Value::Integer(1)]);
    list.try_get_array_mut().unwrap().push(2);
    assert_eq!(list.get_array().unwrap().len(), 2);
}

#[test]
fn test_setters_keep_variant() {
    let mut real = Value::Real(1.5);
    real.set_number(4).unwrap();
    assert!(matches!(real, Value::Real(r) if r == 4.0));

    let mut int = Value::Integer(1);
    int.set_real(2.7).unwrap();
    assert!(matches!(int, Value::Integer(3)));

    let mut name = Value::Name(Name::from("Old"));
    name.set_name("New").unwrap();
    assert_eq!(name.get_name().unwrap().as_str(), "New");

    let mut reference = Value::Reference(ObjectId::new(1, 0));
    reference.set_reference(ObjectId::new(9, 2)).unwrap();
    assert_eq!(reference.get_reference().unwrap(), ObjectId::new(9, 2));
}

#[test]
fn test_setter_type_mismatch() {
    let mut value = Value::Bool(false);
    assert!(value.set_number(1).is_err());
    assert!(value.set_name("N").is_err());
    assert!(value.set_string("s").is_err());
    assert!(matches!(value, Value::Bool(false)));

    let mut text = Value::from("a");
    text.set_string("b").unwrap();
    assert_eq!(text, Value::from("b"));
    assert!(text.set_bool(true).is_err());
}

#[test]
fn test_numeric_equality_is_strict() {
    assert!(!Value::Integer(1).try_eq(&Value::Real(1.0)).unwrap());
    assert!(!Value::Real(1.0).try_eq(&Value::Integer(1)).unwrap());
    assert_eq!(Value::Real(1.0), Value::Real(1.0));
    assert_eq!(Value::Integer(5), Value::Integer(5));
}

#[test]
fn test_structural_equality() {
    let mut a = Dictionary::new();
    a.set("Kids", vec![Value::Reference(ObjectId::new(3, 0))]);
    let b = a.clone();
    assert_eq!(Value::from(a.clone()), Value::from(b));

    let mut c = a.clone();
    c.set("Count", 1);
    assert_ne!(Value::from(a), Value::from(c));
    assert_ne!(Value::Null, Value::Bool(false));
}

#[test]
fn test_raw_data_equality_not_implemented() {
    let raw = Value::from(RawData::new(b"1 0 obj".to_vec()));
    assert!(matches!(raw.try_eq(&Value::Null), Err(PdfError::NotImplemented(_))));
    assert!(matches!(Value::Null.try_eq(&raw), Err(PdfError::NotImplemented(_))));

    let nested = Value::from(vec![raw.clone()]);
    assert!(nested.try_eq(&nested.clone()).is_err());
}

#[test]
#[should_panic]
fn test_raw_data_partial_eq_panics() {
    let raw = Value::from(RawData::new(b"x".to_vec()));
    let _ = raw == raw.clone();
}

#[test]
#[should_panic(expected = "not implemented for raw data")]
fn test_raw_data_on_right_of_partial_eq_panics() {
    let raw = Value::from(RawData::new(b"x".to_vec()));
    let _ = Value::Null == raw;
}

#[test]
fn test_clone_is_deep() {
    let original = Value::from(vec![Value::from(vec![Value::Integer(1)])]);
    let mut copy = original.clone();
    copy.get_array_mut()
        .unwrap()
        .get_mut(0)
        .unwrap()
        .get_array_mut()
        .unwrap()
        .push(2);

    assert_eq!(compact(&original), "[[ 1]]");
    assert_eq!(compact(&copy), "[[ 1 2]]");
}

#[test]
fn test_write_literals_compact() {
    assert_eq!(compact(&Value::Bool(true)), " true");
    assert_eq!(compact(&Value::Integer(-12)), " -12");
    assert_eq!(compact(&Value::Real(3.25)), " 3.25");
    assert_eq!(compact(&Value::Real(2.0)), " 2");
    assert_eq!(compact(&Value::Null), " null");
    assert_eq!(compact(&Value::Reference(ObjectId::new(12, 3))), " 12 3 R");
    assert_eq!(compact(&Value::from("hi")), "(hi)");
    assert_eq!(compact(&Value::from(Name::from("Type"))), "/Type");
}

#[test]
fn test_write_literals_clean() {
    assert_eq!(clean(&Value::Bool(false)), "false");
    assert_eq!(clean(&Value::Real(2.0)), "2.000000");
    assert_eq!(clean(&Value::Reference(ObjectId::new(4, 0))), "4 0 R");
}

#[test]
fn test_write_raw_data_verbatim() {
    let raw = Value::from(RawData::new(b"<< /Custom 1 >>".to_vec()));
    assert_eq!(compact(&raw), "<< /Custom 1 >>");
    assert_eq!(clean(&raw), "<< /Custom 1 >>");
}

#[test]
fn test_from_conversions() {
    assert_eq!(Value::from(true), Value::Bool(true));
    assert_eq!(Value::from(3i64), Value::Integer(3));
    assert_eq!(Value::from(3u32), Value::Integer(3));
    assert_eq!(Value::from(0.5f32), Value::Real(0.5));
    assert_eq!(Value::from(String::from("s")), Value::from("s"));
    assert_eq!(Value::from(ObjectId::from((5, 1))), Value::Reference(ObjectId::new(5, 1)));
}
