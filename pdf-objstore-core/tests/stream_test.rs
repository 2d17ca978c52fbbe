//! Integration tests for stream transactions, filters, observers and the
//! stream factory

use pdf_objstore::filters::{FilterEncoder, FilterType, StreamFilter};
use pdf_objstore::objects::{
    Dictionary, MemoryBuffer, Name, ObjectId, PdfObject, Stream, StreamBuffer, Value,
};
use pdf_objstore::store::{ObjectStore, Observer, StoreOptions, StreamFactory};
use pdf_objstore::PdfError;
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::io::{self, Read};
use std::rc::Rc;

fn store_with_stream_object() -> (ObjectStore, ObjectId) {
    let mut store = ObjectStore::new();
    let id = store.create_dictionary_object(Some("XObject")).unwrap().id();
    (store, id)
}

#[cfg(feature = "compression")]
#[test]
fn test_set_uses_default_filter() {
    let (mut store, id) = store_with_stream_object();
    store.stream_mut(id).unwrap().set(b"Hello").unwrap();

    let object = store.must_get_object(id).unwrap();
    let dict = object.dictionary().unwrap();
    assert_eq!(
        dict.get("Filter"),
        Some(&Value::Name(Name::from("FlateDecode")))
    );
    assert_eq!(
        dict.get("Length"),
        Some(&Value::from(object.must_get_stream().unwrap().len()))
    );
    assert!(object.is_dirty());
    assert_ne!(object.must_get_stream().unwrap().raw_data(), b"Hello");
    assert_eq!(store.filtered_copy(id).unwrap(), b"Hello");
}

#[test]
fn test_set_without_default_filter_stores_plain_bytes() {
    let options = StoreOptions::default().with_default_filter(None);
    let mut store = ObjectStore::with_options(options);
    let id = store.create_dictionary_object(None).unwrap().id();

    store.stream_mut(id).unwrap().set(b"plain").unwrap();

    let object = store.must_get_object(id).unwrap();
    assert!(!object.dictionary().unwrap().contains_key("Filter"));
    assert_eq!(object.must_get_stream().unwrap().raw_data(), b"plain");
}

#[cfg(not(feature = "compression"))]
#[test]
fn test_default_options_store_plain_bytes_without_compression() {
    let (mut store, id) = store_with_stream_object();
    assert_eq!(store.options().default_filter, None);

    store.stream_mut(id).unwrap().set(b"Hello").unwrap();

    let object = store.must_get_object(id).unwrap();
    assert!(!object.dictionary().unwrap().contains_key("Filter"));
    assert_eq!(object.must_get_stream().unwrap().raw_data(), b"Hello");
}

#[test]
fn test_filter_key_shape_follows_filter_count() {
    let (mut store, id) = store_with_stream_object();
    let mut handle = store.stream_mut(id).unwrap();

    handle
        .set_with_filters(b"abc", &[FilterType::ASCIIHexDecode, FilterType::RunLengthDecode])
        .unwrap();
    assert_eq!(
        handle.dictionary().get("Filter"),
        Some(&Value::from(vec![
            Value::Name(Name::from("ASCIIHexDecode")),
            Value::Name(Name::from("RunLengthDecode")),
        ]))
    );
    assert_eq!(handle.filtered_copy().unwrap(), b"abc");

    handle.set_with_filters(b"abc", &[]).unwrap();
    assert!(!handle.dictionary().contains_key("Filter"));
    assert_eq!(handle.stream().raw_data(), b"abc");
}

#[test]
fn test_append_protocol_violations() {
    let (mut store, id) = store_with_stream_object();
    let mut handle = store.stream_mut(id).unwrap();

    assert!(matches!(handle.append(b"x"), Err(PdfError::InvalidState(_))));
    assert!(matches!(handle.end_append(), Err(PdfError::InvalidState(_))));

    handle.begin_append(&[], true, true).unwrap();
    assert!(matches!(
        handle.begin_append(&[], true, true),
        Err(PdfError::InvalidState(_))
    ));
    assert!(matches!(handle.set(b"x"), Err(PdfError::InvalidState(_))));
    handle.end_append().unwrap();
}

#[test]
fn test_multi_chunk_append_with_filter() {
    let (mut store, id) = store_with_stream_object();
    let mut handle = store.stream_mut(id).unwrap();

    handle
        .begin_append(&[FilterType::ASCII85Decode], true, true)
        .unwrap();
    for chunk in ["Man ", "is d", "isting", "uished"] {
        handle.append(chunk.as_bytes()).unwrap();
    }
    handle.end_append().unwrap();

    assert_eq!(handle.filtered_copy().unwrap(), b"Man is distinguished");
    assert!(handle.stream().raw_data().ends_with(b"~>"));
}

#[test]
fn test_keeping_existing_content_across_filter_change() {
    let (mut store, id) = store_with_stream_object();
    let mut handle = store.stream_mut(id).unwrap();

    handle
        .set_with_filters(b"first ", &[FilterType::ASCIIHexDecode])
        .unwrap();
    handle
        .begin_append(&[FilterType::RunLengthDecode], false, true)
        .unwrap();
    handle.append(b"second").unwrap();
    handle.end_append().unwrap();

    assert_eq!(
        handle.dictionary().get_name("Filter").map(Name::as_str),
        Some("RunLengthDecode")
    );
    assert_eq!(handle.filtered_copy().unwrap(), b"first second");
}

#[test]
fn test_set_with_empty_buffer_is_a_no_op() {
    let (mut store, id) = store_with_stream_object();
    store.stream_mut(id).unwrap().set(b"").unwrap();

    let object = store.must_get_object(id).unwrap();
    assert!(!object.dictionary().unwrap().contains_key("Length"));
    assert!(object.must_get_stream().unwrap().is_empty());
}

#[test]
fn test_set_from_reader() {
    let (mut store, id) = store_with_stream_object();
    let payload = vec![b'q'; 10_000];

    store
        .stream_mut(id)
        .unwrap()
        .set_from_reader_with_filters(&mut payload.as_slice(), &[FilterType::RunLengthDecode])
        .unwrap();

    assert_eq!(store.filtered_copy(id).unwrap(), payload);
}

struct FailingReader;

impl Read for FailingReader {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "source closed"))
    }
}

#[test]
fn test_set_from_failing_reader_closes_transaction() {
    let (mut store, id) = store_with_stream_object();
    let mut handle = store.stream_mut(id).unwrap();

    assert!(matches!(
        handle.set_from_reader_with_filters(&mut FailingReader, &[]),
        Err(PdfError::Io(_))
    ));
    assert!(!handle.stream().is_appending());
    handle.set_with_filters(b"ok", &[]).unwrap();
}

#[test]
fn test_set_raw_data_keeps_bytes_verbatim() {
    let (mut store, id) = store_with_stream_object();
    {
        let mut handle = store.stream_mut(id).unwrap();
        handle.set_with_filters(b"zz", &[FilterType::ASCIIHexDecode]).unwrap();
        handle
            .set_raw_data(&mut &b"48656C6C6F>trailing"[..], Some(11), false)
            .unwrap();
        assert_eq!(handle.stream().raw_data(), b"48656C6C6F>");
        assert_eq!(handle.dictionary().get("Length"), Some(&Value::Integer(11)));
    }

    assert_eq!(store.filtered_copy(id).unwrap(), b"Hello");
}

#[test]
fn test_copy_stream_between_objects() {
    let (mut store, source) = store_with_stream_object();
    let target = store.create_dictionary_object(None).unwrap().id();

    store
        .stream_mut(source)
        .unwrap()
        .set_with_filters(b"shared", &[FilterType::ASCIIHexDecode])
        .unwrap();
    store.copy_stream(source, target).unwrap();

    assert_eq!(
        store.stream(target).map(Stream::raw_data),
        store.stream(source).map(Stream::raw_data)
    );
    assert_eq!(store.filtered_copy(target).unwrap(), b"shared");
    assert!(matches!(
        store.copy_stream(target, ObjectId::new(50, 0)),
        Err(PdfError::MissingObject(_))
    ));
}

#[test]
fn test_handle_copy_from_stream() {
    let (mut store, id) = store_with_stream_object();
    let mut other = Stream::new();
    let mut other_dict = Dictionary::new();
    other.set_raw_data(&mut other_dict, &mut &b"raw"[..], None).unwrap();

    let mut handle = store.stream_mut(id).unwrap();
    handle.copy_from(&other).unwrap();
    assert_eq!(handle.stream().raw_data(), b"raw");
    assert_eq!(handle.owner(), id);
}

type EventLog = Rc<RefCell<Vec<String>>>;

struct Recorder {
    name: &'static str,
    log: EventLog,
}

impl Observer for Recorder {
    fn write_object(&mut self, object: &PdfObject) {
        self.log
            .borrow_mut()
            .push(format!("{} write {}", self.name, object.id()));
    }

    fn begin_append_stream(&mut self, owner: ObjectId, _stream: &Stream) {
        self.log
            .borrow_mut()
            .push(format!("{} begin {}", self.name, owner.number()));
    }

    fn end_append_stream(&mut self, owner: ObjectId, stream: &Stream) {
        self.log.borrow_mut().push(format!(
            "{} end {} ({} bytes)",
            self.name,
            owner.number(),
            stream.len()
        ));
    }

    fn finish(&mut self) {
        self.log.borrow_mut().push(format!("{} finish", self.name));
    }
}

#[test]
fn test_observers_hear_stream_transactions_in_order() {
    let log = EventLog::default();
    let (mut store, id) = store_with_stream_object();
    let first = store.attach_observer(Box::new(Recorder {
        name: "a",
        log: Rc::clone(&log),
    }));
    store.attach_observer(Box::new(Recorder {
        name: "b",
        log: Rc::clone(&log),
    }));

    store
        .stream_mut(id)
        .unwrap()
        .set_with_filters(b"1234", &[])
        .unwrap();
    store.write_object(id).unwrap();
    assert!(store.detach_observer(first).is_some());
    store.finish();

    assert_eq!(
        *log.borrow(),
        vec![
            "a begin 1",
            "b begin 1",
            "a end 1 (4 bytes)",
            "b end 1 (4 bytes)",
            "a write 1 0 R",
            "b write 1 0 R",
            "b finish",
        ]
    );
    assert!(matches!(
        store.write_object(ObjectId::new(8, 0)),
        Err(PdfError::MissingObject(_))
    ));
}

#[derive(Debug, Default)]
struct CountingBuffer {
    inner: MemoryBuffer,
    writes: Rc<RefCell<usize>>,
}

impl StreamBuffer for CountingBuffer {
    fn clear(&mut self) {
        self.inner.clear();
    }

    fn write(&mut self, data: &[u8]) -> pdf_objstore::Result<()> {
        *self.writes.borrow_mut() += 1;
        self.inner.write(data)
    }

    fn as_bytes(&self) -> &[u8] {
        self.inner.as_bytes()
    }
}

struct CountingFactory {
    writes: Rc<RefCell<usize>>,
    created: Rc<RefCell<Vec<ObjectId>>>,
}

impl StreamFactory for CountingFactory {
    fn create_stream(&self, owner: ObjectId) -> Stream {
        self.created.borrow_mut().push(owner);
        Stream::with_buffer(Box::new(CountingBuffer {
            inner: MemoryBuffer::default(),
            writes: Rc::clone(&self.writes),
        }))
    }
}

#[test]
fn test_stream_factory_supplies_buffers() {
    let writes = Rc::new(RefCell::new(0));
    let created = Rc::new(RefCell::new(Vec::new()));
    let (mut store, id) = store_with_stream_object();
    store.set_stream_factory(Some(Box::new(CountingFactory {
        writes: Rc::clone(&writes),
        created: Rc::clone(&created),
    })));

    store
        .stream_mut(id)
        .unwrap()
        .set_with_filters(b"data", &[])
        .unwrap();
    // The stream already exists, so the factory is not asked again
    store
        .stream_mut(id)
        .unwrap()
        .set_with_filters(b"more", &[])
        .unwrap();

    assert_eq!(*created.borrow(), vec![id]);
    assert!(*writes.borrow() >= 2);
    assert_eq!(store.filtered_copy(id).unwrap(), b"more");
}

#[test]
fn test_unknown_filter_leaves_stream_untouched() {
    let (mut store, id) = store_with_stream_object();
    let mut handle = store.stream_mut(id).unwrap();
    handle.set_with_filters(b"keep", &[]).unwrap();

    let err = handle
        .set_with_filters(b"lost", &[FilterType::JBIG2Decode])
        .unwrap_err();
    assert!(matches!(err, PdfError::UnsupportedFilter(_)));
    assert!(!handle.stream().is_appending());
    assert_eq!(handle.stream().raw_data(), b"keep");
    assert!(!handle.dictionary().contains_key("Filter"));
}

struct FailingCodec;
struct FailingEncoder;

impl FilterEncoder for FailingEncoder {
    fn encode(&mut self, _input: &[u8], _out: &mut Vec<u8>) -> pdf_objstore::Result<()> {
        Err(PdfError::FilterError("codec failure".to_string()))
    }

    fn finish(&mut self, _out: &mut Vec<u8>) -> pdf_objstore::Result<()> {
        Ok(())
    }
}

impl StreamFilter for FailingCodec {
    fn filter_type(&self) -> FilterType {
        FilterType::Crypt
    }

    fn encoder(&self, _params: Option<&Dictionary>) -> pdf_objstore::Result<Box<dyn FilterEncoder>> {
        Ok(Box::new(FailingEncoder))
    }

    fn decode(&self, data: &[u8], _params: Option<&Dictionary>) -> pdf_objstore::Result<Vec<u8>> {
        Ok(data.to_vec())
    }
}

#[test]
fn test_failing_encoder_closes_set_transaction() {
    let (mut store, id) = store_with_stream_object();
    store.filter_registry_mut().register(Box::new(FailingCodec));
    let mut handle = store.stream_mut(id).unwrap();

    let err = handle
        .set_with_filters(b"abc", &[FilterType::Crypt])
        .unwrap_err();
    assert!(matches!(err, PdfError::FilterError(_)));
    assert!(!handle.stream().is_appending());

    handle.set_with_filters(b"abc", &[]).unwrap();
    assert_eq!(handle.stream().raw_data(), b"abc");
}

struct ContentSnapshot {
    seen: Rc<RefCell<Vec<Vec<u8>>>>,
}

impl Observer for ContentSnapshot {
    fn begin_append_stream(&mut self, _owner: ObjectId, stream: &Stream) {
        self.seen.borrow_mut().push(stream.raw_data().to_vec());
    }
}

#[test]
fn test_begin_notification_precedes_carried_content() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let (mut store, id) = store_with_stream_object();
    store
        .stream_mut(id)
        .unwrap()
        .set_with_filters(b"abc", &[FilterType::ASCIIHexDecode])
        .unwrap();
    store.attach_observer(Box::new(ContentSnapshot {
        seen: Rc::clone(&seen),
    }));

    let mut handle = store.stream_mut(id).unwrap();
    handle
        .begin_append(&[FilterType::ASCII85Decode], false, true)
        .unwrap();
    handle.append(b"def").unwrap();
    handle.end_append().unwrap();

    // The observer saw the stream before it was re-encoded
    assert_eq!(*seen.borrow(), vec![b"616263>".to_vec()]);
    assert_eq!(store.filtered_copy(id).unwrap(), b"abcdef");
}
