//! Store event listeners and the pluggable stream factory

use crate::objects::{ObjectId, PdfObject, Stream};
use std::fmt;

/// Listener for store events, typically a writer that serializes objects
/// as they are produced.
///
/// Every method has an empty default, so implementors only override the
/// events they care about.
pub trait Observer {
    fn write_object(&mut self, _object: &PdfObject) {}

    /// Called before the stream of `owner` starts receiving data.
    fn begin_append_stream(&mut self, _owner: ObjectId, _stream: &Stream) {}

    /// Called after the stream of `owner` has been flushed.
    fn end_append_stream(&mut self, _owner: ObjectId, _stream: &Stream) {}

    fn finish(&mut self) {}
}

/// Creates the stream attached to an object on first use.
pub trait StreamFactory {
    fn create_stream(&self, owner: ObjectId) -> Stream;
}

/// Token returned by [`ObserverList::attach`], used to detach again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

/// Registered observers, notified in registration order.
#[derive(Default)]
pub struct ObserverList {
    next_id: u64,
    observers: Vec<(ObserverId, Box<dyn Observer>)>,
}

impl ObserverList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, observer: Box<dyn Observer>) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, observer));
        id
    }

    pub fn detach(&mut self, id: ObserverId) -> Option<Box<dyn Observer>> {
        let index = self.observers.iter().position(|(other, _)| *other == id)?;
        Some(self.observers.remove(index).1)
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn write_object(&mut self, object: &PdfObject) {
        for (_, observer) in &mut self.observers {
            observer.write_object(object);
        }
    }

    pub fn begin_append_stream(&mut self, owner: ObjectId, stream: &Stream) {
        for (_, observer) in &mut self.observers {
            observer.begin_append_stream(owner, stream);
        }
    }

    pub fn end_append_stream(&mut self, owner: ObjectId, stream: &Stream) {
        for (_, observer) in &mut self.observers {
            observer.end_append_stream(owner, stream);
        }
    }

    pub fn finish(&mut self) {
        for (_, observer) in &mut self.observers {
            observer.finish();
        }
    }
}

impl fmt::Debug for ObserverList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverList")
            .field("observers", &self.observers.len())
            .finish()
    }
}
