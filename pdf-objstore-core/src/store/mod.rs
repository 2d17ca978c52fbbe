//! Indirect object store
//!
//! [`ObjectStore`] owns every indirect object of a document. It hands out
//! object ids, recycles the ids of deleted objects with a bumped generation,
//! removes unreachable objects and renumbers the survivors into a dense
//! range before a document is written.
//!
//! # Example
//!
//! ```rust
//! use pdf_objstore::objects::{Dictionary, ObjectId, Value};
//! use pdf_objstore::store::ObjectStore;
//!
//! # fn main() -> pdf_objstore::Result<()> {
//! let mut store = ObjectStore::new();
//! let page = store.create_dictionary_object(Some("Page"))?.id();
//!
//! let mut catalog = Dictionary::new();
//! catalog.set("Kids", vec![Value::Reference(page)]);
//! let root = store.create_object(catalog)?.id();
//!
//! store.stream_mut(page)?.set(b"BT ET")?;
//! assert_eq!(store.filtered_copy(page)?, b"BT ET");
//!
//! assert_eq!(root, ObjectId::new(2, 0));
//! # Ok(())
//! # }
//! ```

mod allocator;
mod gc;
mod handle;
mod observer;

pub use allocator::IdAllocator;
pub use gc::{PathStep, RefHolder, RefLocation};
pub use handle::StreamHandle;
pub use observer::{Observer, ObserverId, ObserverList, StreamFactory};

use crate::error::{PdfError, Result};
use crate::filters::{FilterRegistry, FilterType};
use crate::objects::{Dictionary, Name, ObjectId, PdfObject, Stream, Value};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Highest generation number a cross-reference entry can hold.
pub const MAX_GENERATION: u16 = 65535;

/// Highest object number handed out by default.
pub const MAX_OBJECT_NUMBER: u32 = 8_388_607;

/// Configuration options for an [`ObjectStore`]
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Reuse the numbers of removed objects with a bumped generation
    pub can_reuse_object_numbers: bool,
    /// Filter applied by [`StreamHandle::set`]; `None` stores data unencoded
    pub default_filter: Option<FilterType>,
    /// A freed id whose next generation reaches this value is retired
    pub max_generation: u16,
    /// Upper bound for newly allocated object numbers
    pub max_object_number: u32,
}

/// Flate when it is compiled in, unencoded otherwise.
fn default_filter() -> Option<FilterType> {
    if cfg!(feature = "compression") {
        Some(FilterType::FlateDecode)
    } else {
        None
    }
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            can_reuse_object_numbers: true,
            default_filter: default_filter(),
            max_generation: MAX_GENERATION,
            max_object_number: MAX_OBJECT_NUMBER,
        }
    }
}

impl StoreOptions {
    /// Enable or disable object number reuse
    pub fn with_reuse_object_numbers(mut self, enabled: bool) -> Self {
        self.can_reuse_object_numbers = enabled;
        self
    }

    /// Set the default stream filter
    pub fn with_default_filter(mut self, filter: Option<FilterType>) -> Self {
        self.default_filter = filter;
        self
    }

    /// Set the generation ceiling
    pub fn with_max_generation(mut self, max_generation: u16) -> Self {
        self.max_generation = max_generation;
        self
    }

    /// Set the largest object number
    pub fn with_max_object_number(mut self, max_object_number: u32) -> Self {
        self.max_object_number = max_object_number;
        self
    }
}

/// The collection of all indirect objects of a document, keyed by id.
pub struct ObjectStore {
    objects: BTreeMap<ObjectId, PdfObject>,
    allocator: IdAllocator,
    observers: ObserverList,
    stream_factory: Option<Box<dyn StreamFactory>>,
    filters: FilterRegistry,
    options: StoreOptions,
}

impl ObjectStore {
    pub fn new() -> Self {
        Self::with_options(StoreOptions::default())
    }

    pub fn with_options(options: StoreOptions) -> Self {
        Self {
            objects: BTreeMap::new(),
            allocator: IdAllocator::new(
                options.can_reuse_object_numbers,
                options.max_generation,
                options.max_object_number,
            ),
            observers: ObserverList::new(),
            stream_factory: None,
            filters: FilterRegistry::default(),
            options,
        }
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// Default filter used by [`StreamHandle::set`].
    pub fn set_default_filter(&mut self, filter: Option<FilterType>) {
        self.options.default_filter = filter;
    }

    // Lifecycle

    /// Inserts `value` under the next free id.
    pub fn create_object(&mut self, value: impl Into<Value>) -> Result<&mut PdfObject> {
        let id = self.allocator.allocate()?;
        self.allocator.try_increment_object_count(id);
        debug!("Creating object {id}");

        match self.objects.entry(id) {
            Entry::Vacant(entry) => Ok(entry.insert(PdfObject::new(id, value.into()))),
            Entry::Occupied(_) => Err(PdfError::InvalidState(format!(
                "Allocated id {id} is already in use"
            ))),
        }
    }

    /// Creates an empty dictionary object, with a `/Type` entry when
    /// `type_name` is given.
    pub fn create_dictionary_object(&mut self, type_name: Option<&str>) -> Result<&mut PdfObject> {
        let mut dict = Dictionary::new();
        if let Some(type_name) = type_name {
            dict.set(Dictionary::KEY_TYPE, Name::from(type_name));
        }
        self.create_object(dict)
    }

    /// Inserts or replaces the object at a caller-chosen id, as a loader
    /// does when reading objects from a file.
    pub fn push_object(&mut self, id: ObjectId, value: impl Into<Value>) -> Result<&mut PdfObject> {
        if id.number() == 0 || id.number() > self.options.max_object_number {
            return Err(PdfError::ValueOutOfRange(format!(
                "Object number {} is outside 1..={}",
                id.number(),
                self.options.max_object_number
            )));
        }

        self.allocator.claim_number(id.number());
        self.allocator.try_increment_object_count(id);

        let object = PdfObject::new(id, value.into());
        match self.objects.entry(id) {
            Entry::Vacant(entry) => Ok(entry.insert(object)),
            Entry::Occupied(mut entry) => {
                debug!("Replacing object {id}");
                entry.insert(object);
                Ok(entry.into_mut())
            }
        }
    }

    pub fn get_object(&self, id: ObjectId) -> Option<&PdfObject> {
        self.objects.get(&id)
    }

    pub fn get_object_mut(&mut self, id: ObjectId) -> Option<&mut PdfObject> {
        self.objects.get_mut(&id)
    }

    pub fn must_get_object(&self, id: ObjectId) -> Result<&PdfObject> {
        self.objects.get(&id).ok_or(PdfError::MissingObject(id))
    }

    pub fn must_get_object_mut(&mut self, id: ObjectId) -> Result<&mut PdfObject> {
        self.objects.get_mut(&id).ok_or(PdfError::MissingObject(id))
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    /// Detaches the object and hands it to the caller.
    ///
    /// With `mark_as_free` the id is pooled for reuse with the next
    /// generation, or retired if that generation would be exhausted.
    pub fn remove_object(&mut self, id: ObjectId, mark_as_free: bool) -> Option<PdfObject> {
        let object = self.objects.remove(&id)?;
        debug!("Removed object {id}");
        if mark_as_free {
            self.allocator.release(id);
        }
        Some(object)
    }

    /// Removes every object and forgets all id bookkeeping. Observers,
    /// filters and the stream factory are kept.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.allocator = IdAllocator::new(
            self.options.can_reuse_object_numbers,
            self.options.max_generation,
            self.options.max_object_number,
        );
    }

    // Free ids

    /// Pools `id` as given. Duplicates are ignored, and so are numbers
    /// held by a live object.
    pub fn add_free_object(&mut self, id: ObjectId) {
        if self.number_in_use(id.number()) {
            debug!("Not freeing {id}: number {} is in use", id.number());
            return;
        }
        self.allocator.add_free(id);
    }

    /// Pools `id` unless its generation is exhausted; exhausted numbers are
    /// retired instead. Returns whether `id` is now pooled, which is never
    /// the case for a number held by a live object.
    pub fn try_add_free_object(&mut self, id: ObjectId) -> bool {
        if self.number_in_use(id.number()) {
            debug!("Not freeing {id}: number {} is in use", id.number());
            return false;
        }
        self.allocator.try_add_free(id)
    }

    /// Pools the successor generation of `id`, returning it, or `None` if
    /// nothing was pooled: the number was retired, reuse is disabled, or a
    /// live object holds the number.
    pub fn safe_add_free_object(&mut self, id: ObjectId) -> Option<u16> {
        if self.number_in_use(id.number()) {
            debug!("Not freeing {id}: number {} is in use", id.number());
            return None;
        }
        self.allocator.release(id)
    }

    fn number_in_use(&self, number: u32) -> bool {
        self.objects
            .range(ObjectId::new(number, 0)..=ObjectId::new(number, u16::MAX))
            .next()
            .is_some()
    }

    /// Marks an object number as never to be handed out.
    pub fn reserve_object_number(&mut self, number: u32) {
        self.allocator.reserve(number);
    }

    pub fn set_can_reuse_object_numbers(&mut self, can_reuse: bool) {
        self.options.can_reuse_object_numbers = can_reuse;
        self.allocator.set_can_reuse(can_reuse);
    }

    pub fn can_reuse_object_numbers(&self) -> bool {
        self.allocator.can_reuse()
    }

    pub fn try_increment_object_count(&mut self, id: ObjectId) -> bool {
        self.allocator.try_increment_object_count(id)
    }

    /// Pooled ids in ascending order.
    pub fn free_objects(&self) -> Vec<ObjectId> {
        self.allocator.free_ids().collect()
    }

    // Queries

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn get_size(&self) -> usize {
        self.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Highest object number in use or freed so far.
    pub fn object_count(&self) -> u32 {
        self.allocator.object_count()
    }

    /// Objects in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &PdfObject> {
        self.objects.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut PdfObject> {
        self.objects.values_mut()
    }

    pub fn ids(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.objects.keys().copied()
    }

    // Observers

    pub fn attach_observer(&mut self, observer: Box<dyn Observer>) -> ObserverId {
        self.observers.attach(observer)
    }

    pub fn detach_observer(&mut self, id: ObserverId) -> Option<Box<dyn Observer>> {
        self.observers.detach(id)
    }

    /// Notifies observers that object `id` should be written.
    pub fn write_object(&mut self, id: ObjectId) -> Result<()> {
        let object = self.objects.get(&id).ok_or(PdfError::MissingObject(id))?;
        self.observers.write_object(object);
        Ok(())
    }

    pub fn begin_append_stream(&mut self, owner: ObjectId, stream: &Stream) {
        self.observers.begin_append_stream(owner, stream);
    }

    pub fn end_append_stream(&mut self, owner: ObjectId, stream: &Stream) {
        self.observers.end_append_stream(owner, stream);
    }

    /// Signals observers that the document is complete.
    pub fn finish(&mut self) {
        self.observers.finish();
    }

    // Streams

    /// Factory for streams created by [`ObjectStore::stream_mut`]; `None`
    /// restores in-memory streams.
    pub fn set_stream_factory(&mut self, factory: Option<Box<dyn StreamFactory>>) {
        self.stream_factory = factory;
    }

    pub fn filter_registry(&self) -> &FilterRegistry {
        &self.filters
    }

    pub fn filter_registry_mut(&mut self) -> &mut FilterRegistry {
        &mut self.filters
    }

    pub fn set_filter_registry(&mut self, registry: FilterRegistry) {
        self.filters = registry;
    }

    pub fn stream(&self, id: ObjectId) -> Option<&Stream> {
        self.objects.get(&id).and_then(PdfObject::stream)
    }

    /// Write access to the stream of object `id`, creating the stream on
    /// first use. The object's value must be a dictionary.
    pub fn stream_mut(&mut self, id: ObjectId) -> Result<StreamHandle<'_>> {
        let object = self
            .objects
            .get_mut(&id)
            .ok_or(PdfError::MissingObject(id))?;
        object.value().get_dictionary()?;

        if !object.has_stream() {
            let stream = match &self.stream_factory {
                Some(factory) => factory.create_stream(id),
                None => Stream::new(),
            };
            object.install_stream(stream);
        }

        let (stream, dictionary, dirty) = object.stream_parts()?;
        Ok(StreamHandle {
            owner: id,
            stream,
            dictionary,
            dirty,
            observers: &mut self.observers,
            registry: &self.filters,
            default_filter: self.options.default_filter,
        })
    }

    /// Decoded content of the stream of object `id`.
    pub fn filtered_copy(&self, id: ObjectId) -> Result<Vec<u8>> {
        let object = self.must_get_object(id)?;
        let stream = object.must_get_stream()?;
        stream.filtered_copy(object.dictionary()?, &self.filters)
    }

    /// Copies the encoded stream of `from` into `to`, along with the
    /// `/Filter` and `/DecodeParms` entries that describe it.
    pub fn copy_stream(&mut self, from: ObjectId, to: ObjectId) -> Result<()> {
        let source = self.must_get_object(from)?;
        let data = source.must_get_stream()?.raw_data().to_vec();
        let source_dict = source.dictionary()?;
        let filter = source_dict.get(Dictionary::KEY_FILTER).cloned();
        let params = source_dict.get(Dictionary::KEY_DECODE_PARMS).cloned();

        let mut handle = self.stream_mut(to)?;
        for (key, value) in [
            (Dictionary::KEY_FILTER, filter),
            (Dictionary::KEY_DECODE_PARMS, params),
        ] {
            match value {
                Some(value) => handle.dictionary.set(key, value),
                None => {
                    handle.dictionary.remove(key);
                }
            }
        }
        handle.set_raw_data(&mut data.as_slice(), None, true)
    }
}

impl Default for ObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ObjectStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectStore")
            .field("objects", &self.objects.len())
            .field("allocator", &self.allocator)
            .field("observers", &self.observers)
            .field("filters", &self.filters)
            .finish()
    }
}
