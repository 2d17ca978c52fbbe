use crate::error::Result;
use crate::filters::{FilterRegistry, FilterType};
use crate::objects::{Dictionary, ObjectId, Stream};
use crate::store::ObserverList;
use std::io::Read;

const READ_CHUNK_SIZE: usize = 4096;

/// Write access to the stream of one object in an
/// [`ObjectStore`](crate::store::ObjectStore).
///
/// The handle ties the stream to its owner: appends mark the owner dirty,
/// store observers hear about every append transaction, and the owner's
/// dictionary is kept in sync with the filters and length of the data.
pub struct StreamHandle<'a> {
    pub(super) owner: ObjectId,
    pub(super) stream: &'a mut Stream,
    pub(super) dictionary: &'a mut Dictionary,
    pub(super) dirty: &'a mut bool,
    pub(super) observers: &'a mut ObserverList,
    pub(super) registry: &'a FilterRegistry,
    pub(super) default_filter: Option<FilterType>,
}

impl StreamHandle<'_> {
    pub fn owner(&self) -> ObjectId {
        self.owner
    }

    pub fn stream(&self) -> &Stream {
        &*self.stream
    }

    pub fn dictionary(&self) -> &Dictionary {
        &*self.dictionary
    }

    fn default_filters(&self) -> Vec<FilterType> {
        self.default_filter.into_iter().collect()
    }

    /// Starts an append transaction with the given filters.
    ///
    /// Fails with [`PdfError::InvalidState`](crate::error::PdfError::InvalidState)
    /// if a transaction is already open. Observers hear about the
    /// transaction before existing content is carried over, and only once
    /// every filter is known to encode.
    pub fn begin_append(
        &mut self,
        filters: &[FilterType],
        clear_existing: bool,
        mark_dirty: bool,
    ) -> Result<()> {
        let prepared =
            self.stream
                .prepare_append(&*self.dictionary, filters, clear_existing, self.registry)?;
        if mark_dirty {
            *self.dirty = true;
        }
        self.observers.begin_append_stream(self.owner, &*self.stream);
        let committed = self.stream.commit_append(self.dictionary, prepared);
        if committed.is_err() {
            // Keep observer calls paired
            self.observers.end_append_stream(self.owner, &*self.stream);
        }
        committed
    }

    /// Starts an append transaction with the store's default filter.
    pub fn begin_append_default(&mut self, clear_existing: bool) -> Result<()> {
        let filters = self.default_filters();
        self.begin_append(&filters, clear_existing, true)
    }

    pub fn append(&mut self, data: &[u8]) -> Result<()> {
        self.stream.append(data)
    }

    pub fn end_append(&mut self) -> Result<()> {
        self.stream.end_append(self.dictionary)?;
        self.observers.end_append_stream(self.owner, &*self.stream);
        Ok(())
    }

    /// Replaces the content with `data` encoded by the default filter.
    /// An empty buffer leaves the stream untouched.
    pub fn set(&mut self, data: &[u8]) -> Result<()> {
        let filters = self.default_filters();
        self.set_with_filters(data, &filters)
    }

    pub fn set_with_filters(&mut self, data: &[u8], filters: &[FilterType]) -> Result<()> {
        if data.is_empty() {
            return Ok(());
        }
        self.begin_append(filters, true, true)?;
        let appended = self.append(data);
        let ended = self.end_append();
        appended.and(ended)
    }

    /// Replaces the content with everything `reader` yields, encoded by the
    /// default filter.
    pub fn set_from_reader(&mut self, reader: &mut dyn Read) -> Result<()> {
        let filters = self.default_filters();
        self.set_from_reader_with_filters(reader, &filters)
    }

    pub fn set_from_reader_with_filters(
        &mut self,
        reader: &mut dyn Read,
        filters: &[FilterType],
    ) -> Result<()> {
        self.begin_append(filters, true, true)?;

        let mut chunk = [0u8; READ_CHUNK_SIZE];
        let copied = loop {
            match reader.read(&mut chunk) {
                Ok(0) => break Ok(()),
                Ok(n) => {
                    if let Err(err) = self.append(&chunk[..n]) {
                        break Err(err);
                    }
                }
                Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(err) => break Err(err.into()),
            }
        };

        // Close the transaction even when reading failed
        let ended = self.end_append();
        copied.and(ended)
    }

    /// Replaces the content with already-encoded bytes; see
    /// [`Stream::set_raw_data`].
    pub fn set_raw_data(
        &mut self,
        reader: &mut dyn Read,
        length: Option<usize>,
        mark_dirty: bool,
    ) -> Result<()> {
        self.stream.ensure_idle()?;
        if mark_dirty {
            *self.dirty = true;
        }
        self.stream.set_raw_data(self.dictionary, reader, length)
    }

    /// Copies the encoded bytes of `other` without re-encoding them.
    pub fn copy_from(&mut self, other: &Stream) -> Result<()> {
        let mut data = other.raw_data();
        self.set_raw_data(&mut data, None, true)
    }

    pub fn filtered_copy(&self) -> Result<Vec<u8>> {
        self.stream.filtered_copy(&*self.dictionary, self.registry)
    }
}
