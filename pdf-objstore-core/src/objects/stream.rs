use crate::error::{PdfError, Result};
use crate::filters::{self, EncodePipeline, FilterRegistry, FilterType};
use crate::objects::Dictionary;
use std::fmt;
use std::io::Read;

/// Backing storage for a stream's encoded bytes.
///
/// The store keeps everything in memory by default; a custom
/// [`StreamFactory`](crate::store::StreamFactory) can supply another buffer.
pub trait StreamBuffer: fmt::Debug {
    fn clear(&mut self);

    fn write(&mut self, data: &[u8]) -> Result<()>;

    fn as_bytes(&self) -> &[u8];

    fn len(&self) -> usize {
        self.as_bytes().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryBuffer {
    data: Vec<u8>,
}

impl StreamBuffer for MemoryBuffer {
    fn clear(&mut self) {
        self.data.clear();
    }

    fn write(&mut self, data: &[u8]) -> Result<()> {
        self.data.extend_from_slice(data);
        Ok(())
    }

    fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

enum AppendState {
    Idle,
    Appending(EncodePipeline),
}

/// Encoded payload of a stream object.
///
/// The stream's filters live in the owning object's dictionary, so every
/// operation that reads or changes them takes that dictionary explicitly.
/// Callers normally go through [`StreamHandle`](crate::store::StreamHandle),
/// which also marks the owner dirty and notifies store observers.
pub struct Stream {
    buffer: Box<dyn StreamBuffer>,
    filters: Vec<FilterType>,
    state: AppendState,
}

impl Stream {
    pub fn new() -> Self {
        Self::with_buffer(Box::<MemoryBuffer>::default())
    }

    pub fn with_buffer(buffer: Box<dyn StreamBuffer>) -> Self {
        Self {
            buffer,
            filters: Vec::new(),
            state: AppendState::Idle,
        }
    }

    /// Length of the encoded data.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// The encoded bytes, exactly as they would be written to a file.
    pub fn raw_data(&self) -> &[u8] {
        self.buffer.as_bytes()
    }

    /// Filters the current content was encoded with.
    pub fn filters(&self) -> &[FilterType] {
        &self.filters
    }

    pub fn is_appending(&self) -> bool {
        matches!(self.state, AppendState::Appending(_))
    }

    pub(crate) fn ensure_idle(&self) -> Result<()> {
        if self.is_appending() {
            return Err(PdfError::InvalidState(
                "BeginAppend() failed because EndAppend() was not yet called".to_string(),
            ));
        }
        Ok(())
    }

    /// Starts an append transaction.
    ///
    /// With `clear_existing` unset, current content is decoded and re-encoded
    /// with the new filter list. Codec errors leave the stream and the
    /// dictionary untouched; a failing [`StreamBuffer::write`] may leave the
    /// buffer cleared, but the stream is idle either way.
    pub fn begin_append(
        &mut self,
        dictionary: &mut Dictionary,
        filters: &[FilterType],
        clear_existing: bool,
        registry: &FilterRegistry,
    ) -> Result<()> {
        let prepared = self.prepare_append(dictionary, filters, clear_existing, registry)?;
        self.commit_append(dictionary, prepared)
    }

    /// Builds the encoders and re-encodes kept content without touching the
    /// stream.
    pub(crate) fn prepare_append(
        &self,
        dictionary: &Dictionary,
        filters: &[FilterType],
        clear_existing: bool,
        registry: &FilterRegistry,
    ) -> Result<PreparedAppend> {
        self.ensure_idle()?;

        let mut pipeline = EncodePipeline::new(registry, filters, dictionary)?;
        let mut carried = Vec::new();
        if !clear_existing && !self.buffer.is_empty() {
            let existing = self.filtered_copy(dictionary, registry)?;
            pipeline.encode(&existing, &mut carried)?;
        }
        Ok(PreparedAppend {
            filters: filters.to_vec(),
            pipeline,
            carried,
        })
    }

    /// Installs a prepared transaction.
    pub(crate) fn commit_append(
        &mut self,
        dictionary: &mut Dictionary,
        prepared: PreparedAppend,
    ) -> Result<()> {
        self.buffer.clear();
        self.buffer.write(&prepared.carried)?;

        filters::set_filter_key(dictionary, &prepared.filters);
        self.filters = prepared.filters;
        self.state = AppendState::Appending(prepared.pipeline);
        Ok(())
    }

    pub fn append(&mut self, data: &[u8]) -> Result<()> {
        let AppendState::Appending(pipeline) = &mut self.state else {
            return Err(PdfError::InvalidState(
                "Append() failed because BeginAppend() was not yet called".to_string(),
            ));
        };

        let mut encoded = Vec::new();
        pipeline.encode(data, &mut encoded)?;
        self.buffer.write(&encoded)
    }

    /// Flushes the encoders and closes the transaction. The stream is idle
    /// afterwards even if flushing fails.
    pub fn end_append(&mut self, dictionary: &mut Dictionary) -> Result<()> {
        let AppendState::Appending(mut pipeline) =
            std::mem::replace(&mut self.state, AppendState::Idle)
        else {
            return Err(PdfError::InvalidState(
                "EndAppend() failed because BeginAppend() was not yet called".to_string(),
            ));
        };

        let mut tail = Vec::new();
        pipeline.finish(&mut tail)?;
        self.buffer.write(&tail)?;
        self.refresh_length(dictionary);
        Ok(())
    }

    /// Replaces the content with already-encoded bytes.
    ///
    /// Reads `length` bytes, or the whole source when `None`. The `/Filter`
    /// key is left alone: the caller vouches that it describes the data.
    pub fn set_raw_data(
        &mut self,
        dictionary: &mut Dictionary,
        reader: &mut dyn Read,
        length: Option<usize>,
    ) -> Result<()> {
        self.ensure_idle()?;

        let mut data = Vec::new();
        match length {
            Some(length) => {
                reader.take(length as u64).read_to_end(&mut data)?;
            }
            None => {
                reader.read_to_end(&mut data)?;
            }
        }

        self.filters = filters::filters_from_dictionary(dictionary).unwrap_or_else(|err| {
            tracing::warn!("Raw stream data with unreadable /Filter: {err}");
            Vec::new()
        });
        self.buffer.clear();
        self.buffer.write(&data)?;
        self.refresh_length(dictionary);
        Ok(())
    }

    /// Decodes the content through the filters named in `dictionary`.
    ///
    /// Without filters the raw bytes are returned unchanged.
    pub fn filtered_copy(
        &self,
        dictionary: &Dictionary,
        registry: &FilterRegistry,
    ) -> Result<Vec<u8>> {
        let filters = filters::filters_from_dictionary(dictionary)?;
        if filters.is_empty() {
            return Ok(self.raw_data().to_vec());
        }
        registry.decode(self.raw_data(), &filters, dictionary)
    }

    fn refresh_length(&self, dictionary: &mut Dictionary) {
        dictionary.set(Dictionary::KEY_LENGTH, self.len());
    }
}

/// An append transaction whose encoders are ready and whose kept content
/// is already re-encoded.
pub(crate) struct PreparedAppend {
    filters: Vec<FilterType>,
    pipeline: EncodePipeline,
    carried: Vec<u8>,
}

impl Default for Stream {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stream")
            .field("len", &self.len())
            .field("filters", &self.filters)
            .field("appending", &self.is_appending())
            .finish()
    }
}
