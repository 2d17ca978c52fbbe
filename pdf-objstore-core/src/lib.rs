//! # pdf-objstore
//!
//! An in-memory store for the indirect objects of a PDF document, written
//! in pure Rust.
//!
//! ## Features
//!
//! - **Object model**: the PDF value types (booleans, numbers, strings,
//!   names, arrays, dictionaries, references and null) as one [`Value`] enum
//! - **Object store**: id allocation with free-list reuse and generation
//!   bumping, garbage collection and dense renumbering
//! - **Streams**: transactional appends through a chain of stream filters
//!   (Flate, ASCIIHex, ASCII85 and RunLength built in)
//! - **Serialization**: compact and human-readable output, plus a parser for
//!   the same value grammar
//! - **Observers**: hooks for incremental writers that serialize objects as
//!   they are finished
//!
//! ## Quick Start
//!
//! ```rust
//! use pdf_objstore::{Dictionary, Name, ObjectStore, PdfWrite, Value, WriteMode};
//! use std::collections::BTreeSet;
//!
//! # fn main() -> pdf_objstore::Result<()> {
//! let mut store = ObjectStore::new();
//!
//! let content = store.create_dictionary_object(None)?.id();
//! store.stream_mut(content)?.set(b"BT /F1 12 Tf (Hello) Tj ET")?;
//!
//! let mut page = Dictionary::new();
//! page.set("Type", Name::from("Page"));
//! page.set("Contents", content);
//! let page = store.create_object(page)?.id();
//!
//! // Not referenced from anywhere
//! store.create_object("orphan")?;
//!
//! let mut trailer = Value::from(Dictionary::new());
//! trailer.get_dictionary_mut()?.set("Root", page);
//!
//! store.renumber_objects(&mut trailer, &BTreeSet::new(), true)?;
//! assert_eq!(store.len(), 2);
//! assert_eq!(trailer.to_pdf_string(WriteMode::Compact)?, "<</Root 2 0 R>>");
//! # Ok(())
//! # }
//! ```
//!
//! ## Parsing Values
//!
//! ```rust
//! use pdf_objstore::parser::parse_value;
//!
//! # fn main() -> pdf_objstore::Result<()> {
//! let value = parse_value(b"<</Kids [4 0 R] /Count 1>>")?;
//! let kids = value.get_dictionary()?.get_array("Kids").map(|kids| kids.len());
//! assert_eq!(kids, Some(1));
//! assert!(value.try_eq(&parse_value(b"<</Kids[4 0 R]/Count 1>>")?)?);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod filters;
pub mod objects;
pub mod parser;
pub mod store;
pub mod writer;

pub use error::{PdfError, Result};
pub use filters::{FilterRegistry, FilterType, StreamFilter};
pub use objects::{
    Array, DataType, Dictionary, Name, ObjectId, PdfObject, PdfString, RawData, Stream, Value,
};
pub use store::{ObjectStore, Observer, StoreOptions, StreamFactory, StreamHandle};
pub use writer::{PdfWrite, WriteMode};

/// Current version of pdf-objstore
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
