mod array;
mod dictionary;
mod object;
mod primitive;
mod stream;
mod string;
mod value;

pub use array::Array;
pub use dictionary::Dictionary;
pub use object::PdfObject;
pub use primitive::{DataType, ObjectId};
pub use stream::{MemoryBuffer, Stream, StreamBuffer};
pub use string::{Name, PdfString};
pub use value::{RawData, Value};
