use std::fmt;

/// Identifies an indirect object by object number and generation.
///
/// Ordering compares the object number first, then the generation, which
/// is the order the store iterates its objects in. `(0, 0)` is reserved as
/// the "no object" sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ObjectId {
    number: u32,
    generation: u16,
}

impl ObjectId {
    pub const NULL: ObjectId = ObjectId {
        number: 0,
        generation: 0,
    };

    pub const fn new(number: u32, generation: u16) -> Self {
        Self { number, generation }
    }

    pub const fn number(&self) -> u32 {
        self.number
    }

    pub const fn generation(&self) -> u16 {
        self.generation
    }

    pub const fn is_null(&self) -> bool {
        self.number == 0 && self.generation == 0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} R", self.number, self.generation)
    }
}

impl From<(u32, u16)> for ObjectId {
    fn from((number, generation): (u32, u16)) -> Self {
        Self::new(number, generation)
    }
}

/// The tag of a [`Value`](crate::objects::Value).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Bool,
    Integer,
    Real,
    String,
    Name,
    Array,
    Dictionary,
    Reference,
    Null,
    RawData,
}

impl DataType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            DataType::Bool => "Bool",
            DataType::Integer => "Integer",
            DataType::Real => "Real",
            DataType::String => "String",
            DataType::Name => "Name",
            DataType::Array => "Array",
            DataType::Dictionary => "Dictionary",
            DataType::Reference => "Reference",
            DataType::Null => "Null",
            DataType::RawData => "RawData",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
