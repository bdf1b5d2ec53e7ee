//! Data types.
//!
//! A [`DataType`] identifies the element type of a variable.
//! Fixed size types are transferred with an [`Element`] implementation in a given [`Endianness`].
//! Opaque, string and structure elements have a size given by their layout.

mod element;
mod endianness;
mod fill_value;

pub use element::{read_elements, write_elements, Element};
pub(crate) use endianness::reverse_endianness;
pub use endianness::{Endianness, NATIVE_ENDIAN};
pub use fill_value::FillValue;

use derive_more::Display;
use thiserror::Error;

/// The element type of a variable.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display)]
pub enum DataType {
    /// Signed 8-bit integer.
    #[display("byte")]
    Byte,
    /// 8-bit Latin-1 character.
    #[display("char")]
    Char,
    /// Signed 16-bit integer.
    #[display("short")]
    Short,
    /// Signed 32-bit integer.
    #[display("int")]
    Int,
    /// Signed 64-bit integer.
    #[display("long")]
    Long,
    /// 32-bit IEEE 754 floating point.
    #[display("float")]
    Float,
    /// 64-bit IEEE 754 floating point.
    #[display("double")]
    Double,
    /// 8-bit enumeration.
    #[display("enum1")]
    Enum1,
    /// 16-bit enumeration.
    #[display("enum2")]
    Enum2,
    /// 32-bit enumeration.
    #[display("enum4")]
    Enum4,
    /// Uninterpreted bytes, sized by the layout.
    #[display("opaque")]
    Opaque,
    /// Variable length string.
    #[display("String")]
    String,
    /// A record of members, sized by the layout.
    #[display("Structure")]
    Structure,
}

impl DataType {
    /// Return the size of an element in bytes, or [`None`] if the size is given by the layout.
    #[must_use]
    pub const fn fixed_size(&self) -> Option<usize> {
        match self {
            Self::Byte | Self::Char | Self::Enum1 => Some(1),
            Self::Short | Self::Enum2 => Some(2),
            Self::Int | Self::Enum4 | Self::Float => Some(4),
            Self::Long | Self::Double => Some(8),
            Self::Opaque | Self::String | Self::Structure => None,
        }
    }

    /// Returns true for integer and floating point types.
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::Byte | Self::Short | Self::Int | Self::Long | Self::Float | Self::Double
        )
    }

    /// Returns true for enumeration types.
    #[must_use]
    pub const fn is_enum(&self) -> bool {
        matches!(self, Self::Enum1 | Self::Enum2 | Self::Enum4)
    }
}

/// A fill value incompatibility error.
#[derive(Debug, Error)]
#[error("incompatible fill value {1} for data type {0}")]
pub struct IncompatibleFillValueError(DataType, FillValue);

impl IncompatibleFillValueError {
    /// Create a new incompatible fill value error.
    #[must_use]
    pub const fn new(data_type: DataType, fill_value: FillValue) -> Self {
        Self(data_type, fill_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_type_sizes() {
        assert_eq!(DataType::Enum2.fixed_size(), Some(2));
        assert_eq!(DataType::Double.fixed_size(), Some(8));
        assert_eq!(DataType::Structure.fixed_size(), None);
        assert!(DataType::Float.is_numeric());
        assert!(!DataType::Char.is_numeric());
        assert!(DataType::Enum4.is_enum());
        assert_eq!(DataType::String.to_string(), "String");
        assert_eq!(DataType::Short.to_string(), "short");
    }
}
