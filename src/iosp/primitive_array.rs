use crate::{
    data_type::{DataType, FillValue},
    section::SizeOverflowError,
};

use super::TransferError;

/// A flat array of elements of one primitive kind.
///
/// Enumerations are held by the integer array of their size.
/// Opaque and structure elements are held as their raw bytes, with the element size given by the layout.
#[derive(Clone, PartialEq, Debug)]
pub enum PrimitiveArray {
    /// Signed bytes, also used for [`DataType::Enum1`] and unconverted [`DataType::Char`].
    Byte(Vec<i8>),
    /// Characters.
    Char(Vec<char>),
    /// Signed 16-bit integers, also used for [`DataType::Enum2`].
    Short(Vec<i16>),
    /// Signed 32-bit integers, also used for [`DataType::Enum4`].
    Int(Vec<i32>),
    /// Signed 64-bit integers.
    Long(Vec<i64>),
    /// 32-bit floating point.
    Float(Vec<f32>),
    /// 64-bit floating point.
    Double(Vec<f64>),
    /// Raw bytes of opaque elements.
    Opaque(Vec<u8>),
    /// Raw bytes of structure records.
    Structure(Vec<u8>),
    /// Strings.
    String(Vec<String>),
}

impl PrimitiveArray {
    /// Return the name of the kind of array.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Byte(_) => "byte",
            Self::Char(_) => "char",
            Self::Short(_) => "short",
            Self::Int(_) => "int",
            Self::Long(_) => "long",
            Self::Float(_) => "float",
            Self::Double(_) => "double",
            Self::Opaque(_) => "opaque",
            Self::Structure(_) => "structure",
            Self::String(_) => "string",
        }
    }

    /// Return the length of the underlying vector.
    ///
    /// This is a number of bytes for opaque and structure arrays.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Byte(v) => v.len(),
            Self::Char(v) => v.len(),
            Self::Short(v) => v.len(),
            Self::Int(v) => v.len(),
            Self::Long(v) => v.len(),
            Self::Float(v) => v.len(),
            Self::Double(v) => v.len(),
            Self::Opaque(v) | Self::Structure(v) => v.len(),
            Self::String(v) => v.len(),
        }
    }

    /// Returns true if the array is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

macro_rules! impl_primitive_array_from {
    ($($variant:ident($type:ty)),*) => {
        $(
            impl From<Vec<$type>> for PrimitiveArray {
                fn from(values: Vec<$type>) -> Self {
                    Self::$variant(values)
                }
            }
        )*
    };
}

impl_primitive_array_from!(
    Byte(i8),
    Char(char),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String)
);

/// Widen Latin-1 bytes to characters.
#[must_use]
pub fn convert_byte_to_char(bytes: &[i8]) -> Vec<char> {
    bytes
        .iter()
        .map(|&b| char::from(b.to_ne_bytes()[0]))
        .collect()
}

/// Narrow characters to bytes, keeping the low 8 bits of each.
#[must_use]
pub fn convert_char_to_byte(chars: &[char]) -> Vec<i8> {
    chars
        .iter()
        .map(|&c| i8::from_ne_bytes([(u32::from(c) & 0xff) as u8]))
        .collect()
}

/// Create a primitive array of `size` elements of `data_type`, initialised with `fill_value` or zero.
///
/// [`DataType::Char`] creates a byte array.
/// Opaque and structure arrays hold `size * element_size` bytes.
///
/// # Errors
/// Returns a [`TransferError`] if the fill value is incompatible with the data type or the array is too large.
pub fn make_primitive_array(
    size: u64,
    data_type: DataType,
    element_size: u64,
    fill_value: Option<&FillValue>,
) -> Result<PrimitiveArray, TransferError> {
    let n = usize::try_from(size).map_err(|_| SizeOverflowError)?;
    let element_size_usize = usize::try_from(element_size).map_err(|_| SizeOverflowError)?;
    if let Some(fill_value) = fill_value {
        if data_type != DataType::String {
            fill_value.check(data_type, element_size_usize)?;
        }
    }

    macro_rules! filled {
        ($variant:ident, $type:ty) => {{
            let fill = fill_value
                .map(FillValue::as_element::<$type>)
                .transpose()?
                .unwrap_or_default();
            PrimitiveArray::$variant(vec![fill; n])
        }};
    }

    let array = match data_type {
        DataType::Byte | DataType::Char | DataType::Enum1 => filled!(Byte, i8),
        DataType::Short | DataType::Enum2 => filled!(Short, i16),
        DataType::Int | DataType::Enum4 => filled!(Int, i32),
        DataType::Long => filled!(Long, i64),
        DataType::Float => filled!(Float, f32),
        DataType::Double => filled!(Double, f64),
        DataType::Opaque | DataType::Structure => {
            let num_bytes = n
                .checked_mul(element_size_usize)
                .ok_or(SizeOverflowError)?;
            let bytes = match fill_value {
                Some(fill_value) => fill_value.as_ne_bytes().repeat(n),
                None => vec![0; num_bytes],
            };
            if data_type == DataType::Opaque {
                PrimitiveArray::Opaque(bytes)
            } else {
                PrimitiveArray::Structure(bytes)
            }
        }
        DataType::String => {
            let fill = fill_value
                .map(|fill_value| String::from_utf8_lossy(fill_value.as_ne_bytes()).into_owned())
                .unwrap_or_default();
            PrimitiveArray::String(vec![fill; n])
        }
    };
    Ok(array)
}
