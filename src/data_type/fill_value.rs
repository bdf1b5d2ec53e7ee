//! Fill values.

use derive_more::{Deref, From};

use super::{DataType, Element, IncompatibleFillValueError, NATIVE_ENDIAN};

/// The fill value of a variable.
///
/// Provides an element value for the parts of an array that are not covered by storage.
/// The value is held as native endian bytes.
#[derive(Clone, Eq, PartialEq, Debug, Deref, From)]
pub struct FillValue(Vec<u8>);

impl core::fmt::Display for FillValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

macro_rules! impl_fill_value_from {
    ($($type:ty),*) => {
        $(
            impl From<$type> for FillValue {
                fn from(value: $type) -> Self {
                    FillValue(value.to_ne_bytes().to_vec())
                }
            }
        )*
    };
}

impl_fill_value_from!(i8, u8, i16, i32, i64, f32, f64);

impl From<char> for FillValue {
    /// A character fill value is stored as its Latin-1 byte.
    fn from(value: char) -> Self {
        FillValue(vec![u8::try_from(value).unwrap_or(b'?')])
    }
}

impl FillValue {
    /// Create a new fill value composed of `bytes`.
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> FillValue {
        FillValue(bytes)
    }

    /// Returns the size in bytes of the fill value.
    #[must_use]
    pub fn size(&self) -> usize {
        self.0.len()
    }

    /// Return the byte representation of the fill value.
    #[must_use]
    pub fn as_ne_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Return the fill value as an element of type `T`.
    ///
    /// # Errors
    /// Returns [`IncompatibleFillValueError`] if the size of the fill value is not the size of `T`.
    pub fn as_element<T: Element>(&self) -> Result<T, IncompatibleFillValueError> {
        if self.size() == T::SIZE {
            Ok(T::from_bytes(&self.0, NATIVE_ENDIAN))
        } else {
            Err(IncompatibleFillValueError::new(T::DATA_TYPE, self.clone()))
        }
    }

    /// Check that the fill value is compatible with elements of `data_type` with size `element_size`.
    ///
    /// # Errors
    /// Returns [`IncompatibleFillValueError`] if the size of the fill value does not match the element size.
    pub fn check(&self, data_type: DataType, element_size: usize) -> Result<(), IncompatibleFillValueError> {
        let expected = data_type.fixed_size().unwrap_or(element_size);
        if self.size() == expected {
            Ok(())
        } else {
            Err(IncompatibleFillValueError::new(data_type, self.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_value() {
        let fill_value = FillValue::from(-2i16);
        assert_eq!(fill_value.size(), 2);
        assert_eq!(fill_value.as_element::<i16>().unwrap(), -2);
        assert!(fill_value.as_element::<i32>().is_err());
        assert!(fill_value.check(DataType::Short, 2).is_ok());
        assert!(fill_value.check(DataType::Enum2, 2).is_ok());
        assert!(fill_value.check(DataType::Int, 4).is_err());
        assert!(FillValue::new(vec![0; 12]).check(DataType::Structure, 12).is_ok());
        assert_eq!(FillValue::from('A').as_ne_bytes(), b"A");
        assert_eq!(FillValue::from(1.5f32).to_string(), format!("{:?}", 1.5f32.to_ne_bytes()));
    }
}
