use bytemuck::Pod;

use super::{endianness::reverse_endianness, DataType, Endianness};

/// A fixed size element that can be transferred to and from storage.
pub trait Element: Pod + Default + PartialEq + std::fmt::Debug {
    /// The size of the element in bytes.
    const SIZE: usize;

    /// The data type the element represents.
    const DATA_TYPE: DataType;

    /// Decode an element from `bytes` in `endianness` byte order.
    ///
    /// # Panics
    /// Panics if the length of `bytes` is not [`SIZE`](Element::SIZE).
    #[must_use]
    fn from_bytes(bytes: &[u8], endianness: Endianness) -> Self {
        let mut value: Self = bytemuck::pod_read_unaligned(bytes);
        if !endianness.is_native() {
            bytemuck::bytes_of_mut(&mut value).reverse();
        }
        value
    }

    /// Encode the element into `bytes` in `endianness` byte order.
    ///
    /// # Panics
    /// Panics if the length of `bytes` is not [`SIZE`](Element::SIZE).
    fn write_bytes(&self, bytes: &mut [u8], endianness: Endianness) {
        bytes.copy_from_slice(bytemuck::bytes_of(self));
        if !endianness.is_native() {
            bytes.reverse();
        }
    }
}

macro_rules! impl_element {
    ($type:ty, $data_type:expr) => {
        impl Element for $type {
            const SIZE: usize = std::mem::size_of::<$type>();
            const DATA_TYPE: DataType = $data_type;
        }
    };
}

impl_element!(i8, DataType::Byte);
impl_element!(u8, DataType::Opaque);
impl_element!(i16, DataType::Short);
impl_element!(i32, DataType::Int);
impl_element!(i64, DataType::Long);
impl_element!(f32, DataType::Float);
impl_element!(f64, DataType::Double);

/// Decode `dst.len()` elements from `bytes` in `endianness` byte order.
///
/// # Panics
/// Panics if the length of `bytes` is not `dst.len() * T::SIZE`.
pub fn read_elements<T: Element>(bytes: &[u8], dst: &mut [T], endianness: Endianness) {
    let dst_bytes: &mut [u8] = bytemuck::cast_slice_mut(dst);
    dst_bytes.copy_from_slice(bytes);
    if !endianness.is_native() {
        reverse_endianness(dst_bytes, T::SIZE);
    }
}

/// Encode `src` into `bytes` in `endianness` byte order.
///
/// # Panics
/// Panics if the length of `bytes` is not `src.len() * T::SIZE`.
pub fn write_elements<T: Element>(src: &[T], bytes: &mut [u8], endianness: Endianness) {
    bytes.copy_from_slice(bytemuck::cast_slice(src));
    if !endianness.is_native() {
        reverse_endianness(bytes, T::SIZE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_bytes() {
        assert_eq!(i32::from_bytes(&[0, 0, 1, 2], Endianness::Big), 258);
        assert_eq!(i32::from_bytes(&[2, 1, 0, 0], Endianness::Little), 258);
        assert_eq!(i8::from_bytes(&[255], Endianness::Big), -1);
        let mut bytes = [0u8; 8];
        1.5f64.write_bytes(&mut bytes, Endianness::Big);
        assert_eq!(bytes, 1.5f64.to_be_bytes());
    }

    #[test]
    fn element_slices() {
        let bytes = [0, 1, 0, 2, 255, 255];
        let mut dst = [0i16; 3];
        read_elements(&bytes, &mut dst, Endianness::Big);
        assert_eq!(dst, [1, 2, -1]);
        let mut out = [0u8; 6];
        write_elements(&dst, &mut out, Endianness::Little);
        assert_eq!(out, [1, 0, 2, 0, 255, 255]);
    }
}
