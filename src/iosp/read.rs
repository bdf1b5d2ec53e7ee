use crate::{
    config::global_config,
    data_type::{reverse_endianness, DataType, Element, Endianness, FillValue},
    layout::Layout,
    storage::ReadableStorageTraits,
};

use super::{
    check_element_size, convert_byte_to_char, dest_range, make_primitive_array, PrimitiveArray,
    TransferError,
};

/// Read the wanted section of a variable into a new array.
///
/// The array has [`Layout::total_elements`] elements initialised with `fill_value` (or zero) before reading, so elements the layout does not cover keep the fill value.
/// [`DataType::Char`] data is widened to a [`PrimitiveArray::Char`] if [convert char](crate::config::Config#convert-char) is enabled, otherwise it is returned as a [`PrimitiveArray::Byte`].
///
/// # Errors
/// Returns a [`TransferError`] if the fill value or element size is incompatible with `data_type`, or on a layout or storage error.
pub fn read_data_fill<S, L>(
    source: &S,
    layout: &mut L,
    data_type: DataType,
    fill_value: Option<&FillValue>,
    endianness: Endianness,
) -> Result<PrimitiveArray, TransferError>
where
    S: ReadableStorageTraits + ?Sized,
    L: Layout + ?Sized,
{
    if data_type == DataType::String {
        return Err(TransferError::UnsupportedDataType(data_type, "read_data_fill"));
    }
    if let Some(expected) = data_type.fixed_size() {
        check_element_size(layout.element_size(), expected, "fixed size")?;
    }
    let mut array = make_primitive_array(
        layout.total_elements(),
        data_type,
        layout.element_size(),
        fill_value,
    )?;
    tracing::debug!(
        "read {} {data_type} elements with {endianness} byte order",
        layout.total_elements()
    );
    read_data(source, layout, &mut array, endianness)?;
    if data_type == DataType::Char && global_config().convert_char() {
        if let PrimitiveArray::Byte(bytes) = &array {
            array = PrimitiveArray::Char(convert_byte_to_char(bytes));
        }
    }
    Ok(array)
}

/// Read the wanted section of a variable into an existing array.
///
/// Each chunk is read from its byte position in `source` into the array starting at its destination element.
/// Opaque and structure arrays are addressed in records of [`Layout::element_size`] bytes.
///
/// # Errors
/// Returns a [`TransferError`] if the element size of the layout does not match the array, a chunk lies outside of the array or the storage, or on a layout or storage error.
pub fn read_data<S, L>(
    source: &S,
    layout: &mut L,
    array: &mut PrimitiveArray,
    endianness: Endianness,
) -> Result<(), TransferError>
where
    S: ReadableStorageTraits + ?Sized,
    L: Layout + ?Sized,
{
    match array {
        PrimitiveArray::Byte(dst) => read_elements_loop(source, layout, dst, endianness),
        PrimitiveArray::Short(dst) => read_elements_loop(source, layout, dst, endianness),
        PrimitiveArray::Int(dst) => read_elements_loop(source, layout, dst, endianness),
        PrimitiveArray::Long(dst) => read_elements_loop(source, layout, dst, endianness),
        PrimitiveArray::Float(dst) => read_elements_loop(source, layout, dst, endianness),
        PrimitiveArray::Double(dst) => read_elements_loop(source, layout, dst, endianness),
        PrimitiveArray::Char(dst) => {
            check_element_size(layout.element_size(), 1, "char")?;
            let mut bytes = Vec::new();
            while layout.has_next()? {
                let chunk = layout.next_chunk()?;
                let range = dest_range(chunk.dest_elem, chunk.num_elements, 1, dst.len())?;
                bytes.resize(range.len(), 0);
                source.read_checked(chunk.src_pos, &mut bytes)?;
                for (c, b) in std::iter::zip(&mut dst[range], &bytes) {
                    *c = char::from(*b);
                }
            }
            Ok(())
        }
        PrimitiveArray::Opaque(dst) | PrimitiveArray::Structure(dst) => {
            let record_size = layout.element_size();
            while layout.has_next()? {
                let chunk = layout.next_chunk()?;
                let range =
                    dest_range(chunk.dest_elem, chunk.num_elements, record_size, dst.len())?;
                source.read_checked(chunk.src_pos, &mut dst[range])?;
            }
            Ok(())
        }
        PrimitiveArray::String(_) => Err(TransferError::UnsupportedArray("string", "read_data")),
    }
}

/// The copy loop for one kind of fixed size element.
fn read_elements_loop<T, S, L>(
    source: &S,
    layout: &mut L,
    dst: &mut [T],
    endianness: Endianness,
) -> Result<(), TransferError>
where
    T: Element,
    S: ReadableStorageTraits + ?Sized,
    L: Layout + ?Sized,
{
    check_element_size(layout.element_size(), T::SIZE, "fixed size")?;
    while layout.has_next()? {
        let chunk = layout.next_chunk()?;
        let range = dest_range(chunk.dest_elem, chunk.num_elements, 1, dst.len())?;
        let dst_bytes: &mut [u8] = bytemuck::cast_slice_mut(&mut dst[range]);
        source.read_checked(chunk.src_pos, dst_bytes)?;
        if !endianness.is_native() {
            reverse_endianness(dst_bytes, T::SIZE);
        }
    }
    Ok(())
}
