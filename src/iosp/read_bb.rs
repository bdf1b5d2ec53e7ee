use crate::{
    config::global_config,
    data_type::{DataType, Element, Endianness, FillValue},
    layout::LayoutBB,
};

use super::{
    check_element_size, convert_byte_to_char, dest_range, make_primitive_array, PrimitiveArray,
    TransferError,
};

/// Read the wanted section of a variable from decoded tile buffers into a new array.
///
/// This is the buffer counterpart of [`read_data_fill`](super::read_data_fill) and follows the same fill and char conversion rules.
///
/// # Errors
/// Returns a [`TransferError`] if the fill value or element size is incompatible with `data_type`, or on a layout error.
pub fn read_data_bb_fill<L>(
    layout: &mut L,
    data_type: DataType,
    fill_value: Option<&FillValue>,
    endianness: Endianness,
) -> Result<PrimitiveArray, TransferError>
where
    L: LayoutBB + ?Sized,
{
    if data_type == DataType::String {
        return Err(TransferError::UnsupportedDataType(
            data_type,
            "read_data_bb_fill",
        ));
    }
    let mut array = make_primitive_array(
        layout.total_elements(),
        data_type,
        layout.element_size(),
        fill_value,
    )?;
    read_data_bb(layout, &mut array, endianness)?;
    if data_type == DataType::Char && global_config().convert_char() {
        if let PrimitiveArray::Byte(bytes) = &array {
            array = PrimitiveArray::Char(convert_byte_to_char(bytes));
        }
    }
    Ok(array)
}

/// Read the wanted section of a variable from decoded tile buffers into an existing array.
///
/// # Errors
/// Returns a [`TransferError`] if the element size of the layout does not match the array, a chunk lies outside of the array or its tile buffer, or on a layout error.
pub fn read_data_bb<L>(
    layout: &mut L,
    array: &mut PrimitiveArray,
    endianness: Endianness,
) -> Result<(), TransferError>
where
    L: LayoutBB + ?Sized,
{
    match array {
        PrimitiveArray::Byte(dst) => read_bb_elements_loop(layout, dst, endianness),
        PrimitiveArray::Short(dst) => read_bb_elements_loop(layout, dst, endianness),
        PrimitiveArray::Int(dst) => read_bb_elements_loop(layout, dst, endianness),
        PrimitiveArray::Long(dst) => read_bb_elements_loop(layout, dst, endianness),
        PrimitiveArray::Float(dst) => read_bb_elements_loop(layout, dst, endianness),
        PrimitiveArray::Double(dst) => read_bb_elements_loop(layout, dst, endianness),
        PrimitiveArray::Char(dst) => {
            check_element_size(layout.element_size(), 1, "char")?;
            while layout.has_next()? {
                let chunk = layout.next_chunk()?;
                let range =
                    dest_range(chunk.dest_elem(), chunk.num_elements(), 1, dst.len())?;
                let bytes = chunk.bytes()?;
                for (c, b) in std::iter::zip(&mut dst[range], bytes.iter()) {
                    *c = char::from(*b);
                }
            }
            Ok(())
        }
        PrimitiveArray::Opaque(dst) | PrimitiveArray::Structure(dst) => {
            let record_size = layout.element_size();
            while layout.has_next()? {
                let chunk = layout.next_chunk()?;
                let range = dest_range(
                    chunk.dest_elem(),
                    chunk.num_elements(),
                    record_size,
                    dst.len(),
                )?;
                dst[range].copy_from_slice(&chunk.bytes()?);
            }
            Ok(())
        }
        PrimitiveArray::String(_) => {
            Err(TransferError::UnsupportedArray("string", "read_data_bb"))
        }
    }
}

fn read_bb_elements_loop<T, L>(
    layout: &mut L,
    dst: &mut [T],
    endianness: Endianness,
) -> Result<(), TransferError>
where
    T: Element,
    L: LayoutBB + ?Sized,
{
    check_element_size(layout.element_size(), T::SIZE, "fixed size")?;
    while layout.has_next()? {
        let chunk = layout.next_chunk()?;
        let range = dest_range(chunk.dest_elem(), chunk.num_elements(), 1, dst.len())?;
        chunk.read_into(&mut dst[range], endianness)?;
    }
    Ok(())
}
