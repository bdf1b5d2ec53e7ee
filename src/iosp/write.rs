use crate::{
    data_type::{write_elements, Element, Endianness},
    layout::Layout,
    storage::WritableStorageTraits,
};

use super::{check_element_size, convert_char_to_byte, dest_range, PrimitiveArray, TransferError};

/// Write an array to the wanted section of a variable.
///
/// Each chunk of the layout takes its elements from the array starting at its destination element and writes them to its byte position in `sink`.
/// Characters are narrowed to their low 8 bits.
///
/// # Errors
/// Returns a [`TransferError`] if the element size of the layout does not match the array, a chunk lies outside of the array, or on a layout or storage error.
pub fn write_data<S, L>(
    sink: &S,
    layout: &mut L,
    array: &PrimitiveArray,
    endianness: Endianness,
) -> Result<(), TransferError>
where
    S: WritableStorageTraits + ?Sized,
    L: Layout + ?Sized,
{
    tracing::debug!(
        "write {} {} elements with {endianness} byte order",
        layout.total_elements(),
        array.kind()
    );
    match array {
        PrimitiveArray::Byte(src) => write_elements_loop(sink, layout, src, endianness),
        PrimitiveArray::Short(src) => write_elements_loop(sink, layout, src, endianness),
        PrimitiveArray::Int(src) => write_elements_loop(sink, layout, src, endianness),
        PrimitiveArray::Long(src) => write_elements_loop(sink, layout, src, endianness),
        PrimitiveArray::Float(src) => write_elements_loop(sink, layout, src, endianness),
        PrimitiveArray::Double(src) => write_elements_loop(sink, layout, src, endianness),
        PrimitiveArray::Char(src) => {
            check_element_size(layout.element_size(), 1, "char")?;
            while layout.has_next()? {
                let chunk = layout.next_chunk()?;
                let range = dest_range(chunk.dest_elem, chunk.num_elements, 1, src.len())?;
                let bytes = convert_char_to_byte(&src[range]);
                sink.write_all_at(chunk.src_pos, bytemuck::cast_slice(&bytes))?;
            }
            Ok(())
        }
        PrimitiveArray::Opaque(src) | PrimitiveArray::Structure(src) => {
            let record_size = layout.element_size();
            while layout.has_next()? {
                let chunk = layout.next_chunk()?;
                let range = dest_range(chunk.dest_elem, chunk.num_elements, record_size, src.len())?;
                sink.write_all_at(chunk.src_pos, &src[range])?;
            }
            Ok(())
        }
        PrimitiveArray::String(_) => Err(TransferError::UnsupportedArray("string", "write_data")),
    }
}

fn write_elements_loop<T, S, L>(
    sink: &S,
    layout: &mut L,
    src: &[T],
    endianness: Endianness,
) -> Result<(), TransferError>
where
    T: Element,
    S: WritableStorageTraits + ?Sized,
    L: Layout + ?Sized,
{
    check_element_size(layout.element_size(), T::SIZE, "fixed size")?;
    let mut bytes = Vec::new();
    while layout.has_next()? {
        let chunk = layout.next_chunk()?;
        let range = dest_range(chunk.dest_elem, chunk.num_elements, 1, src.len())?;
        bytes.resize(range.len() * T::SIZE, 0);
        write_elements(&src[range], &mut bytes, endianness);
        sink.write_all_at(chunk.src_pos, &bytes)?;
    }
    Ok(())
}
