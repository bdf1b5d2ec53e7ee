use std::io::Write;

use super::{PrimitiveArray, TransferError};

/// Serialise an array to `writer` in big endian byte order and return the number of bytes written.
///
/// Characters are written as 16-bit code units, truncating characters outside of the basic multilingual plane.
/// Opaque data is written as is.
///
/// # Errors
/// Returns [`TransferError::UnsupportedArray`] for structure and string arrays, or [`TransferError::IOError`] if writing fails.
pub fn transfer_data<W: Write + ?Sized>(
    array: &PrimitiveArray,
    writer: &mut W,
) -> Result<u64, TransferError> {
    macro_rules! write_be {
        ($values:expr) => {{
            let mut bytes = Vec::with_capacity(std::mem::size_of_val($values.as_slice()));
            for value in $values {
                bytes.extend_from_slice(&value.to_be_bytes());
            }
            bytes
        }};
    }

    let bytes = match array {
        PrimitiveArray::Byte(values) => write_be!(values),
        PrimitiveArray::Short(values) => write_be!(values),
        PrimitiveArray::Int(values) => write_be!(values),
        PrimitiveArray::Long(values) => write_be!(values),
        PrimitiveArray::Float(values) => write_be!(values),
        PrimitiveArray::Double(values) => write_be!(values),
        PrimitiveArray::Char(values) => values
            .iter()
            .flat_map(|&c| ((u32::from(c) & 0xffff) as u16).to_be_bytes())
            .collect(),
        PrimitiveArray::Opaque(values) => values.clone(),
        PrimitiveArray::Structure(_) | PrimitiveArray::String(_) => {
            return Err(TransferError::UnsupportedArray(
                array.kind(),
                "transfer_data",
            ))
        }
    };
    writer.write_all(&bytes)?;
    Ok(bytes.len() as u64)
}
