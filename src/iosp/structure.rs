use derive_more::Display;

use crate::data_type::{DataType, Element, Endianness};

use super::{PrimitiveArray, TransferError};

/// A member of a structure record.
#[derive(Clone, Eq, PartialEq, Debug, Display)]
#[display("{name}: {count} {data_type} at byte {offset}")]
pub struct StructureMember {
    name: String,
    data_type: DataType,
    offset: usize,
    count: usize,
}

impl StructureMember {
    /// Create a member of `count` elements of `data_type` starting at byte `offset` of each record.
    #[must_use]
    pub fn new(name: impl Into<String>, data_type: DataType, offset: usize, count: usize) -> Self {
        Self {
            name: name.into(),
            data_type,
            offset,
            count,
        }
    }

    /// Return the member name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the member data type.
    #[must_use]
    pub const fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Return the byte offset of the member in a record.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Return the number of elements of the member in each record.
    #[must_use]
    pub const fn count(&self) -> usize {
        self.count
    }
}

/// Extract a member from each record of a buffer of structure records.
///
/// `records` holds whole records of `record_size` bytes, such as the bytes of a [`PrimitiveArray::Structure`].
/// The result holds the `count` elements of the member from each record in turn.
/// Members of [`DataType::Char`] are returned as a [`PrimitiveArray::Char`].
///
/// # Errors
/// Returns [`TransferError::InvalidMember`] if the member does not fit within a record or `records` is not a whole number of records.
/// Returns [`TransferError::UnsupportedDataType`] for opaque, string and structure members.
pub fn copy_member_from_bytes(
    records: &[u8],
    record_size: usize,
    member: &StructureMember,
    endianness: Endianness,
) -> Result<PrimitiveArray, TransferError> {
    let Some(element_size) = member.data_type.fixed_size() else {
        return Err(TransferError::UnsupportedDataType(
            member.data_type,
            "copy_member_from_bytes",
        ));
    };
    let member_end = member
        .count
        .checked_mul(element_size)
        .and_then(|len| len.checked_add(member.offset));
    if !member_end.is_some_and(|end| end <= record_size) {
        return Err(TransferError::InvalidMember(
            member.name.clone(),
            format!("does not fit within a record of {record_size} bytes"),
        ));
    }
    if record_size == 0 || records.len() % record_size != 0 {
        return Err(TransferError::InvalidMember(
            member.name.clone(),
            format!(
                "{} bytes is not a whole number of {record_size} byte records",
                records.len()
            ),
        ));
    }

    let member_bytes = records.chunks_exact(record_size).flat_map(|record| {
        record[member.offset..member.offset + member.count * element_size]
            .chunks_exact(element_size)
    });
    let array: PrimitiveArray = match member.data_type {
        DataType::Byte | DataType::Enum1 => decode_member::<i8>(member_bytes, endianness).into(),
        DataType::Short | DataType::Enum2 => decode_member::<i16>(member_bytes, endianness).into(),
        DataType::Int | DataType::Enum4 => decode_member::<i32>(member_bytes, endianness).into(),
        DataType::Long => decode_member::<i64>(member_bytes, endianness).into(),
        DataType::Float => decode_member::<f32>(member_bytes, endianness).into(),
        DataType::Double => decode_member::<f64>(member_bytes, endianness).into(),
        DataType::Char => PrimitiveArray::Char(
            member_bytes
                .flat_map(<[u8]>::iter)
                .map(|&b| char::from(b))
                .collect(),
        ),
        DataType::Opaque | DataType::String | DataType::Structure => {
            return Err(TransferError::UnsupportedDataType(
                member.data_type,
                "copy_member_from_bytes",
            ))
        }
    };
    Ok(array)
}

fn decode_member<'a, T: Element>(
    elements: impl Iterator<Item = &'a [u8]>,
    endianness: Endianness,
) -> Vec<T> {
    elements
        .map(|bytes| T::from_bytes(bytes, endianness))
        .collect()
}
