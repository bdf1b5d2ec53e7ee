//! Typed bulk transfer between storage and primitive arrays.
//!
//! A transfer drains a [`Layout`](crate::layout::Layout) or [`LayoutBB`](crate::layout::LayoutBB) and copies each chunk between storage and a [`PrimitiveArray`].
//! Each kind of array has its own copy loop, so elements are never boxed.
//!
//! Reading:
//!  - [`read_data_fill`] / [`read_data`] read from [`ReadableStorageTraits`](crate::storage::ReadableStorageTraits) through a [`Layout`](crate::layout::Layout).
//!  - [`read_data_bb_fill`] / [`read_data_bb`] read from decoded tile buffers through a [`LayoutBB`](crate::layout::LayoutBB).
//!  - [`read_strings`] resolves heap references through a [`HeapResolver`].
//!  - [`copy_member_from_bytes`] extracts a member from structure records.
//!
//! Writing:
//!  - [`write_data`] writes through a [`Layout`](crate::layout::Layout) to [`WritableStorageTraits`](crate::storage::WritableStorageTraits).
//!  - [`transfer_data`] serialises an array in big endian order to a [`std::io::Write`].

mod primitive_array;
mod read;
mod read_bb;
mod strings;
mod structure;
mod transfer;
mod write;

pub use primitive_array::{
    convert_byte_to_char, convert_char_to_byte, make_primitive_array, PrimitiveArray,
};
pub use read::{read_data, read_data_fill};
pub use read_bb::{read_data_bb, read_data_bb_fill};
pub use strings::{read_strings, HeapResolver};
pub use structure::{copy_member_from_bytes, StructureMember};
pub use transfer::transfer_data;
pub use write::write_data;

use thiserror::Error;

use crate::{
    data_type::{DataType, IncompatibleFillValueError},
    layout::LayoutError,
    section::SizeOverflowError,
    storage::StorageError,
};

/// A transfer error.
#[derive(Debug, Error)]
pub enum TransferError {
    /// A layout error.
    #[error(transparent)]
    LayoutError(#[from] LayoutError),
    /// A storage error.
    #[error(transparent)]
    StorageError(#[from] StorageError),
    /// An IO error writing serialised data.
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    /// The element size of a layout does not match the array.
    #[error("element size {0} is incompatible with a {1} array")]
    IncompatibleElementSize(u64, &'static str),
    /// A chunk addresses elements outside of the destination array.
    #[error("destination range {start}..{end} is outside of an array of length {len}")]
    DestinationOutOfBounds {
        /// The start of the destination range.
        start: u64,
        /// The end of the destination range.
        end: u64,
        /// The length of the array.
        len: usize,
    },
    /// The operation does not support the array.
    #[error("{1} does not support a {0} array")]
    UnsupportedArray(&'static str, &'static str),
    /// The operation does not support the data type.
    #[error("{1} does not support data type {0}")]
    UnsupportedDataType(DataType, &'static str),
    /// A structure member does not fit within its record.
    #[error("invalid structure member {0}: {1}")]
    InvalidMember(String, String),
    /// An incompatible fill value.
    #[error(transparent)]
    IncompatibleFillValue(#[from] IncompatibleFillValueError),
    /// The number of elements or bytes overflows.
    #[error(transparent)]
    SizeOverflow(#[from] SizeOverflowError),
}

/// Return the range of `num_elements` elements of `scale` entries starting at element `dest_elem` of an array of length `len`.
fn dest_range(
    dest_elem: u64,
    num_elements: u64,
    scale: u64,
    len: usize,
) -> Result<std::ops::Range<usize>, TransferError> {
    let start = dest_elem.checked_mul(scale).ok_or(SizeOverflowError)?;
    let end = num_elements
        .checked_mul(scale)
        .and_then(|n| n.checked_add(start))
        .ok_or(SizeOverflowError)?;
    if end > len as u64 {
        return Err(TransferError::DestinationOutOfBounds { start, end, len });
    }
    // both bounds are at most len
    Ok(start as usize..end as usize)
}

/// Check that a layout element size matches the size of the elements of an array.
fn check_element_size(
    element_size: u64,
    expected: usize,
    kind: &'static str,
) -> Result<(), TransferError> {
    if element_size == expected as u64 {
        Ok(())
    } else {
        Err(TransferError::IncompatibleElementSize(element_size, kind))
    }
}
