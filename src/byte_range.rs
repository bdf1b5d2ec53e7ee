//! Byte ranges.
//!
//! A [`ByteRange`] is a span of bytes at an absolute position in a storage.
//! Layouts address storage in bytes, and every chunk read or write is expressed as a byte range that is validated against the size of the storage.

use thiserror::Error;

use crate::section::SizeOverflowError;

/// A byte offset.
pub type ByteOffset = u64;

/// A byte length.
pub type ByteLength = u64;

/// A byte range.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ByteRange {
    offset: ByteOffset,
    length: ByteLength,
}

impl ByteRange {
    /// Create a byte range of `length` bytes starting at `offset`.
    #[must_use]
    pub const fn new(offset: ByteOffset, length: ByteLength) -> Self {
        Self { offset, length }
    }

    /// Create the byte range of `num_elements` elements of `element_size` bytes starting at byte `offset`.
    ///
    /// # Errors
    /// Returns [`SizeOverflowError`] if the end of the byte range overflows a [`u64`].
    pub fn new_elements(
        offset: ByteOffset,
        num_elements: u64,
        element_size: u64,
    ) -> Result<Self, SizeOverflowError> {
        let length = num_elements
            .checked_mul(element_size)
            .ok_or(SizeOverflowError)?;
        offset.checked_add(length).ok_or(SizeOverflowError)?;
        Ok(Self { offset, length })
    }

    /// Return the start of the byte range.
    #[must_use]
    pub const fn start(&self) -> u64 {
        self.offset
    }

    /// Return the exclusive end of the byte range.
    #[must_use]
    pub const fn end(&self) -> u64 {
        self.offset.saturating_add(self.length)
    }

    /// Return the length of the byte range.
    #[must_use]
    pub const fn length(&self) -> u64 {
        self.length
    }

    /// Convert the byte range to a [`std::ops::Range<u64>`].
    #[must_use]
    pub const fn to_range(&self) -> std::ops::Range<u64> {
        self.start()..self.end()
    }

    /// Check that the byte range lies within bytes of length `size`.
    ///
    /// # Errors
    /// Returns [`InvalidByteRangeError`] if the byte range ends beyond `size`.
    pub fn validate(&self, size: u64) -> Result<(), InvalidByteRangeError> {
        if self.offset.checked_add(self.length).is_some_and(|end| end <= size) {
            Ok(())
        } else {
            Err(InvalidByteRangeError(*self, size))
        }
    }

    /// Convert the byte range to a [`std::ops::Range<usize>`] within bytes of length `size`.
    ///
    /// # Errors
    /// Returns [`InvalidByteRangeError`] if the byte range ends beyond `size` or is not addressable.
    pub fn to_range_usize(&self, size: u64) -> Result<std::ops::Range<usize>, InvalidByteRangeError> {
        self.validate(size)?;
        let start = usize::try_from(self.start()).map_err(|_| InvalidByteRangeError(*self, size))?;
        let end = usize::try_from(self.end()).map_err(|_| InvalidByteRangeError(*self, size))?;
        Ok(start..end)
    }
}

impl std::fmt::Display for ByteRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start(), self.end())
    }
}

/// An invalid byte range error.
#[derive(Copy, Clone, Debug, Error)]
#[error("invalid byte range {0} for bytes of length {1}")]
pub struct InvalidByteRangeError(ByteRange, u64);

impl InvalidByteRangeError {
    /// Create a new [`InvalidByteRangeError`].
    #[must_use]
    pub fn new(byte_range: ByteRange, bytes_len: u64) -> Self {
        Self(byte_range, bytes_len)
    }

    /// Return the offending byte range.
    #[must_use]
    pub fn byte_range(&self) -> ByteRange {
        self.0
    }
}

/// Extract the bytes of a byte range from `bytes`.
///
/// # Errors
/// Returns [`InvalidByteRangeError`] if any bytes are requested beyond the end of `bytes`.
pub fn extract_byte_range(bytes: &[u8], byte_range: ByteRange) -> Result<&[u8], InvalidByteRangeError> {
    Ok(&bytes[byte_range.to_range_usize(bytes.len() as u64)?])
}
