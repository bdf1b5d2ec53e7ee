//! Random access storage.
//!
//! Layouts compute absolute byte positions, and the transfer functions in [`iosp`](crate::iosp) read and write those positions through the traits in this module.
//!  - [`ReadableStorageTraits`] is implemented for byte slices, [`Vec<u8>`], [`Bytes`], [`MemoryStorage`] and [`FileStorage`].
//!  - [`WritableStorageTraits`] is implemented for [`MemoryStorage`] and [`FileStorage`].

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use bytes::Bytes;
use thiserror::Error;

use crate::{
    byte_range::{ByteOffset, ByteRange, InvalidByteRangeError},
    config::global_config,
};

/// A storage error.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A write operation was attempted on a read only storage.
    #[error("a write operation was attempted on a read only storage")]
    ReadOnly,
    /// An IO error.
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    /// An invalid byte range.
    #[error("invalid byte range {0}")]
    InvalidByteRangeError(#[from] InvalidByteRangeError),
    /// Any other error.
    #[error("{0}")]
    Other(String),
}

impl From<&str> for StorageError {
    fn from(err: &str) -> Self {
        Self::Other(err.to_string())
    }
}

impl From<String> for StorageError {
    fn from(err: String) -> Self {
        Self::Other(err)
    }
}

/// Readable random access storage traits.
pub trait ReadableStorageTraits {
    /// Return the size of the storage in bytes.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if there is an underlying storage error.
    fn size(&self) -> Result<u64, StorageError>;

    /// Fill `buf` with the bytes starting at `offset`.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if the bytes are not available or there is an underlying storage error.
    fn read_exact_at(&self, offset: ByteOffset, buf: &mut [u8]) -> Result<(), StorageError>;

    /// Fill `buf` with the bytes starting at `offset`, checking the byte range against [`size`](ReadableStorageTraits::size) first if [validate byte ranges](crate::config::Config#validate-byte-ranges) is enabled.
    ///
    /// # Errors
    /// Returns [`StorageError::InvalidByteRangeError`] if the byte range is outside of the storage, or a [`StorageError`] if there is an underlying storage error.
    fn read_checked(&self, offset: ByteOffset, buf: &mut [u8]) -> Result<(), StorageError> {
        if global_config().validate_byte_ranges() {
            ByteRange::new(offset, buf.len() as u64).validate(self.size()?)?;
        }
        self.read_exact_at(offset, buf)
    }

    /// Retrieve the bytes of a byte range.
    ///
    /// The byte range is always checked against [`size`](ReadableStorageTraits::size) before any bytes are allocated.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if the byte range is outside of the storage or there is an underlying storage error.
    fn read_byte_range(&self, byte_range: ByteRange) -> Result<Bytes, StorageError> {
        let size = self.size()?;
        byte_range.validate(size)?;
        let length = usize::try_from(byte_range.length())
            .map_err(|_| InvalidByteRangeError::new(byte_range, size))?;
        let mut buf = vec![0; length];
        self.read_exact_at(byte_range.start(), &mut buf)?;
        Ok(Bytes::from(buf))
    }
}

/// Writable random access storage traits.
pub trait WritableStorageTraits {
    /// Write all of `buf` starting at `offset`, growing the storage if required.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if the storage is read only or there is an underlying storage error.
    fn write_all_at(&self, offset: ByteOffset, buf: &[u8]) -> Result<(), StorageError>;
}

impl ReadableStorageTraits for [u8] {
    fn size(&self) -> Result<u64, StorageError> {
        Ok(self.len() as u64)
    }

    fn read_exact_at(&self, offset: ByteOffset, buf: &mut [u8]) -> Result<(), StorageError> {
        let byte_range = ByteRange::new(offset, buf.len() as u64);
        buf.copy_from_slice(&self[byte_range.to_range_usize(self.len() as u64)?]);
        Ok(())
    }
}

impl ReadableStorageTraits for Vec<u8> {
    fn size(&self) -> Result<u64, StorageError> {
        self.as_slice().size()
    }

    fn read_exact_at(&self, offset: ByteOffset, buf: &mut [u8]) -> Result<(), StorageError> {
        self.as_slice().read_exact_at(offset, buf)
    }
}

impl ReadableStorageTraits for Bytes {
    fn size(&self) -> Result<u64, StorageError> {
        self.as_ref().size()
    }

    fn read_exact_at(&self, offset: ByteOffset, buf: &mut [u8]) -> Result<(), StorageError> {
        self.as_ref().read_exact_at(offset, buf)
    }
}

impl<T: ReadableStorageTraits + ?Sized> ReadableStorageTraits for &T {
    fn size(&self) -> Result<u64, StorageError> {
        (**self).size()
    }

    fn read_exact_at(&self, offset: ByteOffset, buf: &mut [u8]) -> Result<(), StorageError> {
        (**self).read_exact_at(offset, buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_slice() {
        let data: Vec<u8> = (0..16).collect();
        let mut buf = [0u8; 4];
        data.read_exact_at(3, &mut buf).unwrap();
        assert_eq!(buf, [3, 4, 5, 6]);
        assert!(data.read_exact_at(14, &mut buf).is_err());
        assert!(matches!(
            data.read_checked(13, &mut buf),
            Err(StorageError::InvalidByteRangeError(_))
        ));
        assert_eq!(
            data.read_byte_range(ByteRange::new(12, 4)).unwrap(),
            Bytes::from_static(&[12, 13, 14, 15])
        );
        assert!(matches!(
            data.read_byte_range(ByteRange::new(4, u64::MAX - 4)),
            Err(StorageError::InvalidByteRangeError(err)) if err.byte_range() == ByteRange::new(4, u64::MAX - 4)
        ));
        let bytes = Bytes::from(data);
        assert_eq!(bytes.size().unwrap(), 16);
    }
}
