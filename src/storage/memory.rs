//! An in-memory storage.

use parking_lot::RwLock;

use crate::{
    byte_range::ByteOffset,
    storage::{ReadableStorageTraits, StorageError, WritableStorageTraits},
};

/// An in-memory storage that grows on write.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    data: RwLock<Vec<u8>>,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a copy of the stored bytes.
    #[must_use]
    pub fn to_vec(&self) -> Vec<u8> {
        self.data.read().clone()
    }

    /// Consume the storage and return the stored bytes.
    #[must_use]
    pub fn into_inner(self) -> Vec<u8> {
        self.data.into_inner()
    }
}

impl From<Vec<u8>> for MemoryStorage {
    fn from(data: Vec<u8>) -> Self {
        Self {
            data: RwLock::new(data),
        }
    }
}

impl ReadableStorageTraits for MemoryStorage {
    fn size(&self) -> Result<u64, StorageError> {
        Ok(self.data.read().len() as u64)
    }

    fn read_exact_at(&self, offset: ByteOffset, buf: &mut [u8]) -> Result<(), StorageError> {
        self.data.read().as_slice().read_exact_at(offset, buf)
    }
}

impl WritableStorageTraits for MemoryStorage {
    fn write_all_at(&self, offset: ByteOffset, buf: &[u8]) -> Result<(), StorageError> {
        let offset = usize::try_from(offset)
            .map_err(|_| StorageError::from("offset exceeds the addressable memory"))?;
        let end = offset
            .checked_add(buf.len())
            .ok_or_else(|| StorageError::from("write extends beyond the addressable memory"))?;
        let mut data = self.data.write();
        if data.len() < end {
            data.resize(end, 0);
        }
        data[offset..end].copy_from_slice(buf);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_storage() {
        let storage = MemoryStorage::new();
        storage.write_all_at(4, &[1, 2, 3]).unwrap();
        assert_eq!(storage.size().unwrap(), 7);
        storage.write_all_at(0, &[9]).unwrap();
        let mut buf = [0u8; 3];
        storage.read_exact_at(4, &mut buf).unwrap();
        assert_eq!(buf, [1, 2, 3]);
        assert!(matches!(
            storage.write_all_at(u64::MAX, &[1, 2]),
            Err(StorageError::Other(_))
        ));
        assert_eq!(storage.into_inner(), vec![9, 0, 0, 0, 1, 2, 3]);
    }
}
