//! A file storage.

use std::{
    fs::{File, OpenOptions},
    io::{Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};

use parking_lot::Mutex;

use crate::{
    byte_range::ByteOffset,
    storage::{ReadableStorageTraits, StorageError, WritableStorageTraits},
};

/// A random access file storage.
///
/// Reads and writes seek the shared file handle, so they are serialised by an internal lock.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    file: Mutex<File>,
    read_only: bool,
}

impl FileStorage {
    /// Open an existing file for reading.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if the file cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
            read_only: true,
        })
    }

    /// Open a file for reading and writing, creating it if it does not exist.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if the file cannot be opened or created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
            read_only: false,
        })
    }

    /// Return the path of the file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true if the storage was opened read only.
    #[must_use]
    pub fn read_only(&self) -> bool {
        self.read_only
    }
}

impl ReadableStorageTraits for FileStorage {
    fn size(&self) -> Result<u64, StorageError> {
        Ok(self.file.lock().metadata()?.len())
    }

    fn read_exact_at(&self, offset: ByteOffset, buf: &mut [u8]) -> Result<(), StorageError> {
        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(offset))?;
        file.read_exact(buf)?;
        Ok(())
    }
}

impl WritableStorageTraits for FileStorage {
    fn write_all_at(&self, offset: ByteOffset, buf: &[u8]) -> Result<(), StorageError> {
        if self.read_only {
            return Err(StorageError::ReadOnly);
        }
        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(buf)?;
        Ok(())
    }
}
