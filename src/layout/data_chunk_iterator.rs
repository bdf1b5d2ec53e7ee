use bytes::Bytes;

use crate::storage::StorageError;

/// A stored tile at a byte position in storage.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct DataChunk {
    /// The index of the first element of the tile in the variable.
    pub offset: Vec<u64>,
    /// The byte position of the tile in storage.
    pub file_pos: u64,
}

impl DataChunk {
    /// Create a new data chunk.
    #[must_use]
    pub fn new(offset: Vec<u64>, file_pos: u64) -> Self {
        Self { offset, file_pos }
    }
}

/// A stored tile as a decoded buffer.
///
/// The buffer holds the elements of the tile in row-major order, already decompressed and defiltered.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct DataChunkBB {
    /// The index of the first element of the tile in the variable.
    pub offset: Vec<u64>,
    /// The decoded bytes of the tile.
    pub buffer: Bytes,
}

impl DataChunkBB {
    /// Create a new data chunk buffer.
    #[must_use]
    pub fn new(offset: Vec<u64>, buffer: impl Into<Bytes>) -> Self {
        Self {
            offset,
            buffer: buffer.into(),
        }
    }
}

/// A source of the stored tiles of a variable, in any order.
///
/// Implemented for any iterator over `Result<C, StorageError>`.
pub trait DataChunkIterator {
    /// The tile type.
    type Item;

    /// Return the next tile, or [`None`] if all tiles have been returned.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if the tile cannot be retrieved.
    fn next_data_chunk(&mut self) -> Result<Option<Self::Item>, StorageError>;
}

impl<C, I> DataChunkIterator for I
where
    I: Iterator<Item = Result<C, StorageError>>,
{
    type Item = C;

    fn next_data_chunk(&mut self) -> Result<Option<C>, StorageError> {
        self.next().transpose()
    }
}

/// A stored tile with an index offset and a location.
pub(super) trait Tile {
    /// Where the tile data is.
    type Location: Clone;

    fn offset(&self) -> &[u64];

    fn into_location(self) -> Self::Location;
}

impl Tile for DataChunk {
    type Location = u64;

    fn offset(&self) -> &[u64] {
        &self.offset
    }

    fn into_location(self) -> u64 {
        self.file_pos
    }
}

impl Tile for DataChunkBB {
    type Location = Bytes;

    fn offset(&self) -> &[u64] {
        &self.offset
    }

    fn into_location(self) -> Bytes {
        self.buffer
    }
}
