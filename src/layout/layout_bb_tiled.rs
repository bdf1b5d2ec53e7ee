use bytes::Bytes;

use crate::{
    byte_range::{ByteRange, InvalidByteRangeError},
    data_type::{read_elements, Element, Endianness},
    section::{Section, SizeOverflowError},
    storage::StorageError,
};

use super::{
    check_addressable, layout_bb_iterator_next, tiled_walk::TiledWalk, DataChunkBB,
    DataChunkIterator, LayoutBB, LayoutError,
};

/// A run of elements in a decoded tile buffer.
#[derive(Clone, Debug)]
pub struct LayoutBBChunk {
    buffer: Bytes,
    element_size: u64,
    src_elem: u64,
    num_elements: u64,
    dest_elem: u64,
}

impl LayoutBBChunk {
    /// Create a new buffer chunk.
    #[must_use]
    pub fn new(
        buffer: Bytes,
        element_size: u64,
        src_elem: u64,
        num_elements: u64,
        dest_elem: u64,
    ) -> Self {
        Self {
            buffer,
            element_size,
            src_elem,
            num_elements,
            dest_elem,
        }
    }

    /// Return the whole tile buffer.
    #[must_use]
    pub fn buffer(&self) -> &Bytes {
        &self.buffer
    }

    /// Return the element offset of the run in the tile buffer.
    #[must_use]
    pub fn src_elem(&self) -> u64 {
        self.src_elem
    }

    /// Return the number of elements in the run.
    #[must_use]
    pub fn num_elements(&self) -> u64 {
        self.num_elements
    }

    /// Return the element offset of the run in the destination.
    #[must_use]
    pub fn dest_elem(&self) -> u64 {
        self.dest_elem
    }

    /// Return the byte range of the run in the tile buffer.
    ///
    /// # Errors
    /// Returns [`SizeOverflowError`] if the byte range overflows.
    pub fn byte_range(&self) -> Result<ByteRange, SizeOverflowError> {
        let start = self
            .src_elem
            .checked_mul(self.element_size)
            .ok_or(SizeOverflowError)?;
        ByteRange::new_elements(start, self.num_elements, self.element_size)
    }

    /// Return the bytes of the run.
    ///
    /// # Errors
    /// Returns a [`LayoutError`] if the run lies outside of the tile buffer.
    pub fn bytes(&self) -> Result<Bytes, LayoutError> {
        let byte_range = self.byte_range()?;
        let range = byte_range
            .to_range_usize(self.buffer.len() as u64)
            .map_err(StorageError::from)?;
        Ok(self.buffer.slice(range))
    }

    /// Decode the elements of the run into `dst`.
    ///
    /// # Errors
    /// Returns a [`LayoutError`] if the run lies outside of the tile buffer or the length of `dst` is not the number of elements of the run.
    pub fn read_into<T: Element>(
        &self,
        dst: &mut [T],
        endianness: Endianness,
    ) -> Result<(), LayoutError> {
        if T::SIZE as u64 != self.element_size {
            return Err(LayoutError::InvalidElementSize(T::SIZE as u64));
        }
        let bytes = self.bytes()?;
        if bytes.len() != dst.len() * T::SIZE {
            let byte_range = ByteRange::new(0, (dst.len() * T::SIZE) as u64);
            return Err(StorageError::from(InvalidByteRangeError::new(
                byte_range,
                bytes.len() as u64,
            ))
            .into());
        }
        read_elements(&bytes, dst, endianness);
        Ok(())
    }
}

/// The layout of an array stored as tiles that are decoded into memory buffers.
///
/// This is the layout of compressed or filtered tiled variables, where a tile must be decoded before its elements can be addressed.
/// Tiles follow the same rules as [`LayoutTiled`](super::LayoutTiled).
pub struct LayoutBBTiled<I>
where
    I: DataChunkIterator<Item = DataChunkBB>,
{
    walk: TiledWalk<I>,
    elem_size: u64,
}

impl<I> LayoutBBTiled<I>
where
    I: DataChunkIterator<Item = DataChunkBB>,
{
    /// Create a layout for reading `want` from the decoded tiles of `chunk_iter`.
    ///
    /// # Errors
    /// Returns a [`LayoutError`] if the rank of `chunk_shape` does not match `want`, `elem_size` is zero, or the number of elements overflows.
    pub fn new(
        chunk_iter: I,
        chunk_shape: &[u64],
        elem_size: u64,
        want: &Section,
    ) -> Result<Self, LayoutError> {
        check_addressable(0, elem_size, want.num_elements()?)?;
        let walk = TiledWalk::new(chunk_iter, chunk_shape, want)?;
        tracing::debug!(
            "tiled buffer layout: {want} in tiles of {chunk_shape:?}, {elem_size} byte elements"
        );
        Ok(Self { walk, elem_size })
    }
}

impl<I> LayoutBB for LayoutBBTiled<I>
where
    I: DataChunkIterator<Item = DataChunkBB>,
{
    fn total_elements(&self) -> u64 {
        self.walk.total_elements()
    }

    fn element_size(&self) -> u64 {
        self.elem_size
    }

    fn has_next(&mut self) -> Result<bool, LayoutError> {
        self.walk.has_next()
    }

    fn next_chunk(&mut self) -> Result<LayoutBBChunk, LayoutError> {
        let (chunk, buffer) = self.walk.next()?;
        Ok(LayoutBBChunk::new(
            buffer,
            self.elem_size,
            chunk.src_elem,
            chunk.num_elements,
            chunk.dest_elem,
        ))
    }
}

impl<I> Iterator for LayoutBBTiled<I>
where
    I: DataChunkIterator<Item = DataChunkBB>,
{
    type Item = Result<LayoutBBChunk, LayoutError>;

    fn next(&mut self) -> Option<Self::Item> {
        layout_bb_iterator_next(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile(offset: Vec<u64>, values: &[i16]) -> Result<DataChunkBB, StorageError> {
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_be_bytes()).collect();
        Ok(DataChunkBB::new(offset, bytes))
    }

    #[test]
    fn layout_bb_tiled() {
        // two 2x3 tiles of a 2x6 array, want columns 2..=4
        let tiles = vec![
            tile(vec![0, 0], &[0, 1, 2, 10, 11, 12]),
            tile(vec![0, 3], &[3, 4, 5, 13, 14, 15]),
        ];
        let want = Section::new_with_origin_shape(&[0, 2], &[2, 3]).unwrap();
        let mut layout = LayoutBBTiled::new(tiles.into_iter(), &[2, 3], 2, &want).unwrap();
        assert_eq!(layout.total_elements(), 6);
        assert_eq!(layout.element_size(), 2);

        let mut dest = vec![0i16; 6];
        while layout.has_next().unwrap() {
            let chunk = layout.next_chunk().unwrap();
            let start = chunk.dest_elem() as usize;
            let end = start + chunk.num_elements() as usize;
            chunk.read_into(&mut dest[start..end], Endianness::Big).unwrap();
        }
        assert_eq!(dest, vec![2, 3, 4, 12, 13, 14]);
    }

    #[test]
    fn layout_bb_chunk_bounds() {
        let chunk = LayoutBBChunk::new(Bytes::from_static(&[0, 1, 0, 2]), 2, 1, 2, 0);
        assert_eq!(chunk.byte_range().unwrap(), ByteRange::new(2, 4));
        assert!(chunk.bytes().is_err());
        let mut dst = [0i16; 2];
        assert!(chunk.read_into(&mut dst, Endianness::Big).is_err());

        let chunk = LayoutBBChunk::new(Bytes::from_static(&[0, 1, 0, 2]), 2, 1, 1, 0);
        assert_eq!(chunk.bytes().unwrap(), Bytes::from_static(&[0, 2]));
        let mut dst = [0i16; 1];
        chunk.read_into(&mut dst, Endianness::Big).unwrap();
        assert_eq!(dst, [2]);
        let mut dst = [0i32; 1];
        assert!(chunk.read_into(&mut dst, Endianness::Big).is_err());
    }
}
