use crate::section::{Section, SizeOverflowError};

use super::{
    check_addressable, layout_iterator_next, tiled_walk::TiledWalk, DataChunk, DataChunkIterator,
    Layout, LayoutChunk, LayoutError,
};

/// The layout of an array stored as uncompressed tiles at arbitrary byte positions.
///
/// Each tile is a row-major array with shape `chunk_shape` whose first element has the index `offset` in the variable.
/// Tiles may arrive in any order and need not cover the wanted section.
/// Elements not covered by any tile are never emitted.
/// Each wanted element is emitted at most once. If tiles overlap, the first tile to arrive wins and later tiles only contribute the elements not yet emitted.
pub struct LayoutTiled<I>
where
    I: DataChunkIterator<Item = DataChunk>,
{
    walk: TiledWalk<I>,
    elem_size: u64,
}

impl<I> LayoutTiled<I>
where
    I: DataChunkIterator<Item = DataChunk>,
{
    /// Create a layout for reading `want` from the tiles of `chunk_iter`.
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
        tracing::debug!("tiled layout: {want} in tiles of {chunk_shape:?}, {elem_size} byte elements");
        Ok(Self { walk, elem_size })
    }
}

impl<I> Layout for LayoutTiled<I>
where
    I: DataChunkIterator<Item = DataChunk>,
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

    fn next_chunk(&mut self) -> Result<LayoutChunk, LayoutError> {
        let (chunk, file_pos) = self.walk.next()?;
        let src_pos = chunk
            .src_elem
            .checked_mul(self.elem_size)
            .and_then(|offset| offset.checked_add(file_pos))
            .ok_or(SizeOverflowError)?;
        Ok(LayoutChunk::new(src_pos, chunk.num_elements, chunk.dest_elem))
    }
}

impl<I> Iterator for LayoutTiled<I>
where
    I: DataChunkIterator<Item = DataChunk>,
{
    type Item = Result<LayoutChunk, LayoutError>;

    fn next(&mut self) -> Option<Self::Item> {
        layout_iterator_next(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageError;

    fn tiles(tiles: Vec<DataChunk>) -> impl Iterator<Item = Result<DataChunk, StorageError>> {
        tiles.into_iter().map(Ok)
    }

    #[test]
    fn layout_tiled_partial() {
        // 2x2 tiles over a 4x4 array, want the centre 2x2
        let want = Section::new_with_origin_shape(&[1, 1], &[2, 2]).unwrap();
        let layout = LayoutTiled::new(
            tiles(vec![
                DataChunk::new(vec![0, 0], 1000),
                DataChunk::new(vec![0, 2], 2000),
                DataChunk::new(vec![2, 0], 3000),
                DataChunk::new(vec![2, 2], 4000),
            ]),
            &[2, 2],
            4,
            &want,
        )
        .unwrap();
        let chunks: Vec<_> = layout.map(Result::unwrap).collect();
        assert_eq!(
            chunks,
            vec![
                LayoutChunk::new(1000 + 3 * 4, 1, 0),
                LayoutChunk::new(2000 + 2 * 4, 1, 1),
                LayoutChunk::new(3000 + 1 * 4, 1, 2),
                LayoutChunk::new(4000, 1, 3),
            ]
        );
    }

    #[test]
    fn layout_tiled_skip_and_gap() {
        let want = Section::new_with_origin_shape(&[0], &[8]).unwrap();
        let mut layout = LayoutTiled::new(
            tiles(vec![
                DataChunk::new(vec![12], 50),
                DataChunk::new(vec![4], 10),
            ]),
            &[4],
            1,
            &want,
        )
        .unwrap();
        assert_eq!(layout.total_elements(), 8);
        assert!(layout.has_next().unwrap());
        assert_eq!(layout.next_chunk().unwrap(), LayoutChunk::new(10, 4, 4));
        assert!(!layout.has_next().unwrap());
        assert!(matches!(layout.next_chunk(), Err(LayoutError::Exhausted)));
    }

    #[test]
    fn layout_tiled_errors() {
        let want = Section::new_with_shape(&[4]);
        assert!(LayoutTiled::new(tiles(vec![]), &[2, 2], 1, &want).is_err());

        let failing = vec![
            Ok(DataChunk::new(vec![0], 0)),
            Err(StorageError::from("tile index unavailable")),
        ];
        let layout = LayoutTiled::new(failing.into_iter(), &[2], 1, &want).unwrap();
        let chunks: Vec<_> = layout.collect();
        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].is_ok());
        assert!(matches!(chunks[1], Err(LayoutError::StorageError(_))));
    }
}
