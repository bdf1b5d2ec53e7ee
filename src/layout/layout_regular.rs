use crate::{
    chunker::IndexChunker,
    section::{compute_size, Section},
};

use super::{check_addressable, layout_iterator_next, Layout, LayoutChunk, LayoutError};

/// The layout of a contiguous row-major array at a fixed byte position.
#[derive(Clone, Debug)]
pub struct LayoutRegular {
    chunker: IndexChunker,
    start_pos: u64,
    elem_size: u64,
}

impl LayoutRegular {
    /// Create a layout for reading `want` from an array with shape `src_shape` starting at byte `start_pos`.
    ///
    /// # Errors
    /// Returns a [`LayoutError`] if `want` does not fit within `src_shape`, `elem_size` is zero, or a byte position overflows.
    pub fn new(
        start_pos: u64,
        elem_size: u64,
        src_shape: &[u64],
        want: &Section,
    ) -> Result<Self, LayoutError> {
        check_addressable(start_pos, elem_size, compute_size(src_shape)?)?;
        let chunker = IndexChunker::new(src_shape, want)?;
        tracing::debug!(
            "regular layout: {want} of {src_shape:?} at {start_pos}, {} byte elements",
            elem_size
        );
        Ok(Self {
            chunker,
            start_pos,
            elem_size,
        })
    }

    /// Return the number of elements in each chunk.
    #[must_use]
    pub fn chunk_elements(&self) -> u64 {
        self.chunker.chunk_elements()
    }
}

impl Layout for LayoutRegular {
    fn total_elements(&self) -> u64 {
        self.chunker.total_elements()
    }

    fn element_size(&self) -> u64 {
        self.elem_size
    }

    fn has_next(&mut self) -> Result<bool, LayoutError> {
        Ok(self.chunker.has_next())
    }

    fn next_chunk(&mut self) -> Result<LayoutChunk, LayoutError> {
        let chunk = self.chunker.try_next()?;
        Ok(LayoutChunk::new(
            self.start_pos + chunk.src_elem * self.elem_size,
            chunk.num_elements,
            chunk.dest_elem,
        ))
    }
}

impl Iterator for LayoutRegular {
    type Item = Result<LayoutChunk, LayoutError>;

    fn next(&mut self) -> Option<Self::Item> {
        layout_iterator_next(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_regular() {
        let want = Section::new_with_origin_shape(&[2, 3], &[7, 33]).unwrap();
        let mut layout = LayoutRegular::new(100, 4, &[29, 40], &want).unwrap();
        assert_eq!(layout.total_elements(), 7 * 33);
        assert_eq!(layout.element_size(), 4);
        assert_eq!(layout.chunk_elements(), 33);
        let first = layout.next_chunk().unwrap();
        assert_eq!(first, LayoutChunk::new(100 + 83 * 4, 33, 0));
        let rest: Vec<LayoutChunk> = layout.map(Result::unwrap).collect();
        assert_eq!(rest.len(), 6);
        assert_eq!(rest[5], LayoutChunk::new(100 + 323 * 4, 33, 6 * 33));
    }

    #[test]
    fn layout_regular_invalid() {
        let want = Section::new_with_shape(&[2]);
        assert!(matches!(
            LayoutRegular::new(0, 0, &[2], &want),
            Err(LayoutError::InvalidElementSize(0))
        ));
        assert!(matches!(
            LayoutRegular::new(u64::MAX, 1, &[2], &want),
            Err(LayoutError::SizeOverflow(_))
        ));
        assert!(matches!(
            LayoutRegular::new(0, 1, &[1], &want),
            Err(LayoutError::InvalidSection(_))
        ));
        let mut layout = LayoutRegular::new(0, 1, &[2], &want).unwrap();
        assert_eq!(layout.next_chunk().unwrap(), LayoutChunk::new(0, 2, 0));
        assert!(!layout.has_next().unwrap());
        assert!(matches!(layout.next_chunk(), Err(LayoutError::Exhausted)));
    }
}
