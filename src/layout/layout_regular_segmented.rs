use crate::{
    chunker::IndexChunker,
    section::{compute_size, Section, SizeOverflowError},
};

use super::{check_addressable, layout_iterator_next, Layout, LayoutChunk, LayoutError};

/// The layout of an array whose outer dimension is split into records of `rec_size` bytes.
///
/// Each record holds one outer index of the array with the inner dimensions contiguous at its start.
/// This is the layout of record variables in classic netCDF files, where the records of all record variables are interleaved.
///
/// A run of elements that crosses a record boundary is split into one chunk per record.
#[derive(Clone, Debug)]
pub struct LayoutRegularSegmented {
    chunker: IndexChunker,
    start_pos: u64,
    elem_size: u64,
    rec_size: u64,
    inner_nelems: u64,
    /// Elements of the current chunker chunk not yet emitted.
    need_inner: u64,
    src_elem: u64,
    dest_elem: u64,
}

impl LayoutRegularSegmented {
    /// Create a layout for reading `want` from an array with shape `src_shape` whose first record starts at byte `start_pos`.
    ///
    /// # Errors
    /// Returns a [`LayoutError`] if `want` does not fit within `src_shape`, `elem_size` or `rec_size` is zero, or a byte position overflows.
    pub fn new(
        start_pos: u64,
        elem_size: u64,
        rec_size: u64,
        src_shape: &[u64],
        want: &Section,
    ) -> Result<Self, LayoutError> {
        if rec_size == 0 {
            return Err(LayoutError::InvalidSegments(
                "record size must be positive".to_string(),
            ));
        }
        let inner_nelems = compute_size(src_shape.get(1..).unwrap_or_default())?;
        let num_records = src_shape.first().copied().unwrap_or(1);
        check_addressable(start_pos, elem_size, inner_nelems)?;
        num_records
            .checked_mul(rec_size)
            .and_then(|records| records.checked_add(start_pos))
            .and_then(|end| end.checked_add(inner_nelems * elem_size))
            .ok_or(SizeOverflowError)?;

        let chunker = IndexChunker::new(src_shape, want)?;
        tracing::debug!(
            "regular segmented layout: {want} of {src_shape:?} at {start_pos}, {elem_size} byte elements, {rec_size} byte records"
        );
        Ok(Self {
            chunker,
            start_pos,
            elem_size,
            rec_size,
            inner_nelems,
            need_inner: 0,
            src_elem: 0,
            dest_elem: 0,
        })
    }

    fn file_pos(&self, elem: u64) -> u64 {
        let segno = elem / self.inner_nelems;
        let offset = elem % self.inner_nelems;
        self.start_pos + segno * self.rec_size + offset * self.elem_size
    }
}

impl Layout for LayoutRegularSegmented {
    fn total_elements(&self) -> u64 {
        self.chunker.total_elements()
    }

    fn element_size(&self) -> u64 {
        self.elem_size
    }

    fn has_next(&mut self) -> Result<bool, LayoutError> {
        Ok(self.need_inner > 0 || self.chunker.has_next())
    }

    fn next_chunk(&mut self) -> Result<LayoutChunk, LayoutError> {
        if self.need_inner == 0 {
            let chunk = self.chunker.try_next()?;
            self.src_elem = chunk.src_elem;
            self.dest_elem = chunk.dest_elem;
            self.need_inner = chunk.num_elements;
        }
        let remaining_in_segment = self.inner_nelems - self.src_elem % self.inner_nelems;
        let num_elements = std::cmp::min(self.need_inner, remaining_in_segment);
        if num_elements < self.need_inner {
            tracing::trace!(
                "regular segmented layout: split at element {}",
                self.src_elem + num_elements
            );
        }
        let chunk = LayoutChunk::new(self.file_pos(self.src_elem), num_elements, self.dest_elem);
        self.src_elem += num_elements;
        self.dest_elem += num_elements;
        self.need_inner -= num_elements;
        Ok(chunk)
    }
}

impl Iterator for LayoutRegularSegmented {
    type Item = Result<LayoutChunk, LayoutError>;

    fn next(&mut self) -> Option<Self::Item> {
        layout_iterator_next(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunks(layout: LayoutRegularSegmented) -> Vec<LayoutChunk> {
        layout.map(Result::unwrap).collect()
    }

    #[test]
    fn layout_regular_segmented_window() {
        let want = Section::new_with_origin_shape(&[2, 3], &[3, 33]).unwrap();
        let layout = LayoutRegularSegmented::new(0, 4, 1000, &[29, 40], &want).unwrap();
        assert_eq!(
            chunks(layout),
            vec![
                LayoutChunk::new(2012, 33, 0),
                LayoutChunk::new(3012, 33, 33),
                LayoutChunk::new(4012, 33, 66)
            ]
        );
    }

    #[test]
    fn layout_regular_segmented_split() {
        // the chunker merges everything into one chunk of 18 elements, split at each record
        let want = Section::new_with_origin_shape(&[0, 0, 0], &[2, 3, 3]).unwrap();
        let layout = LayoutRegularSegmented::new(0, 1, 1000, &[4, 3, 3], &want).unwrap();
        assert_eq!(
            chunks(layout),
            vec![LayoutChunk::new(0, 9, 0), LayoutChunk::new(1000, 9, 9)]
        );
    }

    #[test]
    fn layout_regular_segmented_rank_one() {
        let want = Section::new_with_origin_shape(&[2], &[7]).unwrap();
        let layout = LayoutRegularSegmented::new(0, 1, 1000, &[29], &want).unwrap();
        let chunks = chunks(layout);
        assert_eq!(chunks.len(), 7);
        for (i, chunk) in chunks.iter().enumerate() {
            let i = i as u64;
            assert_eq!(*chunk, LayoutChunk::new(2000 + 1000 * i, 1, i));
        }
    }

    #[test]
    fn layout_regular_segmented_whole() {
        let want = Section::new_with_shape(&[7, 40]);
        let layout = LayoutRegularSegmented::new(8, 1, 100, &[7, 40], &want).unwrap();
        let chunks = chunks(layout);
        assert_eq!(chunks.len(), 7);
        for (i, chunk) in chunks.iter().enumerate() {
            let i = i as u64;
            assert_eq!(*chunk, LayoutChunk::new(8 + 100 * i, 40, 40 * i));
        }
    }

    #[test]
    fn layout_regular_segmented_invalid() {
        let want = Section::new_with_shape(&[2, 2]);
        assert!(LayoutRegularSegmented::new(0, 4, 0, &[2, 2], &want).is_err());
        assert!(LayoutRegularSegmented::new(0, 0, 16, &[2, 2], &want).is_err());
        assert!(LayoutRegularSegmented::new(u64::MAX - 8, 4, 16, &[2, 2], &want).is_err());
    }
}
