use itertools::izip;

use crate::{
    chunker::IndexChunker,
    section::{compute_size, Section, SizeOverflowError},
};

use super::{layout_iterator_next, Layout, LayoutChunk, LayoutError};

/// The layout of a row-major array split into irregular segments.
///
/// Segment `i` holds `seg_size[i]` bytes at byte position `seg_pos[i]`.
/// Concatenated in order, the segments hold the elements of the array.
/// A run of elements that crosses a segment boundary is split into one chunk per segment.
#[derive(Clone, Debug)]
pub struct LayoutSegmented {
    chunker: IndexChunker,
    elem_size: u64,
    seg_pos: Vec<u64>,
    /// The first element of each segment.
    seg_min: Vec<u64>,
    /// One past the last element of each segment.
    seg_max: Vec<u64>,
    /// The segment of the most recent lookup.
    cursor: usize,
    need: u64,
    src_elem: u64,
    dest_elem: u64,
}

impl LayoutSegmented {
    /// Create a layout for reading `want` from an array with shape `src_shape` stored in segments.
    ///
    /// # Errors
    /// Returns [`LayoutError::InvalidSegments`] if `seg_pos` and `seg_size` have different lengths, a segment size is not a multiple of `elem_size`, or the segments do not hold the whole array.
    /// Returns another [`LayoutError`] if `want` does not fit within `src_shape`, `elem_size` is zero, or a byte position overflows.
    pub fn new(
        seg_pos: Vec<u64>,
        seg_size: Vec<u64>,
        elem_size: u64,
        src_shape: &[u64],
        want: &Section,
    ) -> Result<Self, LayoutError> {
        if elem_size == 0 {
            return Err(LayoutError::InvalidElementSize(elem_size));
        }
        if seg_pos.len() != seg_size.len() {
            return Err(LayoutError::InvalidSegments(format!(
                "{} segment positions and {} segment sizes",
                seg_pos.len(),
                seg_size.len()
            )));
        }

        let mut seg_min = Vec::with_capacity(seg_size.len());
        let mut seg_max = Vec::with_capacity(seg_size.len());
        let mut total_seg_elems = 0u64;
        for (i, (&pos, &size)) in izip!(&seg_pos, &seg_size).enumerate() {
            if size % elem_size != 0 {
                return Err(LayoutError::InvalidSegments(format!(
                    "segment {i} size {size} is not a multiple of the element size {elem_size}"
                )));
            }
            pos.checked_add(size).ok_or(SizeOverflowError)?;
            seg_min.push(total_seg_elems);
            total_seg_elems = total_seg_elems
                .checked_add(size / elem_size)
                .ok_or(SizeOverflowError)?;
            seg_max.push(total_seg_elems);
        }

        let num_elements = compute_size(src_shape)?;
        if total_seg_elems < num_elements {
            return Err(LayoutError::InvalidSegments(format!(
                "segments hold {total_seg_elems} elements, the array has {num_elements}"
            )));
        }

        let chunker = IndexChunker::new(src_shape, want)?;
        tracing::debug!(
            "segmented layout: {want} of {src_shape:?} in {} segments, {elem_size} byte elements",
            seg_pos.len()
        );
        Ok(Self {
            chunker,
            elem_size,
            seg_pos,
            seg_min,
            seg_max,
            cursor: 0,
            need: 0,
            src_elem: 0,
            dest_elem: 0,
        })
    }

    /// Return the segment holding `elem`.
    ///
    /// Chunks advance mostly forward, so the scan resumes from the previous segment.
    fn segment(&mut self, elem: u64) -> usize {
        if elem < self.seg_min[self.cursor] {
            self.cursor = 0;
        }
        while elem >= self.seg_max[self.cursor] {
            self.cursor += 1;
        }
        self.cursor
    }
}

impl Layout for LayoutSegmented {
    fn total_elements(&self) -> u64 {
        self.chunker.total_elements()
    }

    fn element_size(&self) -> u64 {
        self.elem_size
    }

    fn has_next(&mut self) -> Result<bool, LayoutError> {
        Ok(self.need > 0 || self.chunker.has_next())
    }

    fn next_chunk(&mut self) -> Result<LayoutChunk, LayoutError> {
        if self.need == 0 {
            let chunk = self.chunker.try_next()?;
            self.src_elem = chunk.src_elem;
            self.dest_elem = chunk.dest_elem;
            self.need = chunk.num_elements;
        }
        let segno = self.segment(self.src_elem);
        let num_elements = std::cmp::min(self.need, self.seg_max[segno] - self.src_elem);
        let src_pos =
            self.seg_pos[segno] + (self.src_elem - self.seg_min[segno]) * self.elem_size;
        let chunk = LayoutChunk::new(src_pos, num_elements, self.dest_elem);
        self.src_elem += num_elements;
        self.dest_elem += num_elements;
        self.need -= num_elements;
        Ok(chunk)
    }
}

impl Iterator for LayoutSegmented {
    type Item = Result<LayoutChunk, LayoutError>;

    fn next(&mut self) -> Option<Self::Item> {
        layout_iterator_next(self)
    }
}
