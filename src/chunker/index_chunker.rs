use std::iter::FusedIterator;

use crate::section::{Range, Section, SizeOverflowError};

use super::{odometer::Odometer, Chunk, ChunkerError};

/// A chunk planner for a section of a contiguous row-major array.
///
/// Source offsets are element offsets from the start of the array.
/// Destination offsets are element offsets into a row-major array with the shape of the wanted section.
///
/// For example, reading rows `1..=2` of a `4x3` array yields a single chunk of 6 elements at source offset 3:
/// ```
/// # use nclayout::{chunker::{Chunk, IndexChunker}, section::Section};
/// let want = Section::new_with_origin_shape(&[1, 0], &[2, 3])?;
/// let chunks: Vec<Chunk> = IndexChunker::new(&[4, 3], &want)?.collect();
/// assert_eq!(chunks, vec![Chunk::new(3, 6, 0)]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug)]
pub struct IndexChunker {
    total_elements: u64,
    chunk_elements: u64,
    start: u64,
    odometer: Odometer<1>,
    dest_elem: u64,
    chunks_remaining: u64,
    started: bool,
}

/// A dimension of an [`IndexChunker`] under construction.
#[derive(Debug)]
struct Dim {
    /// The element stride of the dimension in the source.
    stride: u64,
    /// The extent of the dimension, or the product of the extents of merged dimensions.
    max_size: u64,
    want: Range,
    /// The wanted length of the dimension, or the product of the wanted lengths of merged dimensions.
    want_size: u64,
}

impl IndexChunker {
    /// Create a chunk planner for reading `want` from an array with shape `src_shape`.
    ///
    /// # Errors
    /// Returns [`ChunkerError`] if `want` does not fit within `src_shape` or the number of elements overflows.
    pub fn new(src_shape: &[u64], want: &Section) -> Result<Self, ChunkerError> {
        want.check_in_range(src_shape)?;
        let total_elements = want.num_elements()?;

        if total_elements == 0 {
            tracing::trace!("index chunker: empty section {want}");
            return Ok(Self::with_odometer(0, 0, 0, Odometer::new(vec![], [vec![]], [0]), 0));
        }
        if want.equivalent(src_shape) {
            tracing::trace!("index chunker: whole array of {total_elements} elements");
            return Ok(Self::with_odometer(
                total_elements,
                total_elements,
                0,
                Odometer::new(vec![], [vec![]], [0]),
                1,
            ));
        }

        // fastest dimension first
        let mut dims = Vec::with_capacity(src_shape.len());
        let mut stride = 1u64;
        for (&extent, range) in std::iter::zip(src_shape, want.ranges()).rev() {
            dims.push(Dim {
                stride,
                max_size: extent,
                want: *range,
                want_size: range.length(),
            });
            stride = stride.checked_mul(extent).ok_or(SizeOverflowError)?;
        }

        let start: u64 = dims
            .iter()
            .map(|dim| dim.stride * dim.want.first())
            .sum();

        // merge fully selected inner dimensions into their outer neighbour
        let mut merged = 0;
        while merged + 1 < dims.len() {
            let (inner, outer) = (&dims[merged], &dims[merged + 1]);
            if inner.max_size != inner.want_size || outer.want.stride() != 1 {
                break;
            }
            let max_size = outer
                .max_size
                .checked_mul(inner.max_size)
                .ok_or(SizeOverflowError)?;
            let want_size = outer
                .want_size
                .checked_mul(inner.want_size)
                .ok_or(SizeOverflowError)?;
            let stride = inner.stride;
            let outer = &mut dims[merged + 1];
            outer.max_size = max_size;
            outer.want_size = want_size;
            outer.stride = stride;
            merged += 1;
        }
        dims.drain(..merged);
        if merged > 0 {
            tracing::trace!("index chunker: merged {merged} inner dimensions");
        }

        let chunk_elements = match dims.first_mut() {
            Some(inner) if inner.want.stride() == 1 => {
                let n = inner.want_size;
                inner.want_size = 1;
                n
            }
            _ => 1,
        };

        let shape: Vec<u64> = dims.iter().rev().map(|dim| dim.want_size).collect();
        let strides: Vec<u64> = dims
            .iter()
            .rev()
            .map(|dim| dim.stride * dim.want.stride())
            .collect();
        let odometer = Odometer::new(shape, [strides], [0]);
        let num_chunks = odometer.num_positions().ok_or(SizeOverflowError)?;
        debug_assert_eq!(num_chunks.checked_mul(chunk_elements), Some(total_elements));

        tracing::trace!(
            "index chunker: {num_chunks} chunks of {chunk_elements} elements starting at {start}"
        );
        Ok(Self::with_odometer(
            total_elements,
            chunk_elements,
            start,
            odometer,
            num_chunks,
        ))
    }

    /// Create a chunk planner for reading the whole of an array with shape `src_shape`.
    ///
    /// # Errors
    /// Returns [`ChunkerError`] if the number of elements overflows.
    pub fn new_whole(src_shape: &[u64]) -> Result<Self, ChunkerError> {
        Self::new(src_shape, &Section::new_with_shape(src_shape))
    }

    fn with_odometer(
        total_elements: u64,
        chunk_elements: u64,
        start: u64,
        odometer: Odometer<1>,
        chunks_remaining: u64,
    ) -> Self {
        Self {
            total_elements,
            chunk_elements,
            start,
            odometer,
            dest_elem: 0,
            chunks_remaining,
            started: false,
        }
    }

    /// Return the number of elements in the wanted section.
    #[must_use]
    pub fn total_elements(&self) -> u64 {
        self.total_elements
    }

    /// Return the number of elements in each chunk.
    #[must_use]
    pub fn chunk_elements(&self) -> u64 {
        self.chunk_elements
    }

    /// Returns true if there are chunks remaining.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.chunks_remaining > 0
    }

    /// Return the next chunk.
    ///
    /// # Errors
    /// Returns [`ChunkerError::Exhausted`] if there are no chunks remaining.
    pub fn try_next(&mut self) -> Result<Chunk, ChunkerError> {
        if self.chunks_remaining == 0 {
            return Err(ChunkerError::Exhausted);
        }
        if self.started {
            self.odometer.increment();
            self.dest_elem += self.chunk_elements;
        } else {
            self.started = true;
        }
        self.chunks_remaining -= 1;
        Ok(Chunk::new(
            self.start + self.odometer.offset(0),
            self.chunk_elements,
            self.dest_elem,
        ))
    }
}

impl Iterator for IndexChunker {
    type Item = Chunk;

    fn next(&mut self) -> Option<Self::Item> {
        self.try_next().ok()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        usize::try_from(self.chunks_remaining)
            .map_or((usize::MAX, None), |remaining| (remaining, Some(remaining)))
    }
}

impl ExactSizeIterator for IndexChunker {}

impl FusedIterator for IndexChunker {}
