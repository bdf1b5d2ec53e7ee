use std::iter::FusedIterator;

use crate::section::{Section, SizeOverflowError};

use super::{odometer::Odometer, Chunk, ChunkerError};

const SRC: usize = 0;
const DEST: usize = 1;

/// A chunk planner for the intersection of one storage tile with a wanted section.
///
/// Source offsets are element offsets within the tile, a row-major array with the shape of `data_section`.
/// Destination offsets are element offsets into a row-major array with the shape of the wanted section.
///
/// A single counter over the intersection drives two projections, one with the strides of the tile and one with the strides of the wanted section.
#[derive(Clone, Debug)]
pub struct IndexChunkerTiled {
    total_elements: u64,
    chunk_elements: u64,
    start_src: u64,
    start_dest: u64,
    odometer: Odometer<2>,
    chunks_remaining: u64,
    started: bool,
}

/// A dimension of an [`IndexChunkerTiled`] under construction.
#[derive(Debug)]
struct Dim {
    data_stride: u64,
    data_len: u64,
    want_stride: u64,
    want_len: u64,
    /// Source offset increment of one step along the intersection.
    data_inc: u64,
    /// Destination offset increment of one step along the intersection.
    want_inc: u64,
    /// The number of steps along the intersection.
    size: u64,
    /// Step size of the intersection in index space.
    step: u64,
}

impl IndexChunkerTiled {
    /// Create a chunk planner for the elements of `want_section` covered by a tile spanning `data_section`.
    ///
    /// `data_section` must not be strided.
    /// A tile that does not intersect `want_section` produces no chunks.
    ///
    /// # Errors
    /// Returns [`ChunkerError`] if the sections have different ranks or the number of elements overflows.
    pub fn new(data_section: &Section, want_section: &Section) -> Result<Self, ChunkerError> {
        let intersect = data_section.intersect(want_section)?;
        let total_elements = intersect.num_elements()?;
        if total_elements == 0 {
            return Ok(Self {
                total_elements: 0,
                chunk_elements: 0,
                start_src: 0,
                start_dest: 0,
                odometer: Odometer::new(vec![], [vec![], vec![]], [0, 0]),
                chunks_remaining: 0,
                started: false,
            });
        }

        // fastest dimension first
        let mut dims = Vec::with_capacity(intersect.rank());
        let (mut data_stride, mut want_stride) = (1u64, 1u64);
        for ((dr, wr), ir) in std::iter::zip(
            std::iter::zip(data_section.ranges(), want_section.ranges()),
            intersect.ranges(),
        )
        .rev()
        {
            dims.push(Dim {
                data_stride,
                data_len: dr.length(),
                want_stride,
                want_len: wr.length(),
                data_inc: data_stride * (ir.stride() / dr.stride()),
                want_inc: want_stride * (ir.stride() / wr.stride()),
                size: ir.length(),
                step: ir.stride(),
            });
            data_stride = data_stride
                .checked_mul(dr.length())
                .ok_or(SizeOverflowError)?;
            want_stride = want_stride
                .checked_mul(wr.length())
                .ok_or(SizeOverflowError)?;
        }

        // merge dimensions fully covered by both the tile and the wanted section
        let mut merged = 0;
        while merged + 1 < dims.len() {
            let (inner, outer) = (&dims[merged], &dims[merged + 1]);
            if inner.size != inner.data_len
                || inner.size != inner.want_len
                || outer.data_inc != outer.data_stride
                || outer.want_inc != outer.want_stride
            {
                break;
            }
            let size = outer.size.checked_mul(inner.size).ok_or(SizeOverflowError)?;
            let data_len = outer
                .data_len
                .checked_mul(inner.data_len)
                .ok_or(SizeOverflowError)?;
            let want_len = outer
                .want_len
                .checked_mul(inner.want_len)
                .ok_or(SizeOverflowError)?;
            let (data_stride, want_stride) = (inner.data_stride, inner.want_stride);
            let outer = &mut dims[merged + 1];
            outer.size = size;
            outer.data_len = data_len;
            outer.want_len = want_len;
            outer.data_stride = data_stride;
            outer.want_stride = want_stride;
            outer.data_inc = data_stride;
            outer.want_inc = want_stride;
            outer.step = 1;
            merged += 1;
        }
        dims.drain(..merged);

        let chunk_elements = match dims.first_mut() {
            Some(inner) if inner.step == 1 => {
                let n = inner.size;
                inner.size = 1;
                n
            }
            _ => 1,
        };

        let start_src = data_section.offset(&intersect)?;
        let start_dest = want_section.offset(&intersect)?;

        let shape: Vec<u64> = dims.iter().rev().map(|dim| dim.size).collect();
        let src_strides: Vec<u64> = dims.iter().rev().map(|dim| dim.data_inc).collect();
        let dest_strides: Vec<u64> = dims.iter().rev().map(|dim| dim.want_inc).collect();
        let odometer = Odometer::new(shape, [src_strides, dest_strides], [0, 0]);
        let num_chunks = odometer.num_positions().ok_or(SizeOverflowError)?;
        debug_assert_eq!(num_chunks.checked_mul(chunk_elements), Some(total_elements));

        tracing::trace!(
            "tiled chunker: tile {data_section} want {want_section} intersect {intersect}, {num_chunks} chunks of {chunk_elements} elements"
        );
        Ok(Self {
            total_elements,
            chunk_elements,
            start_src,
            start_dest,
            odometer,
            chunks_remaining: num_chunks,
            started: false,
        })
    }

    /// Return the number of elements in the intersection of the tile and the wanted section.
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
        } else {
            self.started = true;
        }
        self.chunks_remaining -= 1;
        Ok(Chunk::new(
            self.start_src + self.odometer.offset(SRC),
            self.chunk_elements,
            self.start_dest + self.odometer.offset(DEST),
        ))
    }
}

impl Iterator for IndexChunkerTiled {
    type Item = Chunk;

    fn next(&mut self) -> Option<Self::Item> {
        self.try_next().ok()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        usize::try_from(self.chunks_remaining)
            .map_or((usize::MAX, None), |remaining| (remaining, Some(remaining)))
    }
}

impl ExactSizeIterator for IndexChunkerTiled {}

impl FusedIterator for IndexChunkerTiled {}
