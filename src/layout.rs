//! Layouts.
//!
//! A layout maps a wanted [`Section`](crate::section::Section) of a variable onto its physical storage.
//! It yields a sequence of chunks, each a run of elements that is contiguous in both storage and the destination array.
//!
//! Layouts that address a byte position in storage implement [`Layout`]:
//!  - [`LayoutRegular`]: a contiguous row-major array at a fixed position.
//!  - [`LayoutRegularSegmented`]: an array whose outer dimension is split into records of a fixed byte size.
//!  - [`LayoutSegmented`]: an array split into irregular segments.
//!  - [`LayoutTiled`]: an array split into tiles at arbitrary positions.
//!
//! Layouts that address an in-memory buffer implement [`LayoutBB`]:
//!  - [`LayoutBBTiled`]: an array split into decoded tile buffers.
//!
//! A layout is constructed for one transfer, drained, then discarded.

mod data_chunk_iterator;
mod layout_bb_tiled;
mod layout_regular;
mod layout_regular_segmented;
mod layout_segmented;
mod layout_tiled;
mod tiled_walk;

pub use data_chunk_iterator::{DataChunk, DataChunkBB, DataChunkIterator};
pub use layout_bb_tiled::{LayoutBBChunk, LayoutBBTiled};
pub use layout_regular::LayoutRegular;
pub use layout_regular_segmented::LayoutRegularSegmented;
pub use layout_segmented::LayoutSegmented;
pub use layout_tiled::LayoutTiled;

use derive_more::Display;
use thiserror::Error;

use crate::{
    chunker::ChunkerError,
    section::{InvalidSectionError, SizeOverflowError},
    storage::StorageError,
};

/// A run of elements at a byte position in storage.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default, Display)]
#[display("{num_elements} elements from byte {src_pos} to destination {dest_elem}")]
pub struct LayoutChunk {
    /// The byte position of the run in storage.
    pub src_pos: u64,
    /// The number of elements in the run.
    pub num_elements: u64,
    /// The element offset of the run in the destination.
    pub dest_elem: u64,
}

impl LayoutChunk {
    /// Create a new layout chunk.
    #[must_use]
    pub const fn new(src_pos: u64, num_elements: u64, dest_elem: u64) -> Self {
        Self {
            src_pos,
            num_elements,
            dest_elem,
        }
    }
}

/// A layout error.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// The wanted section is incompatible with the variable.
    #[error(transparent)]
    InvalidSection(#[from] InvalidSectionError),
    /// The number of elements or a byte position overflows.
    #[error(transparent)]
    SizeOverflow(#[from] SizeOverflowError),
    /// The segments of a segmented layout are invalid.
    #[error("invalid segments: {0}")]
    InvalidSegments(String),
    /// The element size is invalid.
    #[error("invalid element size {0}")]
    InvalidElementSize(u64),
    /// A chunk was requested after the last chunk.
    #[error("no chunks remain")]
    Exhausted,
    /// An error retrieving tiles or tile data.
    #[error(transparent)]
    StorageError(#[from] StorageError),
}

impl From<ChunkerError> for LayoutError {
    fn from(err: ChunkerError) -> Self {
        match err {
            ChunkerError::InvalidSection(err) => Self::InvalidSection(err),
            ChunkerError::SizeOverflow(err) => Self::SizeOverflow(err),
            ChunkerError::Exhausted => Self::Exhausted,
        }
    }
}

/// Traits for layouts that address byte positions in storage.
pub trait Layout {
    /// Return the number of elements in the wanted section.
    fn total_elements(&self) -> u64;

    /// Return the size of an element in bytes.
    fn element_size(&self) -> u64;

    /// Returns true if there are chunks remaining.
    ///
    /// # Errors
    /// Returns a [`LayoutError`] if the next chunk cannot be located.
    fn has_next(&mut self) -> Result<bool, LayoutError>;

    /// Return the next chunk.
    ///
    /// # Errors
    /// Returns [`LayoutError::Exhausted`] if there are no chunks remaining, or another [`LayoutError`] if the next chunk cannot be located.
    fn next_chunk(&mut self) -> Result<LayoutChunk, LayoutError>;
}

/// Traits for layouts that address in-memory tile buffers.
pub trait LayoutBB {
    /// Return the number of elements in the wanted section.
    fn total_elements(&self) -> u64;

    /// Return the size of an element in bytes.
    fn element_size(&self) -> u64;

    /// Returns true if there are chunks remaining.
    ///
    /// # Errors
    /// Returns a [`LayoutError`] if the next chunk cannot be located.
    fn has_next(&mut self) -> Result<bool, LayoutError>;

    /// Return the next chunk.
    ///
    /// # Errors
    /// Returns [`LayoutError::Exhausted`] if there are no chunks remaining, or another [`LayoutError`] if the next chunk cannot be located.
    fn next_chunk(&mut self) -> Result<LayoutBBChunk, LayoutError>;
}

/// Advance a layout as an iterator.
fn layout_iterator_next<L: Layout + ?Sized>(
    layout: &mut L,
) -> Option<Result<LayoutChunk, LayoutError>> {
    match layout.has_next() {
        Ok(true) => Some(layout.next_chunk()),
        Ok(false) => None,
        Err(err) => Some(Err(err)),
    }
}

/// Advance a buffer layout as an iterator.
fn layout_bb_iterator_next<L: LayoutBB + ?Sized>(
    layout: &mut L,
) -> Option<Result<LayoutBBChunk, LayoutError>> {
    match layout.has_next() {
        Ok(true) => Some(layout.next_chunk()),
        Ok(false) => None,
        Err(err) => Some(Err(err)),
    }
}

/// Check that an element size is positive and that every byte of an array of `num_elements` elements at `start_pos` is addressable.
fn check_addressable(start_pos: u64, elem_size: u64, num_elements: u64) -> Result<(), LayoutError> {
    if elem_size == 0 {
        return Err(LayoutError::InvalidElementSize(elem_size));
    }
    num_elements
        .checked_mul(elem_size)
        .and_then(|num_bytes| num_bytes.checked_add(start_pos))
        .ok_or(SizeOverflowError)?;
    Ok(())
}
