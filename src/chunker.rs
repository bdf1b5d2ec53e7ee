//! Chunk planners.
//!
//! A chunk planner decomposes a wanted [`Section`](crate::section::Section) into a sequence of [`Chunk`]s.
//! Each chunk is a run of elements that is contiguous in both the source and the destination.
//!  - [`IndexChunker`] plans the read of a section of a contiguous row-major array.
//!  - [`IndexChunkerTiled`] plans the read of the part of a wanted section covered by one storage tile.
//!
//! Both planners merge fully selected inner dimensions into their outer neighbours so that chunks are as large as possible.

mod chunk;
mod index_chunker;
mod index_chunker_tiled;
mod odometer;

pub use chunk::Chunk;
pub use index_chunker::IndexChunker;
pub use index_chunker_tiled::IndexChunkerTiled;

use thiserror::Error;

use crate::section::{InvalidSectionError, SizeOverflowError};

/// A chunk planner error.
#[derive(Clone, Debug, Error)]
pub enum ChunkerError {
    /// The wanted section is incompatible with the source.
    #[error(transparent)]
    InvalidSection(#[from] InvalidSectionError),
    /// The number of elements overflows.
    #[error(transparent)]
    SizeOverflow(#[from] SizeOverflowError),
    /// A chunk was requested after the last chunk.
    #[error("no chunks remain")]
    Exhausted,
}
