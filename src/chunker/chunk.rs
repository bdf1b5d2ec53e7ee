use derive_more::Display;

/// A run of elements that is contiguous in both the source and the destination.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default, Display)]
#[display("{num_elements} elements from source {src_elem} to destination {dest_elem}")]
pub struct Chunk {
    /// The element offset of the run in the source.
    pub src_elem: u64,
    /// The number of elements in the run.
    pub num_elements: u64,
    /// The element offset of the run in the destination.
    pub dest_elem: u64,
}

impl Chunk {
    /// Create a new chunk.
    #[must_use]
    pub const fn new(src_elem: u64, num_elements: u64, dest_elem: u64) -> Self {
        Self {
            src_elem,
            num_elements,
            dest_elem,
        }
    }
}
