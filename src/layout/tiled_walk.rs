use std::collections::{BTreeMap, VecDeque};

use crate::{
    chunker::{Chunk, IndexChunkerTiled},
    section::{InvalidSectionError, Section},
};

use super::{
    data_chunk_iterator::{DataChunkIterator, Tile},
    LayoutError,
};

/// The destination elements already emitted by a walk, as disjoint half-open intervals keyed by their start.
#[derive(Debug, Default)]
struct Coverage {
    intervals: BTreeMap<u64, u64>,
}

impl Coverage {
    /// Mark `start..end` as covered and return the parts of it that were not covered before, in ascending order.
    fn claim(&mut self, start: u64, end: u64) -> Vec<std::ops::Range<u64>> {
        // intervals overlapping or touching start..end, descending
        let touching: Vec<(u64, u64)> = self
            .intervals
            .range(..=end)
            .rev()
            .take_while(|&(_, &e)| e >= start)
            .map(|(&s, &e)| (s, e))
            .collect();

        let mut gaps = Vec::new();
        let mut pos = start;
        for &(s, e) in touching.iter().rev() {
            if s > pos {
                gaps.push(pos..s.min(end));
            }
            pos = pos.max(e);
        }
        if pos < end {
            gaps.push(pos..end);
        }

        let merged_start = touching.last().map_or(start, |&(s, _)| s.min(start));
        let merged_end = touching.first().map_or(end, |&(_, e)| e.max(end));
        for (s, _) in &touching {
            self.intervals.remove(s);
        }
        self.intervals.insert(merged_start, merged_end);
        gaps
    }
}

/// A walk over the chunks of the tiles that intersect a wanted section.
///
/// Tiles are pulled lazily and tiles that do not intersect the wanted section are skipped.
/// Each destination element is emitted at most once: where tiles overlap, the first tile to arrive wins and later chunks are clipped to the elements not yet emitted.
/// The walk ends when the tiles run out or once every element of the wanted section has been emitted.
pub(super) struct TiledWalk<I>
where
    I: DataChunkIterator,
    I::Item: Tile,
{
    tiles: I,
    chunk_shape: Vec<u64>,
    want: Section,
    total_elements: u64,
    done: u64,
    coverage: Coverage,
    current: Option<(IndexChunkerTiled, <I::Item as Tile>::Location)>,
    pending: VecDeque<Chunk>,
}

impl<I> TiledWalk<I>
where
    I: DataChunkIterator,
    I::Item: Tile,
{
    pub(super) fn new(tiles: I, chunk_shape: &[u64], want: &Section) -> Result<Self, LayoutError> {
        if chunk_shape.len() != want.rank() {
            return Err(InvalidSectionError::RankMismatch(want.rank(), chunk_shape.len()).into());
        }
        let total_elements = want.num_elements()?;
        Ok(Self {
            tiles,
            chunk_shape: chunk_shape.to_vec(),
            want: want.clone(),
            total_elements,
            done: 0,
            coverage: Coverage::default(),
            current: None,
            pending: VecDeque::new(),
        })
    }

    pub(super) fn total_elements(&self) -> u64 {
        self.total_elements
    }

    pub(super) fn has_next(&mut self) -> Result<bool, LayoutError> {
        loop {
            if !self.pending.is_empty() {
                return Ok(true);
            }
            if self.done >= self.total_elements {
                return Ok(false);
            }
            if let Some((chunker, _)) = &mut self.current {
                if chunker.has_next() {
                    let chunk = chunker.try_next()?;
                    self.clip(chunk);
                    continue;
                }
            }
            let Some(tile) = self.tiles.next_data_chunk()? else {
                self.current = None;
                return Ok(false);
            };
            let data_section = Section::new_with_origin_shape(tile.offset(), &self.chunk_shape)?;
            if !data_section.intersects(&self.want) {
                tracing::trace!("tiled layout: skip tile {data_section}");
                continue;
            }
            tracing::trace!("tiled layout: tile {data_section}");
            let chunker = IndexChunkerTiled::new(&data_section, &self.want)?;
            self.current = Some((chunker, tile.into_location()));
        }
    }

    /// Queue the parts of `chunk` whose destination elements have not been emitted yet.
    fn clip(&mut self, chunk: Chunk) {
        let end = chunk.dest_elem + chunk.num_elements;
        let gaps = self.coverage.claim(chunk.dest_elem, end);
        if gaps.len() != 1 || gaps[0] != (chunk.dest_elem..end) {
            tracing::trace!("tiled layout: clipped overlapping {chunk}");
        }
        for gap in gaps {
            let num_elements = gap.end - gap.start;
            self.done += num_elements;
            self.pending.push_back(Chunk::new(
                chunk.src_elem + (gap.start - chunk.dest_elem),
                num_elements,
                gap.start,
            ));
        }
    }

    pub(super) fn next(
        &mut self,
    ) -> Result<(Chunk, <I::Item as Tile>::Location), LayoutError> {
        if !self.has_next()? {
            return Err(LayoutError::Exhausted);
        }
        let chunk = self.pending.pop_front().ok_or(LayoutError::Exhausted)?;
        let (_, location) = self.current.as_ref().ok_or(LayoutError::Exhausted)?;
        Ok((chunk, location.clone()))
    }
}
