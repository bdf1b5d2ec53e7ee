use nclayout::chunker::{Chunk, IndexChunker, IndexChunkerTiled};
use nclayout::layout::{
    DataChunk, Layout, LayoutChunk, LayoutRegular, LayoutRegularSegmented, LayoutSegmented,
    LayoutTiled,
};
use nclayout::section::{Section, SectionSpec};
use nclayout::storage::StorageError;

fn section(spec: &str, shape: &[u64]) -> Section {
    spec.parse::<SectionSpec>().unwrap().fill(shape).unwrap()
}

/// The source element offsets of `want` in row-major order.
fn expected_src_offsets(shape: &[u64], want: &Section) -> Vec<u64> {
    let mut offsets = vec![0u64];
    for (dim, range) in want.ranges().iter().enumerate() {
        let stride: u64 = shape[dim + 1..].iter().product();
        offsets = offsets
            .iter()
            .flat_map(|&base| (0..range.length()).map(move |i| base + range.element(i) * stride))
            .collect();
    }
    offsets
}

/// Expand chunks into per element (source, destination) offsets.
fn expand(chunks: &[Chunk]) -> Vec<(u64, u64)> {
    chunks
        .iter()
        .flat_map(|chunk| (0..chunk.num_elements).map(|i| (chunk.src_elem + i, chunk.dest_elem + i)))
        .collect()
}

#[test]
fn index_chunker_coverage() {
    let cases: &[(&[u64], &str)] = &[
        (&[4, 3], "(:,:)"),
        (&[4, 3], "(1:2,:)"),
        (&[4, 3], "(:,1)"),
        (&[5, 4, 3], "(0:4:2,1:3,0:2)"),
        (&[5, 4, 3], "(1:3,:,1:2)"),
        (&[5, 4, 3], "(:,:,0:2:2)"),
        (&[5, 4, 3], "(4,3,2)"),
        (&[7], "(2:6:3)"),
        (&[2, 3, 4, 5], "(:,1:2,:,:)"),
        (&[2, 3, 4, 5], "(1,:,3,0:4:4)"),
        (&[3, 1, 6], "(0:2:2,:,1:5)"),
    ];
    for &(shape, spec) in cases {
        let want = section(spec, shape);
        let total = want.num_elements().unwrap();
        let chunks: Vec<Chunk> = IndexChunker::new(shape, &want).unwrap().collect();
        let elements = expand(&chunks);

        let dest: Vec<u64> = elements.iter().map(|&(_, dest)| dest).collect();
        assert_eq!(dest, (0..total).collect::<Vec<_>>(), "{spec} of {shape:?}");
        let src: Vec<u64> = elements.iter().map(|&(src, _)| src).collect();
        assert_eq!(src, expected_src_offsets(shape, &want), "{spec} of {shape:?}");
    }
}

#[test]
fn index_chunker_strided_fastest() {
    // a strided fastest dimension is transferred one element at a time
    let want = section("(1:2,0:4:2)", &[3, 5]);
    let chunker = IndexChunker::new(&[3, 5], &want).unwrap();
    assert_eq!(chunker.chunk_elements(), 1);
    assert_eq!(chunker.len(), 6);
    let src: Vec<u64> = chunker.map(|chunk| chunk.src_elem).collect();
    assert_eq!(src, vec![5, 7, 9, 10, 12, 14]);
}

#[test]
fn index_chunker_scenarios() {
    // rows 1..2, all columns merge into one run
    let want = section("(1:2,:)", &[4, 3]);
    let chunks: Vec<Chunk> = IndexChunker::new(&[4, 3], &want).unwrap().collect();
    assert_eq!(chunks, vec![Chunk::new(3, 6, 0)]);

    // column 1
    let want = section("(:,1)", &[4, 3]);
    let chunks: Vec<Chunk> = IndexChunker::new(&[4, 3], &want).unwrap().collect();
    assert_eq!(
        chunks,
        vec![
            Chunk::new(1, 1, 0),
            Chunk::new(4, 1, 1),
            Chunk::new(7, 1, 2),
            Chunk::new(10, 1, 3),
        ]
    );

    // the whole array
    let want = Section::new_with_shape(&[4, 3]);
    let chunks: Vec<Chunk> = IndexChunker::new(&[4, 3], &want).unwrap().collect();
    assert_eq!(chunks, vec![Chunk::new(0, 12, 0)]);
}

#[test]
fn index_chunker_invalid() {
    let want = Section::new_with_shape(&[4, 4]);
    assert!(IndexChunker::new(&[4, 3], &want).is_err());
    let want = Section::new_with_shape(&[4]);
    assert!(IndexChunker::new(&[4, 3], &want).is_err());
}

/// The (tile source, destination) offsets of the intersection of a tile with `want`.
fn expected_tiled(data: &Section, want: &Section) -> Vec<(u64, u64)> {
    let data_shape = data.shape();
    let want_shape = want.shape();
    let mut points = vec![(0u64, 0u64, true)];
    for (dim, (data_range, want_range)) in std::iter::zip(data.ranges(), want.ranges()).enumerate() {
        let data_stride: u64 = data_shape[dim + 1..].iter().product();
        let want_stride: u64 = want_shape[dim + 1..].iter().product();
        points = points
            .iter()
            .flat_map(|&(src, dest, inside)| {
                (0..want_range.length()).map(move |i| {
                    let index = want_range.element(i);
                    let inside = inside && data_range.contains(index);
                    let src = src + index.saturating_sub(data_range.first()) * data_stride;
                    (src, dest + i * want_stride, inside)
                })
            })
            .collect();
    }
    points
        .into_iter()
        .filter(|&(_, _, inside)| inside)
        .map(|(src, dest, _)| (src, dest))
        .collect()
}

#[test]
fn index_chunker_tiled_coverage() {
    let cases: &[(&str, &str)] = &[
        ("(0:1,0:2)", "(0:5,0:4)"),
        ("(2:3,3:5)", "(1:4,1:4)"),
        ("(0:3,0:3)", "(1:2,0:3)"),
        ("(4:7,0:9)", "(0:9:3,2:7)"),
        ("(0:3,2:5)", "(1:3,1:9:2)"),
        ("(0:1,0:1,0:3)", "(0:1,1,:)"),
    ];
    for &(data, want) in cases {
        let rank = data.matches(',').count() + 1;
        let shape = vec![10; rank];
        let data = section(data, &shape);
        let want = section(want, &shape);
        let chunks: Vec<Chunk> = IndexChunkerTiled::new(&data, &want).unwrap().collect();
        assert_eq!(expand(&chunks), expected_tiled(&data, &want), "{data} in {want}");
    }
}

#[test]
fn index_chunker_tiled_partial_coverage() {
    // two disjoint tiles that leave rows 2..3, columns 2..3 uncovered
    let want = Section::new_with_shape(&[4, 4]);
    let tile_a = section("(0:1,0:3)", &[4, 4]);
    let tile_b = section("(2:3,0:1)", &[4, 4]);
    let mut dest: Vec<u64> = [tile_a, tile_b]
        .iter()
        .flat_map(|tile| {
            let chunks: Vec<Chunk> = IndexChunkerTiled::new(tile, &want).unwrap().collect();
            expand(&chunks).into_iter().map(|(_, dest)| dest)
        })
        .collect();
    dest.sort_unstable();
    assert_eq!(dest, vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 12, 13]);

    let disjoint = section("(0:1,0:1)", &[4, 4]);
    let want = section("(2:3,2:3)", &[4, 4]);
    assert_eq!(IndexChunkerTiled::new(&disjoint, &want).unwrap().count(), 0);
}

#[test]
fn layout_regular_scenarios() {
    let want = section("(:,1)", &[4, 3]);
    let layout = LayoutRegular::new(100, 8, &[4, 3], &want).unwrap();
    assert_eq!(layout.total_elements(), 4);
    let chunks: Vec<LayoutChunk> = layout.map(Result::unwrap).collect();
    assert_eq!(
        chunks,
        vec![
            LayoutChunk::new(108, 1, 0),
            LayoutChunk::new(132, 1, 1),
            LayoutChunk::new(156, 1, 2),
            LayoutChunk::new(180, 1, 3),
        ]
    );
}

#[test]
fn layout_regular_segmented_boundaries() {
    // 3 records of 4 two byte elements, with 20 byte records
    let (start, elem_size, rec_size, inner_bytes) = (100, 2, 20, 8);
    for spec in ["(:,:)", "(0:1,1:3)", "(1:2,:)", "(:,2)"] {
        let want = section(spec, &[3, 4]);
        let layout = LayoutRegularSegmented::new(start, elem_size, rec_size, &[3, 4], &want).unwrap();
        let total = layout.total_elements();
        let chunks: Vec<LayoutChunk> = layout.map(Result::unwrap).collect();
        for chunk in &chunks {
            let record_offset = (chunk.src_pos - start) % rec_size;
            assert!(record_offset + chunk.num_elements * elem_size <= inner_bytes, "{spec}: {chunk}");
        }
        assert_eq!(chunks.iter().map(|c| c.num_elements).sum::<u64>(), total);
    }

    let want = Section::new_with_shape(&[3, 4]);
    let chunks: Vec<LayoutChunk> = LayoutRegularSegmented::new(100, 2, 20, &[3, 4], &want)
        .unwrap()
        .map(Result::unwrap)
        .collect();
    assert_eq!(
        chunks,
        vec![
            LayoutChunk::new(100, 4, 0),
            LayoutChunk::new(120, 4, 4),
            LayoutChunk::new(140, 4, 8),
        ]
    );
}

#[test]
fn layout_segmented_matches_regular_segmented() {
    // irregular segments that happen to be regular records
    let want = section("(0:2,1:3)", &[3, 4]);
    let segmented: Vec<LayoutChunk> =
        LayoutSegmented::new(vec![100, 120, 140], vec![8, 8, 8], 2, &[3, 4], &want)
            .unwrap()
            .map(Result::unwrap)
            .collect();
    let regular_segmented: Vec<LayoutChunk> =
        LayoutRegularSegmented::new(100, 2, 20, &[3, 4], &want)
            .unwrap()
            .map(Result::unwrap)
            .collect();
    assert_eq!(segmented, regular_segmented);
}

#[test]
fn layout_tiled_overlapping_tiles() {
    // the second tile overlaps the first, only its last element is new
    let want = Section::new_with_shape(&[4]);
    let tiles = vec![
        Ok::<_, StorageError>(DataChunk::new(vec![0], 1000)),
        Ok(DataChunk::new(vec![1], 2000)),
    ];
    let chunks: Vec<LayoutChunk> = LayoutTiled::new(tiles.into_iter(), &[3], 1, &want)
        .unwrap()
        .map(Result::unwrap)
        .collect();
    assert_eq!(
        chunks,
        vec![LayoutChunk::new(1000, 3, 0), LayoutChunk::new(2002, 1, 3)]
    );
}

#[test]
fn layout_tiled_duplicate_tile_before_unique_tile() {
    // a duplicate of the first tile must not stop the walk before the tile covering 2..4
    let want = Section::new_with_shape(&[4]);
    let tiles = vec![
        Ok::<_, StorageError>(DataChunk::new(vec![0], 1000)),
        Ok(DataChunk::new(vec![0], 2000)),
        Ok(DataChunk::new(vec![2], 3000)),
    ];
    let mut layout = LayoutTiled::new(tiles.into_iter(), &[2], 2, &want).unwrap();
    let mut chunks = Vec::new();
    while layout.has_next().unwrap() {
        chunks.push(layout.next_chunk().unwrap());
    }
    assert_eq!(
        chunks,
        vec![LayoutChunk::new(1000, 2, 0), LayoutChunk::new(3000, 2, 2)]
    );
    let emitted: u64 = chunks.iter().map(|chunk| chunk.num_elements).sum();
    assert_eq!(emitted, layout.total_elements());
}

#[test]
fn layout_tiled_overlap_in_two_dimensions() {
    // 2x2 tiles at (0,0) and (1,1) over a 3x3 section
    let want = Section::new_with_shape(&[3, 3]);
    let tiles = vec![
        Ok::<_, StorageError>(DataChunk::new(vec![0, 0], 100)),
        Ok(DataChunk::new(vec![1, 1], 200)),
    ];
    let chunks: Vec<LayoutChunk> = LayoutTiled::new(tiles.into_iter(), &[2, 2], 1, &want)
        .unwrap()
        .map(Result::unwrap)
        .collect();
    // (1,1) belongs to the first tile, the second keeps (1,2), (2,1) and (2,2)
    assert_eq!(
        chunks,
        vec![
            LayoutChunk::new(100, 2, 0),
            LayoutChunk::new(102, 2, 3),
            LayoutChunk::new(201, 1, 5),
            LayoutChunk::new(202, 2, 7),
        ]
    );
    let emitted: u64 = chunks.iter().map(|chunk| chunk.num_elements).sum();
    assert_eq!(emitted, 7);
}
