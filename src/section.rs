//! Sections of multidimensional arrays.
//!
//! A [`Section`] is a hyper-rectangular, possibly strided, selection of an array with one [`Range`] per dimension.
//! A [`SectionSpec`] is a partially specified section where a missing range selects a whole dimension.
//! It is resolved against an array shape with [`SectionSpec::fill`] (or [`Section::fill`]).
//!
//! Section specs can be parsed from strings such as `"(1:20,:,3,10:20:2)"`:
//!  - `:` selects the whole dimension,
//!  - `n` selects the single index `n`,
//!  - `a:b` selects `a` to `b` inclusive, and
//!  - `a:b:s` selects `a` to `b` inclusive with stride `s`.

mod range;

pub use range::{InvalidRangeError, Range};

use std::str::FromStr;

use itertools::izip;
use thiserror::Error;

/// The shape of an array, outermost dimension first.
pub type ArrayShape = Vec<u64>;

/// The number of elements in an array or section overflows a [`u64`].
#[derive(Copy, Clone, Debug, Error)]
#[error("the number of elements overflows a 64-bit integer")]
pub struct SizeOverflowError;

/// An invalid section error.
#[derive(Clone, Debug, Error)]
pub enum InvalidSectionError {
    /// The rank of a section does not match the rank of an array or another section.
    #[error("section has rank {0}, expected rank {1}")]
    RankMismatch(usize, usize),
    /// A range reaches beyond the extent of its dimension.
    #[error("range {range} of dimension {dim} is outside of the extent {extent}")]
    OutOfBounds {
        /// The dimension.
        dim: usize,
        /// The offending range.
        range: Range,
        /// The extent of the dimension.
        extent: u64,
    },
    /// An invalid range.
    #[error(transparent)]
    InvalidRange(#[from] InvalidRangeError),
    /// A section spec string could not be parsed.
    #[error("invalid section spec {0:?}")]
    Parse(String),
    /// The number of elements overflows.
    #[error(transparent)]
    SizeOverflow(#[from] SizeOverflowError),
}

/// Compute the number of elements of an array with `shape`.
///
/// A rank 0 shape has one element.
///
/// # Errors
/// Returns [`SizeOverflowError`] if the product overflows a [`u64`].
pub fn compute_size(shape: &[u64]) -> Result<u64, SizeOverflowError> {
    shape
        .iter()
        .try_fold(1u64, |acc, &extent| acc.checked_mul(extent))
        .ok_or(SizeOverflowError)
}

/// A section of an array.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct Section {
    ranges: Vec<Range>,
}

impl Section {
    /// Create a section from ranges.
    #[must_use]
    pub fn new(ranges: Vec<Range>) -> Self {
        Self { ranges }
    }

    /// Create a section covering the whole of an array with `shape`.
    #[must_use]
    pub fn new_with_shape(shape: &[u64]) -> Self {
        Self {
            ranges: shape.iter().copied().map(Range::new_with_size).collect(),
        }
    }

    /// Create a section from an `origin` and a `shape`.
    ///
    /// # Errors
    /// Returns [`InvalidSectionError`] if the lengths of `origin` and `shape` differ or a range overflows.
    pub fn new_with_origin_shape(origin: &[u64], shape: &[u64]) -> Result<Self, InvalidSectionError> {
        if origin.len() != shape.len() {
            return Err(InvalidSectionError::RankMismatch(origin.len(), shape.len()));
        }
        let ranges = std::iter::zip(origin, shape)
            .map(|(&first, &length)| Range::new_with_length(first, length, 1))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { ranges })
    }

    /// Create a section from an `origin`, a `shape` and a `stride`.
    ///
    /// The `shape` is the number of selected indices in each dimension.
    ///
    /// # Errors
    /// Returns [`InvalidSectionError`] if the lengths of the arguments differ, a stride is zero or a range overflows.
    pub fn new_with_origin_shape_stride(
        origin: &[u64],
        shape: &[u64],
        stride: &[u64],
    ) -> Result<Self, InvalidSectionError> {
        if origin.len() != shape.len() {
            return Err(InvalidSectionError::RankMismatch(origin.len(), shape.len()));
        }
        if origin.len() != stride.len() {
            return Err(InvalidSectionError::RankMismatch(stride.len(), shape.len()));
        }
        let ranges = izip!(origin, shape, stride)
            .map(|(&first, &length, &stride)| Range::new_with_length(first, length, stride))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { ranges })
    }

    /// Resolve an optional section spec against an array `shape`.
    ///
    /// A missing spec selects the whole array.
    ///
    /// # Errors
    /// Returns [`InvalidSectionError`] if the spec does not fit within `shape`.
    pub fn fill(spec: Option<&SectionSpec>, shape: &[u64]) -> Result<Self, InvalidSectionError> {
        match spec {
            Some(spec) => spec.fill(shape),
            None => Ok(Self::new_with_shape(shape)),
        }
    }

    /// Check that the section has the rank of `shape` and lies within its bounds.
    ///
    /// # Errors
    /// Returns [`InvalidSectionError`] on a rank mismatch or if a range is outside of its dimension.
    pub fn check_in_range(&self, shape: &[u64]) -> Result<(), InvalidSectionError> {
        if self.rank() != shape.len() {
            return Err(InvalidSectionError::RankMismatch(self.rank(), shape.len()));
        }
        for (dim, (range, &extent)) in std::iter::zip(&self.ranges, shape).enumerate() {
            if !range.is_empty() && range.last() >= extent {
                return Err(InvalidSectionError::OutOfBounds {
                    dim,
                    range: *range,
                    extent,
                });
            }
        }
        Ok(())
    }

    /// Return the rank of the section.
    #[must_use]
    pub fn rank(&self) -> usize {
        self.ranges.len()
    }

    /// Return the ranges of the section.
    #[must_use]
    pub fn ranges(&self) -> &[Range] {
        &self.ranges
    }

    /// Return the range of dimension `dim`.
    ///
    /// # Panics
    /// Panics if `dim` is not less than the rank.
    #[must_use]
    pub fn range(&self, dim: usize) -> &Range {
        &self.ranges[dim]
    }

    /// Return the number of selected indices in each dimension.
    #[must_use]
    pub fn shape(&self) -> ArrayShape {
        self.ranges.iter().map(Range::length).collect()
    }

    /// Return the first selected index in each dimension.
    #[must_use]
    pub fn origin(&self) -> Vec<u64> {
        self.ranges.iter().map(Range::first).collect()
    }

    /// Return the stride of each dimension.
    #[must_use]
    pub fn stride(&self) -> Vec<u64> {
        self.ranges.iter().map(Range::stride).collect()
    }

    /// Return the number of selected elements.
    ///
    /// # Errors
    /// Returns [`SizeOverflowError`] if the number of elements overflows a [`u64`].
    pub fn num_elements(&self) -> Result<u64, SizeOverflowError> {
        compute_size(&self.shape())
    }

    /// Returns true if any range has a stride other than 1.
    #[must_use]
    pub fn is_strided(&self) -> bool {
        self.ranges.iter().any(|range| range.stride() != 1)
    }

    /// Returns true if the section selects every element of an array with `shape`.
    #[must_use]
    pub fn equivalent(&self, shape: &[u64]) -> bool {
        self.rank() == shape.len()
            && std::iter::zip(&self.ranges, shape).all(|(range, &extent)| {
                range.first() == 0 && range.stride() == 1 && range.length() == extent
            })
    }

    fn check_rank(&self, other: &Self) -> Result<(), InvalidSectionError> {
        if self.rank() == other.rank() {
            Ok(())
        } else {
            Err(InvalidSectionError::RankMismatch(other.rank(), self.rank()))
        }
    }

    /// Return the elements selected by both this section and `other`.
    ///
    /// In each dimension at least one of the two ranges must have a stride of 1.
    ///
    /// # Errors
    /// Returns [`InvalidSectionError`] on a rank mismatch or if both ranges of a dimension are strided.
    pub fn intersect(&self, other: &Self) -> Result<Self, InvalidSectionError> {
        self.check_rank(other)?;
        let ranges = std::iter::zip(&self.ranges, &other.ranges)
            .map(|(a, b)| a.intersect(b))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { ranges })
    }

    /// Returns true if the bounds of this section overlap the bounds of `other`, ignoring strides.
    ///
    /// Sections of different rank never intersect.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.rank() == other.rank()
            && std::iter::zip(&self.ranges, &other.ranges).all(|(a, b)| a.intersects(b))
    }

    /// Returns true if the bounds of `other` lie within the bounds of this section.
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        self.rank() == other.rank()
            && std::iter::zip(&self.ranges, &other.ranges).all(|(base, range)| {
                range.is_empty() || (base.first() <= range.first() && base.last() >= range.last())
            })
    }

    /// Return the element offset of the first element of `intersect` within this section.
    ///
    /// The offset is in the row-major order of the elements selected by this section.
    ///
    /// # Errors
    /// Returns [`InvalidSectionError`] on a rank mismatch or if the first index of a range of `intersect` is not selected by this section.
    pub fn offset(&self, intersect: &Self) -> Result<u64, InvalidSectionError> {
        self.check_rank(intersect)?;
        let mut offset = 0;
        let mut stride = 1;
        for (base, range) in std::iter::zip(&self.ranges, &intersect.ranges).rev() {
            offset += base.index(range.first())? * stride;
            stride *= base.length();
        }
        Ok(offset)
    }

    /// Return a section with `origin` subtracted from the first index of each range.
    ///
    /// # Errors
    /// Returns [`InvalidSectionError`] on a rank mismatch or if a range would start before zero.
    pub fn shift_origin(&self, origin: &[u64]) -> Result<Self, InvalidSectionError> {
        if origin.len() != self.rank() {
            return Err(InvalidSectionError::RankMismatch(origin.len(), self.rank()));
        }
        let ranges = std::iter::zip(&self.ranges, origin)
            .map(|(range, &origin)| range.shift_origin(origin))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { ranges })
    }

    /// Compose a section `want` that is relative to this section.
    ///
    /// # Errors
    /// Returns [`InvalidSectionError`] on a rank mismatch or if `want` reaches beyond this section.
    pub fn compose(&self, want: &Self) -> Result<Self, InvalidSectionError> {
        self.check_rank(want)?;
        let ranges = std::iter::zip(&self.ranges, &want.ranges)
            .map(|(base, range)| base.compose(range))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { ranges })
    }

    /// Return a section where every range has a stride of 1 and starts at `first / stride`.
    #[must_use]
    pub fn compact(&self) -> Self {
        Self {
            ranges: self.ranges.iter().map(Range::compact).collect(),
        }
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(")?;
        for (i, range) in self.ranges.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{range}")?;
        }
        write!(f, ")")
    }
}

impl From<Vec<Range>> for Section {
    fn from(ranges: Vec<Range>) -> Self {
        Self::new(ranges)
    }
}

/// A partially specified section, where a missing range selects a whole dimension.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct SectionSpec {
    ranges: Vec<Option<Range>>,
}

impl SectionSpec {
    /// Create a section spec from optional ranges.
    #[must_use]
    pub fn new(ranges: Vec<Option<Range>>) -> Self {
        Self { ranges }
    }

    /// Return the optional ranges of the spec.
    #[must_use]
    pub fn ranges(&self) -> &[Option<Range>] {
        &self.ranges
    }

    /// Resolve the spec against an array `shape` and validate it.
    ///
    /// # Errors
    /// Returns [`InvalidSectionError`] on a rank mismatch or if a range is outside of its dimension.
    pub fn fill(&self, shape: &[u64]) -> Result<Section, InvalidSectionError> {
        if self.ranges.len() != shape.len() {
            return Err(InvalidSectionError::RankMismatch(
                self.ranges.len(),
                shape.len(),
            ));
        }
        let section = Section {
            ranges: std::iter::zip(&self.ranges, shape)
                .map(|(range, &extent)| range.unwrap_or(Range::new_with_size(extent)))
                .collect(),
        };
        section.check_in_range(shape)?;
        Ok(section)
    }
}

impl From<Section> for SectionSpec {
    fn from(section: Section) -> Self {
        Self {
            ranges: section.ranges.into_iter().map(Some).collect(),
        }
    }
}

fn parse_index(s: &str, spec: &str) -> Result<u64, InvalidSectionError> {
    s.trim()
        .parse::<u64>()
        .map_err(|_| InvalidSectionError::Parse(spec.to_string()))
}

impl FromStr for SectionSpec {
    type Err = InvalidSectionError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let trimmed = spec.trim();
        let inner = trimmed
            .strip_prefix('(')
            .and_then(|s| s.strip_suffix(')'))
            .unwrap_or(trimmed);
        if inner.trim().is_empty() {
            return Ok(Self::default());
        }
        let ranges = inner
            .split(',')
            .map(|dim| {
                let dim = dim.trim();
                if dim == ":" {
                    return Ok(None);
                }
                let parts: Vec<&str> = dim.split(':').collect();
                let range = match parts.as_slice() {
                    [index] => {
                        let index = parse_index(index, spec)?;
                        Range::new(index, index)?
                    }
                    [first, last] => {
                        Range::new(parse_index(first, spec)?, parse_index(last, spec)?)?
                    }
                    [first, last, stride] => Range::new_with_stride(
                        parse_index(first, spec)?,
                        parse_index(last, spec)?,
                        parse_index(stride, spec)?,
                    )?,
                    _ => return Err(InvalidSectionError::Parse(spec.to_string())),
                };
                Ok(Some(range))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { ranges })
    }
}

impl FromStr for Section {
    type Err = InvalidSectionError;

    /// Parse a fully specified section. Use [`SectionSpec`] for specs containing `:`.
    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let parsed = spec.parse::<SectionSpec>()?;
        let ranges = parsed
            .ranges
            .into_iter()
            .map(|range| range.ok_or_else(|| InvalidSectionError::Parse(spec.to_string())))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { ranges })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_fill() {
        let spec: SectionSpec = "(1:20,:,3,10:20:2)".parse().unwrap();
        let section = spec.fill(&[30, 5, 4, 21]).unwrap();
        assert_eq!(section.shape(), vec![20, 5, 1, 6]);
        assert_eq!(section.origin(), vec![1, 0, 3, 10]);
        assert_eq!(section.stride(), vec![1, 1, 1, 2]);
        assert_eq!(section.to_string(), "(1:20,0:4,3:3,10:20:2)");
        assert!(section.is_strided());

        assert!(matches!(
            spec.fill(&[30, 5, 4]),
            Err(InvalidSectionError::RankMismatch(4, 3))
        ));
        assert!(matches!(
            spec.fill(&[20, 5, 4, 21]),
            Err(InvalidSectionError::OutOfBounds { dim: 0, .. })
        ));

        let section = Section::fill(None, &[3, 4]).unwrap();
        assert!(section.equivalent(&[3, 4]));
        assert!(!section.equivalent(&[3, 5]));
        assert_eq!(section.num_elements().unwrap(), 12);
    }

    #[test]
    fn section_parse_invalid() {
        assert!("(1:a)".parse::<SectionSpec>().is_err());
        assert!("(5:1)".parse::<SectionSpec>().is_err());
        assert!("(1:2:3:4)".parse::<SectionSpec>().is_err());
        assert!("(1:2,:)".parse::<Section>().is_err());
        assert_eq!("()".parse::<SectionSpec>().unwrap().ranges().len(), 0);
        assert_eq!(
            "0:3,2".parse::<Section>().unwrap(),
            Section::new(vec![Range::new(0, 3).unwrap(), Range::new(2, 2).unwrap()])
        );
    }

    #[test]
    fn section_size_overflow() {
        assert!(compute_size(&[u64::MAX, 2]).is_err());
        assert_eq!(compute_size(&[]).unwrap(), 1);
        assert_eq!(compute_size(&[3, 0, 5]).unwrap(), 0);
    }

    #[test]
    fn section_intersect_offset() {
        let data = Section::new_with_origin_shape(&[4, 0], &[4, 6]).unwrap();
        let want = Section::new_with_origin_shape_stride(&[1, 2], &[5, 3], &[3, 1]).unwrap();
        assert!(data.intersects(&want));
        let intersect = data.intersect(&want).unwrap();
        assert_eq!(intersect.origin(), vec![4, 2]);
        assert_eq!(intersect.shape(), vec![2, 3]);
        assert_eq!(intersect.stride(), vec![3, 1]);
        // (4 - 4) * 6 + 2
        assert_eq!(data.offset(&intersect).unwrap(), 2);
        // want rows 1 4 7 10 13, cols 2 3 4: (1 * 3) + 0
        assert_eq!(want.offset(&intersect).unwrap(), 3);
        assert!(data.contains(&intersect));
        assert!(!intersect.contains(&data));
    }

    #[test]
    fn section_shift_compose_compact() {
        let section = Section::new_with_origin_shape(&[10, 20], &[5, 5]).unwrap();
        assert_eq!(
            section.shift_origin(&[10, 15]).unwrap(),
            Section::new_with_origin_shape(&[0, 5], &[5, 5]).unwrap()
        );
        assert!(section.shift_origin(&[11, 0]).is_err());
        assert!(section.shift_origin(&[0]).is_err());

        let relative = Section::new_with_origin_shape_stride(&[1, 0], &[2, 3], &[2, 2]).unwrap();
        let composed = section.compose(&relative).unwrap();
        assert_eq!(composed.origin(), vec![11, 20]);
        assert_eq!(composed.stride(), vec![2, 2]);
        assert_eq!(composed.shape(), vec![2, 3]);
        assert_eq!(
            composed.compact(),
            Section::new_with_origin_shape(&[5, 10], &[2, 3]).unwrap()
        );
    }
}
