use thiserror::Error;

/// A strided selection of indices along one dimension.
///
/// A range selects `length` indices starting at `first` and separated by `stride`, so the last selected index is `first + stride * (length - 1)`.
/// A range with a `length` of zero is empty and selects nothing.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Range {
    first: u64,
    stride: u64,
    length: u64,
}

/// An invalid range error.
#[derive(Copy, Clone, Debug, Error)]
pub enum InvalidRangeError {
    /// The first index is after the last index.
    #[error("first index {0} is after last index {1}")]
    FirstAfterLast(u64, u64),
    /// The stride is zero.
    #[error("range stride must be at least 1")]
    ZeroStride,
    /// The last index of the range cannot be represented.
    #[error("range with first {0}, stride {1} and length {2} overflows")]
    Overflow(u64, u64, u64),
    /// Both ranges of an intersection are strided.
    #[error("cannot intersect ranges with strides {0} and {1}, one must be 1")]
    IncompatibleStrides(u64, u64),
    /// An index is not selected by a range.
    #[error("index {0} is not selected by range {1}")]
    IndexNotInRange(u64, Range),
    /// A relative range reaches beyond the range it is composed with.
    #[error("range {0} cannot be composed with range {1} of length {2}")]
    InvalidComposition(Range, Range, u64),
    /// Shifting the origin would make the first index negative.
    #[error("cannot shift range {0} by origin {1}")]
    InvalidShift(Range, u64),
}

impl Range {
    /// An empty range.
    pub const EMPTY: Range = Range {
        first: 0,
        stride: 1,
        length: 0,
    };

    /// Create a range selecting every index in `0..size`.
    #[must_use]
    pub const fn new_with_size(size: u64) -> Self {
        Self {
            first: 0,
            stride: 1,
            length: size,
        }
    }

    /// Create a range from `first` to `last` (inclusive) with a stride of 1.
    ///
    /// # Errors
    /// Returns [`InvalidRangeError`] if `first > last`.
    pub fn new(first: u64, last: u64) -> Result<Self, InvalidRangeError> {
        Self::new_with_stride(first, last, 1)
    }

    /// Create a range from `first` to `last` (inclusive) with `stride`.
    ///
    /// The last selected index is the largest `first + k * stride` that does not exceed `last`.
    ///
    /// # Errors
    /// Returns [`InvalidRangeError`] if `first > last` or `stride` is zero.
    pub fn new_with_stride(first: u64, last: u64, stride: u64) -> Result<Self, InvalidRangeError> {
        if stride == 0 {
            Err(InvalidRangeError::ZeroStride)
        } else if first > last {
            Err(InvalidRangeError::FirstAfterLast(first, last))
        } else {
            Ok(Self {
                first,
                stride,
                length: (last - first) / stride + 1,
            })
        }
    }

    /// Create a range of `length` indices starting at `first` and separated by `stride`.
    ///
    /// # Errors
    /// Returns [`InvalidRangeError`] if `stride` is zero or the last index overflows a [`u64`].
    pub fn new_with_length(first: u64, length: u64, stride: u64) -> Result<Self, InvalidRangeError> {
        if stride == 0 {
            return Err(InvalidRangeError::ZeroStride);
        }
        if length > 0 {
            stride
                .checked_mul(length - 1)
                .and_then(|span| span.checked_add(first))
                .ok_or(InvalidRangeError::Overflow(first, stride, length))?;
        }
        Ok(Self {
            first,
            stride,
            length,
        })
    }

    /// Return the first selected index.
    #[must_use]
    pub const fn first(&self) -> u64 {
        self.first
    }

    /// Return the last selected index.
    ///
    /// Equal to [`first`](Self::first) for an empty range.
    #[must_use]
    pub const fn last(&self) -> u64 {
        self.first + self.stride * self.length.saturating_sub(1)
    }

    /// Return the stride between selected indices.
    #[must_use]
    pub const fn stride(&self) -> u64 {
        self.stride
    }

    /// Return the number of selected indices.
    #[must_use]
    pub const fn length(&self) -> u64 {
        self.length
    }

    /// Returns true if the range selects nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns true if `index` is selected by the range.
    #[must_use]
    pub const fn contains(&self, index: u64) -> bool {
        !self.is_empty()
            && index >= self.first
            && index <= self.last()
            && (index - self.first) % self.stride == 0
    }

    /// Return the selected index at position `i` of the range.
    #[must_use]
    pub const fn element(&self, i: u64) -> u64 {
        self.first + i * self.stride
    }

    /// Return the position within the range of the selected index `index`.
    ///
    /// # Errors
    /// Returns [`InvalidRangeError::IndexNotInRange`] if `index` is not selected by the range.
    pub fn index(&self, index: u64) -> Result<u64, InvalidRangeError> {
        if self.contains(index) {
            Ok((index - self.first) / self.stride)
        } else {
            Err(InvalidRangeError::IndexNotInRange(index, *self))
        }
    }

    /// Returns true if the bounds of this range overlap the bounds of `other`, ignoring strides.
    #[must_use]
    pub const fn intersects(&self, other: &Self) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.first <= other.last()
            && other.first <= self.last()
    }

    /// Return the indices selected by both this range and `other`.
    ///
    /// The intersection is only well defined if at least one of the ranges has a stride of 1.
    /// The result has the stride of the strided range.
    ///
    /// # Errors
    /// Returns [`InvalidRangeError::IncompatibleStrides`] if both ranges are strided.
    pub fn intersect(&self, other: &Self) -> Result<Self, InvalidRangeError> {
        if self.is_empty() || other.is_empty() {
            return Ok(Self::EMPTY);
        }
        let (strided, unit) = match (self.stride, other.stride) {
            (1, _) => (other, self),
            (_, 1) => (self, other),
            (a, b) => return Err(InvalidRangeError::IncompatibleStrides(a, b)),
        };
        let low = std::cmp::max(strided.first, unit.first);
        let high = std::cmp::min(strided.last(), unit.last());
        if low > high {
            return Ok(Self::EMPTY);
        }
        let first = strided.first + (low - strided.first).div_ceil(strided.stride) * strided.stride;
        if first > high {
            return Ok(Self::EMPTY);
        }
        Ok(Self {
            first,
            stride: strided.stride,
            length: (high - first) / strided.stride + 1,
        })
    }

    /// Compose a range that is relative to this range.
    ///
    /// Position `i` of `want` selects position `want.element(i)` of this range.
    ///
    /// # Errors
    /// Returns [`InvalidRangeError::InvalidComposition`] if `want` selects positions beyond the length of this range.
    pub fn compose(&self, want: &Self) -> Result<Self, InvalidRangeError> {
        if want.is_empty() {
            return Ok(Self::EMPTY);
        }
        if want.last() >= self.length {
            return Err(InvalidRangeError::InvalidComposition(
                *want,
                *self,
                self.length,
            ));
        }
        Ok(Self {
            first: self.element(want.first),
            stride: self.stride * want.stride,
            length: want.length,
        })
    }

    /// Return a range with the same length and stride starting at `first - origin`.
    ///
    /// # Errors
    /// Returns [`InvalidRangeError::InvalidShift`] if `origin` is greater than the first index.
    pub fn shift_origin(&self, origin: u64) -> Result<Self, InvalidRangeError> {
        if self.is_empty() {
            return Ok(*self);
        }
        let first = self
            .first
            .checked_sub(origin)
            .ok_or(InvalidRangeError::InvalidShift(*self, origin))?;
        Ok(Self { first, ..*self })
    }

    /// Return a range with a stride of 1 and `first / stride` as the first index.
    #[must_use]
    pub const fn compact(&self) -> Self {
        Self {
            first: self.first / self.stride,
            stride: 1,
            length: self.length,
        }
    }
}

impl std::fmt::Display for Range {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            write!(f, "EMPTY")
        } else if self.stride == 1 {
            write!(f, "{}:{}", self.first, self.last())
        } else {
            write!(f, "{}:{}:{}", self.first, self.last(), self.stride)
        }
    }
}
