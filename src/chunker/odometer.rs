/// An N-dimensional counter with `P` linear projections of the counter position.
///
/// The last dimension increments fastest and carries into slower dimensions.
/// Each projection has its own stride per dimension, so several address spaces advance in lockstep from one counter.
#[derive(Clone, Debug)]
pub(super) struct Odometer<const P: usize> {
    shape: Vec<u64>,
    counter: Vec<u64>,
    strides: [Vec<u64>; P],
    offsets: [u64; P],
}

impl<const P: usize> Odometer<P> {
    /// Create an odometer over `shape` (slowest dimension first) starting at `offsets`.
    ///
    /// Each element of `strides` must have the length of `shape`.
    pub(super) fn new(shape: Vec<u64>, strides: [Vec<u64>; P], offsets: [u64; P]) -> Self {
        debug_assert!(strides.iter().all(|stride| stride.len() == shape.len()));
        let counter = vec![0; shape.len()];
        Self {
            shape,
            counter,
            strides,
            offsets,
        }
    }

    /// The number of positions visited by a full walk of the odometer.
    pub(super) fn num_positions(&self) -> Option<u64> {
        self.shape
            .iter()
            .try_fold(1u64, |acc, &extent| acc.checked_mul(extent))
    }

    /// Return the current value of projection `p`.
    pub(super) fn offset(&self, p: usize) -> u64 {
        self.offsets[p]
    }

    /// Advance to the next position.
    ///
    /// Returns false if the odometer wrapped around to its start.
    pub(super) fn increment(&mut self) -> bool {
        for dim in (0..self.shape.len()).rev() {
            self.counter[dim] += 1;
            if self.counter[dim] < self.shape[dim] {
                for (offset, stride) in std::iter::zip(&mut self.offsets, &self.strides) {
                    *offset += stride[dim];
                }
                return true;
            }
            let carried = self.counter[dim] - 1;
            for (offset, stride) in std::iter::zip(&mut self.offsets, &self.strides) {
                *offset -= stride[dim] * carried;
            }
            self.counter[dim] = 0;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn odometer_two_projections() {
        let mut odometer = Odometer::new(vec![2, 3], [vec![10, 1], vec![3, 100]], [5, 0]);
        assert_eq!(odometer.num_positions(), Some(6));
        let mut positions = vec![(odometer.offset(0), odometer.offset(1))];
        while odometer.increment() {
            positions.push((odometer.offset(0), odometer.offset(1)));
        }
        assert_eq!(
            positions,
            vec![(5, 0), (6, 100), (7, 200), (15, 3), (16, 103), (17, 203)]
        );
        // wrapped back to the start
        assert_eq!(odometer.offset(0), 5);
        assert_eq!(odometer.offset(1), 0);
    }

    #[test]
    fn odometer_rank_zero() {
        let mut odometer = Odometer::new(vec![], [vec![]], [7]);
        assert_eq!(odometer.num_positions(), Some(1));
        assert!(!odometer.increment());
        assert_eq!(odometer.offset(0), 7);
    }
}
