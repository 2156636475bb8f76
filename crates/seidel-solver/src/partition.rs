//! Contiguous row partitioning.
//!
//! Worker `k` of `P` owns rows `k*n/P .. (k+1)*n/P`. The ranges tile `0..n`
//! exactly, differ in length by at most one, and are empty for some workers
//! when `P > n`.

use std::ops::Range;

/// Half-open row range `[start, end)` owned by one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowPartition {
    /// First owned row.
    pub start: usize,
    /// One past the last owned row.
    pub end: usize,
}

impl RowPartition {
    /// Rows owned by `rank` in a group of `workers` over `n` rows.
    ///
    /// # Panics
    ///
    /// Debug-asserts `rank < workers`.
    pub fn for_worker(n: usize, rank: usize, workers: usize) -> Self {
        debug_assert!(rank < workers, "rank {rank} out of range for {workers} workers");
        Self {
            start: rank * n / workers,
            end: (rank + 1) * n / workers,
        }
    }

    /// Partitions for every rank, in rank order.
    pub fn all(n: usize, workers: usize) -> Vec<Self> {
        (0..workers)
            .map(|rank| Self::for_worker(n, rank, workers))
            .collect()
    }

    /// Number of owned rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the worker owns no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The owned rows as a `Range`.
    #[inline]
    pub fn rows(&self) -> Range<usize> {
        self.start..self.end
    }
}
