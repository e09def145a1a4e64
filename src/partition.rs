//! Contiguous row partitioning of a matrix across a fixed set of ranks.
//!
//! Rows are split as evenly as possible: every rank gets `total_rows / workers`
//! rows and the first `total_rows % workers` ranks get one more. Counts and
//! offsets are expressed in elements (`rows * unit_width`) so they can be fed
//! straight into variable-count scatter and gather calls.

use std::ops::Range;

use crate::error::PartitionError;

/// Number of rows assigned to `rank` when `total_rows` are split over `workers`.
pub fn rows_for(rank: usize, total_rows: usize, workers: usize) -> usize {
    let base = total_rows / workers;
    let remainder = total_rows % workers;
    if rank < remainder {
        base + 1
    } else {
        base
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    total_rows: usize,
    unit_width: usize,
    counts: Vec<usize>,
    offsets: Vec<usize>,
}

impl Partition {
    /// Partition `total_rows` rows of width `unit_width` over `worker_count` ranks.
    pub fn new(
        total_rows: usize,
        worker_count: usize,
        unit_width: usize,
    ) -> Result<Self, PartitionError> {
        if worker_count == 0 {
            return Err(PartitionError::NoWorkers);
        }
        if unit_width == 0 {
            return Err(PartitionError::ZeroWidth);
        }

        let mut counts = Vec::with_capacity(worker_count);
        let mut offsets = Vec::with_capacity(worker_count);
        let mut offset = 0;
        for rank in 0..worker_count {
            let count = rows_for(rank, total_rows, worker_count) * unit_width;
            counts.push(count);
            offsets.push(offset);
            offset += count;
        }

        Ok(Partition {
            total_rows,
            unit_width,
            counts,
            offsets,
        })
    }

    /// Same row assignment, measured in rows of a different width.
    pub fn with_unit_width(&self, unit_width: usize) -> Result<Self, PartitionError> {
        Partition::new(self.total_rows, self.worker_count(), unit_width)
    }

    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    pub fn count(&self, rank: usize) -> usize {
        self.counts[rank]
    }

    pub fn offset(&self, rank: usize) -> usize {
        self.offsets[rank]
    }

    /// Rows owned by `rank`.
    pub fn rows(&self, rank: usize) -> usize {
        self.counts[rank] / self.unit_width
    }

    /// Global row indices owned by `rank`.
    pub fn row_range(&self, rank: usize) -> Range<usize> {
        let start = self.offsets[rank] / self.unit_width;
        start..start + self.rows(rank)
    }

    /// Rank that owns global row `row`, if the row exists.
    pub fn owner_of_row(&self, row: usize) -> Option<usize> {
        if row >= self.total_rows {
            return None;
        }
        (0..self.worker_count()).find(|&rank| self.row_range(rank).contains(&row))
    }

    pub fn total_rows(&self) -> usize {
        self.total_rows
    }

    pub fn total_elements(&self) -> usize {
        self.total_rows * self.unit_width
    }

    pub fn worker_count(&self) -> usize {
        self.counts.len()
    }

    pub fn unit_width(&self) -> usize {
        self.unit_width
    }
}
