//! Reverse adjacency: for every cell, the cells that drain directly into it.
//!
//! Built once by bucketing cells on their successor (a counting sort), so
//! lookups are a slice into one flat buffer. Predecessors of a cell are
//! stored in ascending index order.

use crate::successors::SuccessorTable;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamIndex {
    /// `offsets[i]..offsets[i + 1]` is the range of cell `i` in `cells`.
    offsets: Vec<usize>,
    cells: Vec<usize>,
}

impl UpstreamIndex {
    pub fn build(table: &SuccessorTable) -> Self {
        let n = table.len();

        let mut offsets = vec![0usize; n + 1];
        for idx in 0..n {
            if let Some(ds) = table.downstream(idx) {
                offsets[ds + 1] += 1;
            }
        }
        for i in 0..n {
            offsets[i + 1] += offsets[i];
        }

        let mut cursor = offsets[..n].to_vec();
        let mut cells = vec![0usize; offsets[n]];
        for idx in 0..n {
            if let Some(ds) = table.downstream(idx) {
                cells[cursor[ds]] = idx;
                cursor[ds] += 1;
            }
        }

        Self { offsets, cells }
    }

    /// Cells whose successor is `idx`.
    #[inline]
    pub fn upstream(&self, idx: usize) -> &[usize] {
        &self.cells[self.offsets[idx]..self.offsets[idx + 1]]
    }

    /// Number of direct upstream neighbours of `idx` (0..=8).
    #[inline]
    pub fn n_direct(&self, idx: usize) -> usize {
        self.offsets[idx + 1] - self.offsets[idx]
    }

    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Largest in-degree over all cells.
    pub fn max_in_degree(&self) -> usize {
        (0..self.len()).map(|i| self.n_direct(i)).max().unwrap_or(0)
    }
}
